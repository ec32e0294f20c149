use crate::catalog::FeatureCatalog;
use crate::error::CatalogError;
use crate::matrix::CompatibilityMatrix;
use hb_domain::{
    FeatureDefinition, FeaturePolicy, FeatureStatus, HostVersion, PerformanceProfile, Stability,
    VersionOverride,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Answers availability questions against a catalog under a fixed policy.
///
/// Every answer is a pure function of the catalog contents, the requested version, and the
/// policy. The matrix, `is_enabled`, and dependency validation all go through
/// [`FeatureResolver::status`].
#[derive(Debug, Clone)]
pub struct FeatureResolver {
    catalog: Arc<FeatureCatalog>,
    policy: FeaturePolicy,
}

/// Outcome of [`FeatureResolver::validate_dependencies`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub feature: String,
    pub version: HostVersion,
    pub status: Option<FeatureStatus>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub missing_dependencies: Vec<String>,
    pub active_conflicts: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first hard failure as a typed error, if any.
    #[must_use]
    pub fn to_error(&self) -> Option<CatalogError> {
        if let Some(dep) = self.missing_dependencies.first() {
            return Some(CatalogError::MissingDependency {
                message: format!("'{}' requires '{dep}' on {}", self.feature, self.version).into(),
                context: None,
            });
        }
        self.errors.first().map(|e| CatalogError::Incompatible {
            message: e.clone().into(),
            context: None,
        })
    }
}

impl FeatureResolver {
    #[must_use]
    pub const fn new(catalog: Arc<FeatureCatalog>, policy: FeaturePolicy) -> Self {
        Self { catalog, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &FeaturePolicy {
        &self.policy
    }

    #[must_use]
    pub const fn catalog(&self) -> &Arc<FeatureCatalog> {
        &self.catalog
    }

    #[must_use]
    pub fn is_enabled(&self, name: &str, version: HostVersion) -> bool {
        self.status(name, version).is_enabled()
    }

    /// Availability of `name` on `version`.
    ///
    /// Rules, in order: unknown feature or version, range check, per-version override,
    /// stability tier, deprecated/experimental policy, license.
    #[must_use]
    pub fn status(&self, name: &str, version: HostVersion) -> FeatureStatus {
        self.catalog
            .get(name)
            .map_or(FeatureStatus::NotAvailable, |def| self.status_of(&def, version))
    }

    fn status_of(&self, def: &FeatureDefinition, version: HostVersion) -> FeatureStatus {
        if version == HostVersion::Unknown || !def.supports(version) {
            return FeatureStatus::NotAvailable;
        }
        if matches!(def.override_for(version), VersionOverride::Configured { enabled: false, .. })
        {
            return FeatureStatus::NotAvailable;
        }

        let tier = match def.stability {
            Stability::Deprecated => FeatureStatus::Deprecated,
            Stability::Alpha => FeatureStatus::Experimental,
            // Releases newer than anything known run untested.
            _ if version == HostVersion::Future => FeatureStatus::Experimental,
            Stability::Beta => FeatureStatus::Limited,
            Stability::Stable => FeatureStatus::Available,
        };

        match tier {
            FeatureStatus::Deprecated if !self.policy.allow_deprecated => {
                FeatureStatus::NotAvailable
            },
            FeatureStatus::Experimental if !self.policy.allow_experimental => {
                FeatureStatus::NotAvailable
            },
            _ if def.requires_license && !self.policy.license.allows(&def.name) => {
                FeatureStatus::RequiresLicense
            },
            status => status,
        }
    }

    /// Checks whether `name` can be used on `version`, listing what stands in the way.
    ///
    /// Missing or disabled dependencies are errors. Enabled conflicting features are only
    /// warnings. Stability and performance produce advisories.
    #[must_use]
    pub fn validate_dependencies(&self, name: &str, version: HostVersion) -> ValidationResult {
        let mut result =
            ValidationResult { feature: name.to_owned(), version, ..ValidationResult::default() };

        let Some(def) = self.catalog.get(name) else {
            result.errors.push(format!("unknown feature '{name}'"));
            return result;
        };

        let status = self.status_of(&def, version);
        result.status = Some(status);

        if !def.supports(version) || version == HostVersion::Unknown {
            let range = def
                .max_version
                .map_or_else(|| format!("{} or newer", def.min_version), |max| {
                    format!("{} to {max}", def.min_version)
                });
            result.errors.push(format!("'{name}' requires host version {range}, found {version}"));
        } else if !status.is_enabled() {
            result.errors.push(format!("'{name}' is {status} on {version}"));
        }

        for dep in &def.dependencies {
            if !self.is_enabled(dep, version) {
                result.errors.push(format!("missing dependency '{dep}'"));
                result.missing_dependencies.push(dep.clone());
            }
        }

        for conflict in &def.conflicts {
            if self.is_enabled(conflict, version) {
                warn!(feature = name, conflict = %conflict, %version, "Conflicting feature enabled");
                result.warnings.push(format!("conflicts with enabled feature '{conflict}'"));
                result.active_conflicts.push(conflict.clone());
            }
        }

        match status {
            FeatureStatus::Deprecated => {
                result.warnings.push(format!("'{name}' is deprecated and may be removed"));
            },
            FeatureStatus::Experimental => {
                result.warnings.push(format!("'{name}' is experimental on {version}"));
            },
            FeatureStatus::Limited => {
                result.warnings.push(format!("'{name}' is in beta with limited support"));
            },
            _ => {},
        }

        match def.performance {
            PerformanceProfile::High => result.recommendations.push(format!(
                "'{name}' is expensive; batch requests and avoid calling it per element"
            )),
            PerformanceProfile::Moderate => result
                .recommendations
                .push(format!("'{name}' has moderate cost; cache results where possible")),
            PerformanceProfile::Negligible | PerformanceProfile::Low => {},
        }

        result
    }

    /// Transitive prerequisites of `name` in load order, excluding `name` itself.
    pub fn resolve_dependencies(
        &self,
        name: &str,
        version: HostVersion,
    ) -> Result<Vec<String>, CatalogError> {
        if !self.catalog.contains(name) {
            return Err(CatalogError::UnknownFeature { message: name.to_owned().into(), context: None });
        }

        let mut order = Vec::new();
        let mut path = Vec::new();
        self.visit(name, version, &mut path, &mut order)?;
        order.retain(|n| n != name);
        Ok(order)
    }

    fn visit(
        &self,
        name: &str,
        version: HostVersion,
        path: &mut Vec<String>,
        order: &mut Vec<String>,
    ) -> Result<(), CatalogError> {
        if order.iter().any(|n| n == name) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|n| n == name) {
            let mut cycle = path[start..].to_vec();
            cycle.push(name.to_owned());
            return Err(CatalogError::DependencyCycle { message: cycle.join(" -> ").into(), context: None });
        }

        let def = self.catalog.get(name).ok_or_else(|| CatalogError::UnknownDependency {
            message: format!("'{name}' is not registered").into(),
            context: path.last().map(|parent| format!("required by '{parent}'").into()),
        })?;

        path.push(name.to_owned());
        for dep in &def.dependencies {
            self.visit(dep, version, path, order)?;
            if !self.is_enabled(dep, version) {
                return Err(CatalogError::MissingDependency {
                    message: format!("'{name}' requires '{dep}', which is {}", self.status(dep, version))
                        .into(),
                    context: Some(version.to_string().into()),
                });
            }
        }
        path.pop();

        order.push(name.to_owned());
        Ok(())
    }

    /// Full feature by version table over every known release plus `Future`.
    #[must_use]
    pub fn compatibility_matrix(&self) -> CompatibilityMatrix {
        let mut versions = HostVersion::KNOWN.to_vec();
        versions.push(HostVersion::Future);
        self.matrix_for(&versions)
    }

    #[must_use]
    pub fn matrix_for(&self, versions: &[HostVersion]) -> CompatibilityMatrix {
        let mut matrix = CompatibilityMatrix::new(versions.to_vec());
        for def in self.catalog.snapshot() {
            for &version in versions {
                matrix.set(&def.name, version, self.status_of(&def, version));
            }
        }
        matrix
    }

    /// Names of every feature usable on `version`, sorted.
    #[must_use]
    pub fn enabled_features(&self, version: HostVersion) -> Vec<String> {
        self.catalog
            .snapshot()
            .into_iter()
            .filter(|def| self.status_of(def, version).is_enabled())
            .map(|def| def.name.clone())
            .collect()
    }
}
