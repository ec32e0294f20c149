use crate::error::AdapterError;
use crate::host::{HostApplication, NativeValue};
use crate::managers::{
    ElementManager, FamilyManager, GeometryManager, ParameterManager, SelectionManager,
    TransactionManager, ViewManager,
};
use crate::strategy::VersionStrategy;
use hb_domain::{CapabilitySet, FeatureStatus, HostVersion, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A feature registered on an adapter because the resolver marks it enabled on the adapter's
/// version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAdapter {
    name: String,
    status: FeatureStatus,
    required: CapabilitySet,
    available: bool,
    dependencies: Vec<String>,
    unresolved: Option<String>,
}

impl FeatureAdapter {
    pub(crate) fn new(
        name: String,
        status: FeatureStatus,
        required: CapabilitySet,
        offered: CapabilitySet,
        dependencies: Result<Vec<String>, String>,
    ) -> Self {
        let (dependencies, unresolved) = match dependencies {
            Ok(deps) => (deps, None),
            Err(reason) => (Vec::new(), Some(reason)),
        };
        Self { name, status, required, available: offered.contains(required), dependencies, unresolved }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn status(&self) -> FeatureStatus {
        self.status
    }

    #[must_use]
    pub const fn required_capabilities(&self) -> CapabilitySet {
        self.required
    }

    /// Prerequisites in load order.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// True when the feature can actually be served: enabled, dependencies resolved, and the
    /// adapter exposes every capability it needs.
    #[must_use]
    pub fn probe(&self) -> bool {
        self.status.is_enabled() && self.available && self.unresolved.is_none()
    }

    fn ensure_usable(&self) -> Result<(), AdapterError> {
        if let Some(reason) = &self.unresolved {
            return Err(AdapterError::NotSupported {
                message: format!("'{}' has unresolved dependencies: {reason}", self.name).into(),
                context: None,
            });
        }
        if !self.available {
            return Err(AdapterError::NotSupported {
                message: format!("'{}' needs host capabilities {:?}", self.name, self.required)
                    .into(),
                context: None,
            });
        }
        Ok(())
    }
}

/// Capability managers bound to one host version.
///
/// Built only by [`crate::AdapterRegistry`]. Immutable once published, except for the live
/// transaction state inside [`Adapter::transactions`].
pub struct Adapter {
    pub(crate) version: HostVersion,
    pub(crate) strategy: Arc<dyn VersionStrategy>,
    pub(crate) host: Arc<dyn HostApplication>,
    pub(crate) capabilities: CapabilitySet,
    pub(crate) elements: ElementManager,
    pub(crate) parameters: ParameterManager,
    pub(crate) geometry: GeometryManager,
    pub(crate) selection: SelectionManager,
    pub(crate) views: ViewManager,
    pub(crate) families: FamilyManager,
    pub(crate) transactions: TransactionManager,
    pub(crate) features: BTreeMap<String, FeatureAdapter>,
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("version", &self.version)
            .field("strategy", &self.strategy.name())
            .field("capabilities", &self.capabilities)
            .field("features", &self.features.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Adapter {
    #[must_use]
    pub const fn version(&self) -> HostVersion {
        self.version
    }

    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    #[must_use]
    pub fn product(&self) -> &str {
        self.host.product()
    }

    #[must_use]
    pub const fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    pub fn require_capability(&self, capability: CapabilitySet) -> Result<(), AdapterError> {
        if self.capabilities.contains(capability) {
            Ok(())
        } else {
            Err(AdapterError::NotSupported {
                message: format!(
                    "capability {:?} is not available on {}",
                    capability.difference(self.capabilities),
                    self.version
                )
                .into(),
                context: None,
            })
        }
    }

    #[must_use]
    pub fn supports_nested_transactions(&self) -> bool {
        self.transactions.allows_nesting()
    }

    #[must_use]
    pub const fn elements(&self) -> &ElementManager {
        &self.elements
    }

    #[must_use]
    pub const fn parameters(&self) -> &ParameterManager {
        &self.parameters
    }

    #[must_use]
    pub const fn geometry(&self) -> &GeometryManager {
        &self.geometry
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    #[must_use]
    pub const fn views(&self) -> &ViewManager {
        &self.views
    }

    #[must_use]
    pub const fn families(&self) -> &FamilyManager {
        &self.families
    }

    #[must_use]
    pub const fn transactions(&self) -> &TransactionManager {
        &self.transactions
    }

    pub fn features(&self) -> impl Iterator<Item = &FeatureAdapter> {
        self.features.values()
    }

    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&FeatureAdapter> {
        self.features.get(name)
    }

    /// Names of every registered feature, sorted.
    #[must_use]
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.keys().map(String::as_str).collect()
    }

    /// The feature with its prerequisites, prerequisites first.
    ///
    /// Fails with [`AdapterError::NotSupported`] when the feature, or anything it depends on, is
    /// not registered or cannot be served on this adapter.
    pub fn resolve_feature(&self, name: &str) -> Result<Vec<&FeatureAdapter>, AdapterError> {
        let feature = self.features.get(name).ok_or_else(|| AdapterError::NotSupported {
            message: format!("'{name}' is not available on {}", self.version).into(),
            context: None,
        })?;
        feature.ensure_usable()?;

        let mut chain = Vec::with_capacity(feature.dependencies.len() + 1);
        for dep in &feature.dependencies {
            let adapter = self.features.get(dep).ok_or_else(|| AdapterError::NotSupported {
                message: format!("'{name}' requires '{dep}', which is not available").into(),
                context: None,
            })?;
            adapter.ensure_usable()?;
            chain.push(adapter);
        }
        chain.push(feature);
        Ok(chain)
    }

    /// Host-native to uniform.
    pub fn to_uniform(&self, value: &NativeValue) -> Result<Value, AdapterError> {
        self.strategy.to_uniform(value)
    }

    /// Uniform to host-native.
    pub fn to_native(&self, value: &Value) -> Result<NativeValue, AdapterError> {
        self.strategy.to_native(value)
    }
}
