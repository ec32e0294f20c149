use crate::capability::CapabilitySet;
use crate::version::HostVersion;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Stable feature keys. Other subsystems query availability by these names; they never change
/// even when availability does.
pub mod keys {
    pub const MODERN_TRANSACTIONS: &str = "ModernTransactions";
    pub const NESTED_TRANSACTIONS: &str = "NestedTransactions";
    pub const CLOUD_MODEL_SUPPORT: &str = "CloudModelSupport";
    pub const FORGE_UNITS: &str = "ForgeUnits";
    pub const LEGACY_UNITS: &str = "LegacyUnits";
    pub const WIDE_ELEMENT_IDS: &str = "WideElementIds";
    pub const GEOMETRY_API: &str = "GeometryApi";
    pub const FAMILY_API: &str = "FamilyApi";
    pub const SELECTION_API: &str = "SelectionApi";
    pub const VIEW_API: &str = "ViewApi";
    pub const PARALLEL_QUERIES: &str = "ParallelQueries";
}

/// Maturity tier of a feature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stability {
    #[default]
    Stable,
    Beta,
    Alpha,
    Deprecated,
}

/// Cell value of the availability matrix.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureStatus {
    NotAvailable,
    Available,
    Limited,
    Experimental,
    Deprecated,
    RequiresLicense,
}

impl FeatureStatus {
    /// Every status except `NotAvailable` and `RequiresLicense` may be used.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Available | Self::Limited | Self::Experimental | Self::Deprecated)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PerformanceProfile {
    #[default]
    Negligible,
    Low,
    Moderate,
    High,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureCategory {
    #[default]
    Core,
    Transactions,
    Elements,
    Parameters,
    Geometry,
    Selection,
    Views,
    Families,
    Units,
    Cloud,
    Performance,
}

/// Per-version override of a feature's computed availability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum VersionOverride {
    /// Use the result of the normal version, stability and license rules.
    #[default]
    Inherit,
    Configured {
        enabled: bool,
        #[serde(default)]
        settings: BTreeMap<String, String>,
    },
}

/// A version-gated capability definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: FeatureCategory,
    pub min_version: HostVersion,
    #[serde(default)]
    pub max_version: Option<HostVersion>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub stability: Stability,
    #[serde(default)]
    pub requires_license: bool,
    #[serde(default)]
    pub performance: PerformanceProfile,
    /// Adapter capabilities a host must expose for this feature to be usable.
    #[serde(default)]
    pub capabilities: CapabilitySet,
    #[serde(default)]
    pub overrides: BTreeMap<HostVersion, VersionOverride>,
}

impl FeatureDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, min_version: HostVersion) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: FeatureCategory::default(),
            min_version,
            max_version: None,
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            stability: Stability::default(),
            requires_license: false,
            performance: PerformanceProfile::default(),
            capabilities: CapabilitySet::empty(),
            overrides: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn category(mut self, category: FeatureCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub const fn max_version(mut self, max: HostVersion) -> Self {
        self.max_version = Some(max);
        self
    }

    #[must_use]
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    #[must_use]
    pub fn conflicts_with(mut self, name: impl Into<String>) -> Self {
        self.conflicts.push(name.into());
        self
    }

    #[must_use]
    pub const fn stability(mut self, stability: Stability) -> Self {
        self.stability = stability;
        self
    }

    #[must_use]
    pub const fn licensed(mut self) -> Self {
        self.requires_license = true;
        self
    }

    #[must_use]
    pub const fn performance(mut self, profile: PerformanceProfile) -> Self {
        self.performance = profile;
        self
    }

    #[must_use]
    pub const fn requires(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[must_use]
    pub fn with_override(mut self, version: HostVersion, value: VersionOverride) -> Self {
        self.overrides.insert(version, value);
        self
    }

    /// Whether `version` falls inside `[min_version, max_version]`.
    #[must_use]
    pub fn supports(&self, version: HostVersion) -> bool {
        version >= self.min_version && self.max_version.is_none_or(|max| version <= max)
    }

    #[must_use]
    pub fn override_for(&self, version: HostVersion) -> &VersionOverride {
        static INHERIT: VersionOverride = VersionOverride::Inherit;
        self.overrides.get(&version).unwrap_or(&INHERIT)
    }
}

/// Which license-gated features the current process may use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "grant", content = "features", rename_all = "snake_case")]
pub enum LicenseGrant {
    #[default]
    None,
    All,
    Features(BTreeSet<String>),
}

impl LicenseGrant {
    #[must_use]
    pub fn allows(&self, feature: &str) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Features(set) => set.contains(feature),
        }
    }
}

/// Process-wide flags that gate feature availability independently of version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturePolicy {
    pub allow_deprecated: bool,
    pub allow_experimental: bool,
    pub license: LicenseGrant,
}

impl Default for FeaturePolicy {
    fn default() -> Self {
        Self { allow_deprecated: true, allow_experimental: false, license: LicenseGrant::None }
    }
}

impl FeaturePolicy {
    /// Policy with every gate open, handy for diagnostics that want the widest view.
    #[must_use]
    pub const fn permissive() -> Self {
        Self { allow_deprecated: true, allow_experimental: true, license: LicenseGrant::All }
    }

    #[must_use]
    pub fn with_license(mut self, license: LicenseGrant) -> Self {
        self.license = license;
        self
    }
}
