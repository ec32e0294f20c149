use hb_domain::features::keys;
use hb_domain::{
    CapabilitySet, FeatureCategory, FeatureDefinition, HostVersion, PerformanceProfile, Stability,
};

/// The built-in feature vocabulary, dependencies first.
#[must_use]
pub fn builtin_features() -> Vec<FeatureDefinition> {
    vec![
        FeatureDefinition::new(keys::LEGACY_UNITS, HostVersion::V2021)
            .max_version(HostVersion::V2021)
            .describe("Integer display-unit enumeration")
            .category(FeatureCategory::Units)
            .stability(Stability::Deprecated)
            .requires(CapabilitySet::PARAMETERS),
        FeatureDefinition::new(keys::FORGE_UNITS, HostVersion::V2022)
            .describe("Forge type identifiers for units and specs")
            .category(FeatureCategory::Units)
            .conflicts_with(keys::LEGACY_UNITS)
            .requires(CapabilitySet::PARAMETERS),
        FeatureDefinition::new(keys::MODERN_TRANSACTIONS, HostVersion::V2022)
            .describe("Transaction API with failure handling options")
            .category(FeatureCategory::Transactions)
            .requires(CapabilitySet::TRANSACTIONS),
        FeatureDefinition::new(keys::NESTED_TRANSACTIONS, HostVersion::V2023)
            .describe("Sub-transactions inside an open transaction")
            .category(FeatureCategory::Transactions)
            .depends_on(keys::MODERN_TRANSACTIONS)
            .stability(Stability::Beta)
            .requires(CapabilitySet::TRANSACTIONS),
        FeatureDefinition::new(keys::WIDE_ELEMENT_IDS, HostVersion::V2024)
            .describe("64-bit element identifiers")
            .category(FeatureCategory::Elements)
            .requires(CapabilitySet::ELEMENTS),
        FeatureDefinition::new(keys::GEOMETRY_API, HostVersion::V2021)
            .describe("Element locations and bounding geometry")
            .category(FeatureCategory::Geometry)
            .performance(PerformanceProfile::Moderate)
            .requires(CapabilitySet::GEOMETRY),
        FeatureDefinition::new(keys::FAMILY_API, HostVersion::V2021)
            .describe("Family symbol queries and placement")
            .category(FeatureCategory::Families)
            .requires(CapabilitySet::FAMILIES),
        FeatureDefinition::new(keys::SELECTION_API, HostVersion::V2021)
            .describe("Read and replace the active selection")
            .category(FeatureCategory::Selection)
            .performance(PerformanceProfile::Low)
            .requires(CapabilitySet::SELECTION),
        FeatureDefinition::new(keys::VIEW_API, HostVersion::V2021)
            .describe("View enumeration and activation")
            .category(FeatureCategory::Views)
            .requires(CapabilitySet::VIEWS),
        FeatureDefinition::new(keys::CLOUD_MODEL_SUPPORT, HostVersion::V2023)
            .describe("Cloud-hosted model access")
            .category(FeatureCategory::Cloud)
            .depends_on(keys::MODERN_TRANSACTIONS)
            .licensed()
            .performance(PerformanceProfile::High)
            .requires(CapabilitySet::ELEMENTS),
        FeatureDefinition::new(keys::PARALLEL_QUERIES, HostVersion::V2025)
            .describe("Concurrent read-only element queries")
            .category(FeatureCategory::Performance)
            .depends_on(keys::WIDE_ELEMENT_IDS)
            .stability(Stability::Alpha)
            .performance(PerformanceProfile::High)
            .requires(CapabilitySet::ELEMENTS),
    ]
}
