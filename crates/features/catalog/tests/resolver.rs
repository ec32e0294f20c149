use hb_catalog::*;
use hb_domain::features::keys;
use hb_domain::{
    DetectionSource, FeatureDefinition, FeaturePolicy, FeatureStatus, HostVersion, LicenseGrant,
    Stability, VersionInfo, VersionOverride,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

fn defaults() -> Arc<FeatureCatalog> {
    Arc::new(FeatureCatalog::with_defaults().unwrap())
}

fn resolver(policy: FeaturePolicy) -> FeatureResolver {
    FeatureResolver::new(defaults(), policy)
}

fn licensed(features: &[&str]) -> FeaturePolicy {
    FeaturePolicy::default()
        .with_license(LicenseGrant::Features(features.iter().map(|f| (*f).to_owned()).collect()))
}

#[test]
fn modern_transactions_follow_minimum_version() {
    let r = resolver(FeaturePolicy::default());
    assert!(!r.is_enabled(keys::MODERN_TRANSACTIONS, HostVersion::V2021));
    assert!(r.is_enabled(keys::MODERN_TRANSACTIONS, HostVersion::V2022));
    assert!(r.is_enabled(keys::MODERN_TRANSACTIONS, HostVersion::V2023));
}

#[test]
fn cloud_support_needs_a_license() {
    let unlicensed = resolver(FeaturePolicy::default());
    assert!(!unlicensed.is_enabled(keys::CLOUD_MODEL_SUPPORT, HostVersion::V2023));
    assert_eq!(
        unlicensed.status(keys::CLOUD_MODEL_SUPPORT, HostVersion::V2023),
        FeatureStatus::RequiresLicense
    );

    let licensed = resolver(licensed(&[keys::CLOUD_MODEL_SUPPORT]));
    assert!(licensed.is_enabled(keys::CLOUD_MODEL_SUPPORT, HostVersion::V2023));
    assert!(!licensed.is_enabled(keys::CLOUD_MODEL_SUPPORT, HostVersion::V2022));
}

#[test]
fn unknown_feature_and_unknown_version_are_never_enabled() {
    let r = resolver(FeaturePolicy::permissive());
    assert!(!r.is_enabled("Teleportation", HostVersion::V2025));
    for name in r.catalog().names() {
        assert_eq!(r.status(&name, HostVersion::Unknown), FeatureStatus::NotAvailable);
    }
}

#[test]
fn policy_gates_stability_tiers() {
    let strict = FeaturePolicy { allow_deprecated: false, ..FeaturePolicy::default() };
    assert!(!resolver(strict).is_enabled(keys::LEGACY_UNITS, HostVersion::V2021));
    assert_eq!(
        resolver(FeaturePolicy::default()).status(keys::LEGACY_UNITS, HostVersion::V2021),
        FeatureStatus::Deprecated
    );

    assert!(!resolver(FeaturePolicy::default()).is_enabled(keys::PARALLEL_QUERIES, HostVersion::V2025));
    let experimental = FeaturePolicy { allow_experimental: true, ..FeaturePolicy::default() };
    assert_eq!(
        resolver(experimental).status(keys::PARALLEL_QUERIES, HostVersion::V2025),
        FeatureStatus::Experimental
    );

    assert_eq!(
        resolver(FeaturePolicy::default()).status(keys::NESTED_TRANSACTIONS, HostVersion::V2023),
        FeatureStatus::Limited
    );
}

#[test]
fn future_versions_run_as_experimental() {
    assert!(!resolver(FeaturePolicy::default()).is_enabled(keys::VIEW_API, HostVersion::Future));
    let experimental = FeaturePolicy { allow_experimental: true, ..FeaturePolicy::default() };
    assert_eq!(
        resolver(experimental).status(keys::VIEW_API, HostVersion::Future),
        FeatureStatus::Experimental
    );
    assert_eq!(
        resolver(FeaturePolicy::permissive()).status(keys::LEGACY_UNITS, HostVersion::Future),
        FeatureStatus::NotAvailable
    );
}

#[test]
fn override_can_veto_a_version() {
    let catalog = defaults();
    let def = (*catalog.get(keys::GEOMETRY_API).unwrap()).clone().with_override(
        HostVersion::V2023,
        VersionOverride::Configured { enabled: false, settings: BTreeMap::new() },
    );
    catalog.register(def).unwrap();

    let r = FeatureResolver::new(catalog, FeaturePolicy::default());
    assert!(r.is_enabled(keys::GEOMETRY_API, HostVersion::V2022));
    assert!(!r.is_enabled(keys::GEOMETRY_API, HostVersion::V2023));
    assert!(r.is_enabled(keys::GEOMETRY_API, HostVersion::V2024));
}

#[test]
fn validation_separates_errors_from_warnings() {
    let r = resolver(FeaturePolicy::default());

    let ok = r.validate_dependencies(keys::NESTED_TRANSACTIONS, HostVersion::V2024);
    assert!(ok.is_valid(), "{ok:?}");
    assert!(ok.warnings.iter().any(|w| w.contains("beta")));

    let too_old = r.validate_dependencies(keys::NESTED_TRANSACTIONS, HostVersion::V2022);
    assert!(!too_old.is_valid());
    assert!(too_old.errors[0].contains("2023"));

    let unlicensed = r.validate_dependencies(keys::CLOUD_MODEL_SUPPORT, HostVersion::V2024);
    assert!(!unlicensed.is_valid());
    assert!(unlicensed.missing_dependencies.is_empty());
    assert!(!unlicensed.recommendations.is_empty());
    assert_eq!(unlicensed.to_error().unwrap().kind(), "Incompatible");
}

#[test]
fn missing_dependency_is_an_error_and_conflict_a_warning() {
    let catalog = Arc::new(FeatureCatalog::new());
    catalog.register(FeatureDefinition::new("Base", HostVersion::V2024)).unwrap();
    catalog
        .register(FeatureDefinition::new("Addon", HostVersion::V2022).depends_on("Base"))
        .unwrap();
    catalog
        .register(FeatureDefinition::new("Rival", HostVersion::V2022).conflicts_with("Addon"))
        .unwrap();
    let r = FeatureResolver::new(catalog, FeaturePolicy::default());

    let addon = r.validate_dependencies("Addon", HostVersion::V2023);
    assert_eq!(addon.missing_dependencies, vec!["Base".to_owned()]);
    let err = addon.to_error().unwrap();
    assert_eq!(err.kind(), "MissingDependency");
    assert!(err.to_string().contains("Base"));

    let rival = r.validate_dependencies("Rival", HostVersion::V2023);
    assert!(rival.is_valid());
    assert_eq!(rival.active_conflicts, vec!["Addon".to_owned()]);
    assert_eq!(rival.warnings.len(), 1);
}

#[test]
fn dependencies_resolve_in_load_order() {
    let r = resolver(FeaturePolicy::permissive());
    assert_eq!(
        r.resolve_dependencies(keys::PARALLEL_QUERIES, HostVersion::V2025).unwrap(),
        vec![keys::WIDE_ELEMENT_IDS.to_owned()]
    );
    assert!(r.resolve_dependencies(keys::VIEW_API, HostVersion::V2021).unwrap().is_empty());
    assert_eq!(
        r.resolve_dependencies(keys::NESTED_TRANSACTIONS, HostVersion::V2021).unwrap_err().kind(),
        "MissingDependency"
    );
    assert_eq!(r.resolve_dependencies("Nope", HostVersion::V2021).unwrap_err().kind(), "UnknownFeature");
}

#[test]
fn cycles_introduced_by_overwrite_are_detected() {
    let catalog = Arc::new(FeatureCatalog::new());
    catalog.register(FeatureDefinition::new("A", HostVersion::V2021)).unwrap();
    catalog.register(FeatureDefinition::new("B", HostVersion::V2021).depends_on("A")).unwrap();
    catalog.register(FeatureDefinition::new("A", HostVersion::V2021).depends_on("B")).unwrap();

    let r = FeatureResolver::new(catalog, FeaturePolicy::default());
    let err = r.resolve_dependencies("A", HostVersion::V2022).unwrap_err();
    assert_eq!(err.kind(), "DependencyCycle");
    assert!(err.to_string().contains("A -> B -> A"));
}

#[test]
fn matrix_agrees_with_is_enabled() {
    let r = resolver(licensed(&[keys::CLOUD_MODEL_SUPPORT]));
    let matrix = r.compatibility_matrix();
    assert_eq!(matrix.versions().len(), HostVersion::KNOWN.len() + 1);

    for name in r.catalog().names() {
        for &version in matrix.versions() {
            let cell = matrix.status(&name, version).unwrap();
            assert_eq!(cell.is_enabled(), r.is_enabled(&name, version), "{name} on {version}");
        }
    }

    let enabled: BTreeSet<_> = matrix.enabled_on(HostVersion::V2024).into_iter().collect();
    let owned = r.enabled_features(HostVersion::V2024);
    let expected: BTreeSet<&str> = owned.iter().map(String::as_str).collect();
    assert_eq!(enabled, expected);
}

#[test]
fn matrix_renders_markdown_and_json() {
    let matrix = resolver(FeaturePolicy::default()).compatibility_matrix();
    let md = matrix.to_markdown();
    assert!(md.starts_with("| Feature | 2021 | 2022 | 2023 | 2024 | 2025 | future |"));
    assert!(md.contains("| ModernTransactions | not_available | available |"));

    let json: serde_json::Value = serde_json::from_str(&matrix.to_json().unwrap()).unwrap();
    assert_eq!(json["features"]["CloudModelSupport"]["2023"], "requires_license");
}

#[test]
fn unknown_environment_reports_exactly_one_critical() {
    let r = resolver(FeaturePolicy::default());
    let report = CompatibilityReport::evaluate(&VersionInfo::unknown("HostApp"), &r);
    assert_eq!(report.critical_count(), 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].category, IssueCategory::Compatibility);
    assert!(!report.is_compatible());
}

#[test]
fn report_flags_support_window_and_installation() {
    let r = resolver(FeaturePolicy::default());

    let future = VersionInfo::known(HostVersion::Future, "HostApp", DetectionSource::Environment);
    let report = CompatibilityReport::evaluate(&future, &r);
    assert!(report.is_compatible());
    assert_eq!(report.issues_with(Severity::Warning).count(), 1);

    let oldest = VersionInfo::known(HostVersion::V2021, "HostApp", DetectionSource::Registry);
    let report = CompatibilityReport::evaluate(&oldest, &r);
    assert_eq!(report.issues_with(Severity::Warning).count(), 1);
    assert!(report.enabled_features.contains(&keys::VIEW_API.to_owned()));

    let mut broken = VersionInfo::known(HostVersion::V2024, "HostApp", DetectionSource::Registry);
    broken.is_valid_installation = false;
    let report = CompatibilityReport::evaluate(&broken, &r);
    assert_eq!(report.critical_count(), 1);
    assert_eq!(report.issues_with(Severity::Warning).count(), 0);
}

fn any_version() -> impl Strategy<Value = HostVersion> {
    proptest::sample::select(HostVersion::ALL.to_vec())
}

fn any_stability() -> impl Strategy<Value = Stability> {
    proptest::sample::select(vec![Stability::Stable, Stability::Beta, Stability::Alpha, Stability::Deprecated])
}

proptest! {
    #[test]
    fn never_enabled_below_minimum(
        min in any_version(),
        version in any_version(),
        stability in any_stability(),
        licensed in any::<bool>(),
    ) {
        let catalog = Arc::new(FeatureCatalog::new());
        let mut def = FeatureDefinition::new("Probe", min).stability(stability);
        if licensed {
            def = def.licensed();
        }
        catalog.register(def).unwrap();
        let r = FeatureResolver::new(catalog, FeaturePolicy::permissive());

        let first = r.is_enabled("Probe", version);
        prop_assert_eq!(first, r.is_enabled("Probe", version));
        if version < min {
            prop_assert!(!first);
        }
    }
}
