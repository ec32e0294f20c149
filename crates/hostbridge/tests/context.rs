use hostbridge::detection::VersionDetector;
use hostbridge::prelude::*;
use hostbridge::domain::DetectionSource;
use std::io::Write;
use std::sync::Arc;

fn forced(year: &'static str) -> BridgeContext {
    BridgeContext::builder()
        .env_lookup(Arc::new(move |_| Some(year.to_owned())))
        .build()
        .unwrap()
}

#[tokio::test]
async fn forced_version_connects_and_serves_calls() {
    let context = forced("2024");
    let info = context.detect();
    assert_eq!(info.version, HostVersion::V2024);
    assert_eq!(info.source, DetectionSource::Environment);

    let adapter = context.connect(Arc::new(SimulatedHost::new(2024))).unwrap();
    assert_eq!(adapter.strategy_name(), "wide-id");

    let response = CallResponse::from_json(&context.bridge().call("host.info", "{}", None).await).unwrap();
    assert!(response.ok);
    assert_eq!(response.result.unwrap()["version"], "2024");
}

#[tokio::test]
async fn nothing_detected_means_one_critical_issue_and_no_connection() {
    let context = BridgeContext::builder()
        .detector(VersionDetector::new("HostApp", Vec::new()))
        .build()
        .unwrap();

    assert_eq!(context.detect().version, HostVersion::Unknown);
    assert_eq!(context.report().critical_count(), 1);

    let err = context.connect(Arc::new(SimulatedHost::new(2024))).unwrap_err();
    assert_eq!(err.kind(), "Detection");
    assert!(!context.bridge().is_connected());
}

#[test]
fn license_override_unlocks_gated_features() {
    let unlicensed = forced("2023");
    assert_eq!(
        unlicensed.resolver().status(keys::CLOUD_MODEL_SUPPORT, HostVersion::V2023),
        FeatureStatus::RequiresLicense
    );

    let licensed = BridgeContext::builder()
        .env_lookup(Arc::new(|_| Some("2023".to_owned())))
        .license(LicenseGrant::All)
        .build()
        .unwrap();
    assert!(licensed.resolver().is_enabled(keys::CLOUD_MODEL_SUPPORT, HostVersion::V2023));
}

#[test]
fn contexts_are_independent() {
    let a = forced("2021");
    let b = forced("2025");
    assert_eq!(a.detect().version, HostVersion::V2021);
    assert_eq!(b.detect().version, HostVersion::V2025);
    assert!(!Arc::ptr_eq(a.registry(), b.registry()));
}

#[test]
fn configuration_file_is_layered_in() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[bridge]\ndefault_timeout_ms = 750\n\n[features]\nallow_experimental = true").unwrap();

    let context = BridgeContext::load(Some(file.path())).unwrap();
    assert_eq!(context.config().bridge.default_timeout_ms, 750);
    assert_eq!(context.config().bridge.max_payload_bytes, 10 * 1024 * 1024);
    assert!(context.resolver().policy().allow_experimental);
}

#[test]
fn missing_configuration_file_is_an_error() {
    let err = BridgeContext::load(Some(std::path::Path::new("/nonexistent/hostbridge.toml"))).unwrap_err();
    assert_eq!(err.kind(), "Config");
}
