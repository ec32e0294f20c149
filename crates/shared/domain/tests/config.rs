use hb_domain::config::{BridgeConfig, CallConfig, DetectionConfig, FeaturesConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let call = CallConfig::default();
    assert_eq!(call.max_payload_bytes, 10 * 1024 * 1024);
    assert_eq!(call.default_timeout_ms, 30_000);
    assert!(call.default_timeout_ms <= call.max_timeout_ms);
    assert_eq!(call.log_excerpt_chars, 128);

    let detection = DetectionConfig::default();
    assert_eq!(detection.override_variable, "HOSTBRIDGE_HOST_VERSION");
    assert!(detection.records_file.is_none());

    let features = FeaturesConfig::default();
    assert!(features.allow_deprecated);
    assert!(!features.allow_experimental);
}

#[test]
fn bridge_config_deserializes_partial_sections() {
    let raw = json!({
        "bridge": { "default_timeout_ms": 500 },
        "detection": { "product_name": "Modeler", "install_roots": ["/opt/modeler"] },
        "features": { "allow_experimental": true }
    });

    let cfg: BridgeConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.bridge.default_timeout_ms, 500);
    assert_eq!(cfg.bridge.max_payload_bytes, 10 * 1024 * 1024);
    assert_eq!(cfg.detection.product_name, "Modeler");
    assert_eq!(cfg.detection.install_roots, vec![std::path::PathBuf::from("/opt/modeler")]);
    assert!(cfg.features.allow_experimental);
}

#[test]
fn clones_share_until_mutated() {
    let original = BridgeConfig::default();
    let mut copy = original.clone();
    copy.bridge.max_timeout_ms = 1_000;
    assert_eq!(original.bridge.max_timeout_ms, 300_000);
    assert_eq!(copy.bridge.max_timeout_ms, 1_000);
}
