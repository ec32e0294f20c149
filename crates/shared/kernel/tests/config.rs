use hb_kernel::config::load_config;
use hb_kernel::domain::config::BridgeConfig;
use std::io::Write;

#[test]
fn loads_toml_sections_over_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[bridge]
default_timeout_ms = 750

[detection]
product_name = "Modeler"
scan_depth = 2

[features]
allow_experimental = true
"#
    )
    .unwrap();

    let cfg: BridgeConfig = load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.bridge.default_timeout_ms, 750);
    assert_eq!(cfg.bridge.max_payload_bytes, 10 * 1024 * 1024);
    assert_eq!(cfg.detection.product_name, "Modeler");
    assert_eq!(cfg.detection.scan_depth, 2);
    assert!(cfg.features.allow_experimental);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = load_config::<BridgeConfig>(Some(&missing)).unwrap_err();
    assert_eq!(err.kind(), "Config");
}

#[test]
fn type_mismatch_is_reported() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{ "bridge": {{ "max_payload_bytes": "lots" }} }}"#).unwrap();
    let err = load_config::<BridgeConfig>(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("Failed to deserialize config"));
}
