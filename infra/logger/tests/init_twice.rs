use hb_logger::{LevelFilter, Logger, LoggerError};
use serial_test::serial;

#[test]
#[serial]
fn second_init_returns_subscriber_error() {
    let _logger = Logger::builder()
        .name("hb-init-twice")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("hb-init-twice-second")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second init should fail");

    assert_eq!(err.kind(), "Subscriber");
    assert!(matches!(err, LoggerError::Subscriber { .. }));
}
