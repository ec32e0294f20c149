use hb_adapters::{AdapterRegistry, Fault, SimulatedHost};
use hb_bridge::*;
use hb_catalog::{FeatureCatalog, FeatureResolver};
use hb_domain::config::CallConfig;
use hb_domain::{DetectionSource, FeaturePolicy, HostVersion, LicenseGrant, VersionInfo};
use hb_transactions::TransactionStatus;
use serde_json::{Value as Json, json};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn registry(policy: FeaturePolicy) -> Arc<AdapterRegistry> {
    let catalog = Arc::new(FeatureCatalog::with_defaults().unwrap());
    Arc::new(AdapterRegistry::new(FeatureResolver::new(catalog, policy)))
}

fn info(version: HostVersion) -> VersionInfo {
    VersionInfo::known(version, "HostApp", DetectionSource::Environment)
}

fn connected(year: u32, policy: FeaturePolicy) -> (CallBridge, Arc<SimulatedHost>) {
    let bridge = CallBridge::new(&CallConfig::default(), registry(policy)).unwrap();
    let host = Arc::new(SimulatedHost::new(year));
    assert!(bridge.connect(host.clone(), &info(HostVersion::from_year(year))));
    (bridge, host)
}

async fn first_of(bridge: &CallBridge, category: &str) -> i64 {
    let found = bridge
        .try_call("lookup", "element.byCategory", &json!({ "category": category }).to_string(), None)
        .await
        .unwrap();
    found[0]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn calls_before_connecting_fail_cleanly() {
    let bridge = CallBridge::new(&CallConfig::default(), registry(FeaturePolicy::default())).unwrap();
    let err = bridge.try_call("r1", "host.ping", "{}", None).await.unwrap_err();
    assert_eq!(err.kind(), "NotConnected");

    let response: Json = serde_json::from_str(&bridge.call("host.ping", "{}", None).await).unwrap();
    assert_eq!(response["ok"], false);
    assert_eq!(response["error"]["code"], "NotConnected");
    assert_eq!(response["id"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn unknown_version_is_a_detection_error() {
    let bridge = CallBridge::new(&CallConfig::default(), registry(FeaturePolicy::default())).unwrap();
    let err = bridge
        .try_connect(Arc::new(SimulatedHost::new(2024)), &VersionInfo::unknown("HostApp"))
        .unwrap_err();
    assert_eq!(err.kind(), "Detection");
    assert!(!bridge.is_connected());
}

#[tokio::test]
async fn mismatched_host_is_a_compatibility_error() {
    let bridge = CallBridge::new(&CallConfig::default(), registry(FeaturePolicy::default())).unwrap();
    let err = bridge
        .try_connect(Arc::new(SimulatedHost::new(2022)), &info(HostVersion::V2024))
        .unwrap_err();
    assert_eq!(err.kind(), "Compatibility");
}

#[tokio::test]
async fn envelope_round_trip_for_a_read() {
    let (bridge, _) = connected(2024, FeaturePolicy::default());
    let raw = bridge.call("host.info", "", None).await;
    let response = CallResponse::from_json(&raw).unwrap();
    assert!(response.ok);
    let result = response.result.unwrap();
    assert_eq!(result["strategy"], "wide-id");
    assert_eq!(result["year"], 2024);
}

#[tokio::test]
async fn oversized_payload_is_rejected_before_parsing() {
    let (bridge, host) = connected(2024, FeaturePolicy::default());
    let before = host.element_count();
    // Not valid JSON either: a parse attempt would report Malformed instead.
    let payload = "x".repeat(11 * 1024 * 1024);

    let err = bridge.try_call("big", "element.create", &payload, None).await.unwrap_err();
    assert_eq!(err.kind(), "Validation");
    assert!(err.to_string().contains("byte limit"), "{err}");
    assert_eq!(host.element_count(), before);
}

#[tokio::test]
async fn malformed_and_malicious_payloads_are_validation_errors() {
    let (bridge, _) = connected(2023, FeaturePolicy::default());

    let err = bridge.try_call("m", "element.get", "{\"id\": ", None).await.unwrap_err();
    assert_eq!(err.kind(), "Validation");

    let params = json!({ "category": "Walls", "name": "../../etc/passwd" }).to_string();
    let err = bridge.try_call("i", "element.create", &params, None).await.unwrap_err();
    assert_eq!(err.kind(), "Validation");
    assert!(err.to_string().contains("path traversal"));
}

#[tokio::test]
async fn unknown_methods_and_bad_parameters() {
    let (bridge, _) = connected(2023, FeaturePolicy::default());

    let err = bridge.try_call("u", "element.explode", "{}", None).await.unwrap_err();
    assert_eq!(err.kind(), "MethodNotFound");

    let err = bridge.try_call("p", "element.get", r#"{"identifier": 1}"#, None).await.unwrap_err();
    assert_eq!(err.kind(), "Validation");
    assert!(err.to_string().contains("invalid parameters"));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reads_return_their_own_element() {
    let (bridge, host) = connected(2025, FeaturePolicy::default());
    let bridge = Arc::new(bridge);
    let mut ids = Vec::new();
    for i in 0..50 {
        let params = json!({ "category": "Walls", "name": format!("Wall {i}") }).to_string();
        let created = bridge.try_call(&format!("seed-{i}"), "element.create", &params, None).await.unwrap();
        ids.push(created["id"].as_i64().unwrap());
    }
    host.set_latency(Duration::from_millis(100));

    let started = Instant::now();
    let handles: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move {
                let params = json!({ "id": id }).to_string();
                (id, bridge.try_call(&format!("read-{i}"), "element.get", &params, None).await)
            })
        })
        .collect();
    for handle in handles {
        let (id, outcome) = handle.await.unwrap();
        assert_eq!(outcome.unwrap()["id"], id);
    }
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(2_500), "reads did not overlap: {elapsed:?}");
    assert_eq!(bridge.in_flight_count(), 0);
}

async fn wait_for_late_results(bridge: &CallBridge, expected: u64) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while bridge.late_results() < expected {
        assert!(Instant::now() < deadline, "late results stuck at {}", bridge.late_results());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_write_is_rolled_back_with_the_original_message() {
    let (bridge, host) = connected(2024, FeaturePolicy::default());
    let wall = first_of(&bridge, "Walls").await;
    let params = json!({ "id": wall, "name": "Length", "value": { "type": "text", "value": "long" } });

    let err = bridge.try_call("w", "parameter.set", &params.to_string(), None).await.unwrap_err();
    assert_eq!(err.kind(), "Transaction");
    assert!(err.to_string().contains("stores Double"), "{err}");

    let adapter = bridge.adapter().unwrap();
    let last = adapter.transactions().history().pop().unwrap();
    assert_eq!(last.status, TransactionStatus::RolledBack);
    assert_eq!(last.name, "parameter.set");
    assert_eq!(host.open_transactions(), 0);

    let length = bridge
        .try_call("r", "parameter.get", &json!({ "id": wall, "name": "Length" }).to_string(), None)
        .await
        .unwrap();
    assert_eq!(length, json!({ "type": "number", "value": 5.0 }));
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_write_commits() {
    let (bridge, host) = connected(2021, FeaturePolicy::default());
    let before = host.element_count();

    let created = bridge
        .try_call("c", "element.create", r#"{"category": "Walls", "name": "Wall 2"}"#, None)
        .await
        .unwrap();
    assert_eq!(created["name"], "Wall 2");
    assert_eq!(host.element_count(), before + 1);

    let history = bridge.adapter().unwrap().transactions().history();
    assert_eq!(history.last().unwrap().status, TransactionStatus::Committed);
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_operation_times_out_and_its_result_is_discarded() {
    let (bridge, host) = connected(2024, FeaturePolicy::default());
    host.set_latency(Duration::from_millis(1500));

    let started = Instant::now();
    let err = bridge.try_call("slow", "view.list", "{}", Some(300)).await.unwrap_err();
    let waited = started.elapsed();

    assert_eq!(err.kind(), "Timeout");
    assert!(waited >= Duration::from_millis(300));
    assert!(waited < Duration::from_millis(1000), "waited {waited:?}");
    assert_eq!(bridge.in_flight_count(), 0);
    assert_eq!(bridge.late_results(), 0);

    tokio::time::sleep(Duration::from_millis(1800)).await;
    assert_eq!(bridge.late_results(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn timed_out_write_still_lands_atomically() {
    let (bridge, host) = connected(2024, FeaturePolicy::default());
    let before = host.element_count();
    host.set_latency(Duration::from_millis(300));

    let params = json!({ "category": "Walls", "name": "Slow wall" }).to_string();
    let err = bridge.try_call("slow-write", "element.create", &params, Some(600)).await.unwrap_err();
    assert_eq!(err.kind(), "Timeout");
    assert_eq!(bridge.in_flight_count(), 0);

    wait_for_late_results(&bridge, 1).await;
    assert_eq!(host.element_count(), before + 1);
    assert_eq!(host.open_transactions(), 0);
    let history = bridge.adapter().unwrap().transactions().history();
    assert_eq!(history.last().unwrap().status, TransactionStatus::Committed);

    host.set_latency(Duration::ZERO);
    let params = json!({ "category": "Walls", "name": "Next wall" }).to_string();
    bridge.try_call("next-write", "element.create", &params, None).await.unwrap();
    assert_eq!(host.element_count(), before + 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn write_abandoned_while_queued_is_rolled_back() {
    let (bridge, host) = connected(2024, FeaturePolicy::default());
    let bridge = Arc::new(bridge);
    let before = host.element_count();
    host.set_latency(Duration::from_millis(200));

    let running = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            let params = json!({ "category": "Walls", "name": "First" }).to_string();
            bridge.try_call("first", "element.create", &params, Some(10_000)).await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let params = json!({ "category": "Walls", "name": "Queued" }).to_string();
    let err = bridge.try_call("queued", "element.create", &params, Some(150)).await.unwrap_err();
    assert_eq!(err.kind(), "Timeout");

    let first = running.await.unwrap().unwrap();
    assert_eq!(first["name"], "First");
    wait_for_late_results(&bridge, 1).await;

    assert_eq!(host.element_count(), before + 1);
    assert_eq!(host.open_transactions(), 0);
    let statuses: Vec<_> = bridge
        .adapter()
        .unwrap()
        .transactions()
        .history()
        .into_iter()
        .filter(|r| r.name == "element.create")
        .map(|r| r.status)
        .collect();
    assert_eq!(statuses, vec![TransactionStatus::Committed, TransactionStatus::RolledBack]);

    host.set_latency(Duration::ZERO);
    let walls = bridge
        .try_call("walls", "element.byCategory", r#"{"category": "Walls"}"#, None)
        .await
        .unwrap();
    assert!(walls.as_array().unwrap().iter().all(|w| w["name"] != "Queued"));
}

#[tokio::test(flavor = "multi_thread")]
async fn timeout_is_capped_and_zero_means_default() {
    let config = CallConfig { default_timeout_ms: 1_000, max_timeout_ms: 5_000, ..CallConfig::default() };
    let bridge = CallBridge::new(&config, registry(FeaturePolicy::default())).unwrap();
    assert_eq!(bridge.effective_timeout(None), Duration::from_secs(1));
    assert_eq!(bridge.effective_timeout(Some(0)), Duration::from_secs(1));
    assert_eq!(bridge.effective_timeout(Some(2_000)), Duration::from_secs(2));
    assert_eq!(bridge.effective_timeout(Some(60_000)), Duration::from_secs(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn in_flight_calls_can_be_cancelled() {
    let (bridge, host) = connected(2023, FeaturePolicy::default());
    host.set_latency(Duration::from_millis(800));
    let bridge = Arc::new(bridge);

    let call = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move { bridge.try_call("job-1", "view.list", "{}", None).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(bridge.cancel("job-1"));
    assert!(!bridge.cancel("job-unknown"));

    let err = call.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), "Cancelled");
    assert_eq!(bridge.in_flight_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn host_panics_become_operation_errors() {
    let (bridge, host) = connected(2023, FeaturePolicy::default());
    host.inject_fault("views", Fault::Panic("renderer crashed".into()));

    let err = bridge.try_call("p", "view.list", "{}", None).await.unwrap_err();
    assert_eq!(err.kind(), "Operation");
    assert!(err.to_string().contains("renderer crashed"));

    host.clear_faults();
    assert!(bridge.try_call("p2", "view.list", "{}", None).await.is_ok());
}

#[tokio::test]
async fn missing_host_module_hides_the_capability() {
    let bridge = CallBridge::new(&CallConfig::default(), registry(FeaturePolicy::default())).unwrap();
    let host = Arc::new(SimulatedHost::new(2024).with_modules(["core"]));
    bridge.try_connect(host, &info(HostVersion::V2024)).unwrap();

    let err = bridge.try_call("g", "geometry.location", r#"{"id": 1}"#, None).await.unwrap_err();
    assert_eq!(err.kind(), "NotSupported");
}

#[tokio::test]
async fn feature_gates_follow_version_and_license() {
    let (old, _) = connected(2022, FeaturePolicy::default());
    let err = old.try_call("c1", "cloud.status", "{}", None).await.unwrap_err();
    assert_eq!(err.kind(), "Compatibility");
    assert!(err.to_string().contains("2023"), "{err}");

    let (unlicensed, _) = connected(2024, FeaturePolicy::default());
    let err = unlicensed.try_call("c2", "cloud.status", "{}", None).await.unwrap_err();
    assert_eq!(err.kind(), "Compatibility");

    let (licensed, _) = connected(2024, FeaturePolicy::default().with_license(LicenseGrant::All));
    let status = licensed.try_call("c3", "cloud.status", "{}", None).await.unwrap();
    assert_eq!(status["chain"], json!(["ModernTransactions", "CloudModelSupport"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn custom_methods_can_be_registered() {
    let (bridge, _) = connected(2025, FeaturePolicy::default());
    let replaced = bridge.register_method(MethodSpec::read("echo", |ctx| Ok(ctx.params.clone())));
    assert!(!replaced);
    assert!(bridge.method_names().contains(&"echo".to_owned()));

    let echoed = bridge.try_call("e", "echo", r#"{"hello": "world"}"#, None).await.unwrap();
    assert_eq!(echoed, json!({ "hello": "world" }));

    let report = bridge
        .try_call("f", "features.validate", r#"{"feature": "ParallelQueries"}"#, None)
        .await
        .unwrap();
    assert_eq!(report["feature"], "ParallelQueries");
    assert!(!report["errors"].as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn reconnecting_to_another_host_routes_calls_there() {
    let bridge = CallBridge::new(&CallConfig::default(), registry(FeaturePolicy::default())).unwrap();
    let host_a = Arc::new(SimulatedHost::new(2024));
    let host_b = Arc::new(SimulatedHost::new(2024));

    assert!(bridge.connect(host_a.clone(), &info(HostVersion::V2024)));
    bridge.disconnect();
    assert!(bridge.connect(host_b.clone(), &info(HostVersion::V2024)));

    let params = json!({ "category": "Walls", "name": "Wall B" }).to_string();
    bridge.try_call("b", "element.create", &params, None).await.unwrap();
    assert_eq!(host_a.element_count(), 3);
    assert_eq!(host_b.element_count(), 4);
}

#[tokio::test]
async fn disconnect_stops_dispatch() {
    let (bridge, _) = connected(2023, FeaturePolicy::default());
    assert!(bridge.try_call("a", "host.ping", "{}", None).await.is_ok());
    bridge.disconnect();
    let err = bridge.try_call("b", "host.ping", "{}", None).await.unwrap_err();
    assert_eq!(err.kind(), "NotConnected");
}
