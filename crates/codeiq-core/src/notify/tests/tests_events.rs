//! Tests for lifecycle events

#![allow(clippy::expect_used)]

use rstest::rstest;

use crate::notify::{LifecycleEvent, LifecycleEventKind, LifecycleNotifier, NoopNotifier};

#[rstest]
#[case(LifecycleEventKind::Started, "scan/individual_start")]
#[case(LifecycleEventKind::Finished, "scan/individual_finish")]
#[case(LifecycleEventKind::Failed, "scan/individual_failed")]
#[case(LifecycleEventKind::ScanComplete, "scan/complete")]
fn test_endpoints(#[case] kind: LifecycleEventKind, #[case] endpoint: &str) {
    assert_eq!(kind.endpoint(), endpoint);
}

#[test]
fn test_scanner_event_body() {
    let event = LifecycleEvent::scanner(LifecycleEventKind::Started, "Linter", "/repo", "scan-1");

    let body = serde_json::to_value(&event).expect("event serializes");

    assert_eq!(
        body,
        serde_json::json!({"scanner": "Linter", "path": "/repo", "scan_id": "scan-1"})
    );
}

#[test]
fn test_scan_complete_body_has_only_scan_id() {
    let body = serde_json::to_value(LifecycleEvent::scan_complete("scan-1"))
        .expect("event serializes");

    assert_eq!(body, serde_json::json!({"scan_id": "scan-1"}));
}

#[tokio::test]
async fn test_noop_notifier_accepts_everything() {
    let result = NoopNotifier
        .notify(&LifecycleEvent::scan_complete("scan-1"))
        .await;
    assert!(result.is_ok());
}
