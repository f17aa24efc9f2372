use modemscope::bridge::OutcomeKind;
use modemscope::observability::{generate_report, BridgeMetrics};
use std::sync::Arc;

#[test]
fn test_metrics_creation() {
    let metrics = BridgeMetrics::new();
    assert_eq!(metrics.invocations(), 0);
    assert_eq!(metrics.in_flight(), 0);
    assert_eq!(metrics.avg_latency_us(), 0);
}

#[test]
fn test_metrics_outcome_counts() {
    let metrics = Arc::new(BridgeMetrics::new());

    let start = metrics.start_invocation();
    assert_eq!(metrics.in_flight(), 1);
    metrics.finish_invocation(start, OutcomeKind::Success);

    let start = metrics.start_invocation();
    metrics.finish_invocation(start, OutcomeKind::Timeout);

    assert_eq!(metrics.invocations(), 2);
    assert_eq!(metrics.in_flight(), 0);
    assert_eq!(metrics.count(OutcomeKind::Success), 1);
    assert_eq!(metrics.count(OutcomeKind::Timeout), 1);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.failures, 1);
    assert_eq!(snapshot.by_outcome.len(), OutcomeKind::ALL.len());
}

#[tokio::test]
async fn test_metrics_latency_tracking() {
    let metrics = BridgeMetrics::new();

    let start = metrics.start_invocation();
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    metrics.finish_invocation(start, OutcomeKind::Success);

    assert!(metrics.avg_latency_us() >= 10_000);
}

#[test]
fn test_report() {
    let metrics = BridgeMetrics::new();
    assert_eq!(generate_report(&metrics.snapshot()), "No engine invocations");

    let start = metrics.start_invocation();
    metrics.finish_invocation(start, OutcomeKind::LaunchFailed);

    let report = generate_report(&metrics.snapshot());
    assert!(report.contains("Invocations: 1"));
    assert!(report.contains("LaunchFailed: 1"));
    assert!(!report.contains("Success:"));
}
