use super::MetricsSnapshot;

/// Human-readable summary of bridge activity.
pub fn generate_report(snapshot: &MetricsSnapshot) -> String {
    if snapshot.invocations == 0 && snapshot.in_flight == 0 {
        return "No engine invocations".to_string();
    }

    let mut report = String::from("=== Engine Bridge ===\n");
    report.push_str(&format!(
        "  Invocations: {} ({} in flight)\n  Succeeded: {}\n  Failed: {}\n  Avg Latency: {}ms\n",
        snapshot.invocations,
        snapshot.in_flight,
        snapshot.successes,
        snapshot.failures,
        snapshot.avg_latency_us / 1000
    ));

    for (kind, count) in snapshot.by_outcome.iter().filter(|(k, c)| **c > 0 && *k != "Success") {
        report.push_str(&format!("  - {}: {}\n", kind, count));
    }

    report
}
