use crate::bridge::OutcomeKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters for one bridge instance, shared across concurrent invocations.
pub struct BridgeMetrics {
    in_flight: AtomicU64,
    outcomes: [AtomicU64; OutcomeKind::ALL.len()],
    total_latency_us: AtomicU64,
    latency_samples: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub invocations: u64,
    pub in_flight: u64,
    pub successes: u64,
    pub failures: u64,
    pub by_outcome: BTreeMap<String, u64>,
    pub avg_latency_us: u64,
}

impl BridgeMetrics {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicU64::new(0),
            outcomes: Default::default(),
            total_latency_us: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
        }
    }

    pub fn start_invocation(&self) -> Instant {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        Instant::now()
    }

    pub fn finish_invocation(&self, start: Instant, outcome: OutcomeKind) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
        self.outcomes[outcome.index()].fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn count(&self, outcome: OutcomeKind) -> u64 {
        self.outcomes[outcome.index()].load(Ordering::Relaxed)
    }

    pub fn invocations(&self) -> u64 {
        self.outcomes.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn avg_latency_us(&self) -> u64 {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / samples
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let by_outcome: BTreeMap<String, u64> = OutcomeKind::ALL
            .iter()
            .map(|kind| (format!("{:?}", kind), self.count(*kind)))
            .collect();
        let invocations = self.invocations();
        let successes = self.count(OutcomeKind::Success);

        MetricsSnapshot {
            invocations,
            in_flight: self.in_flight(),
            successes,
            failures: invocations - successes,
            by_outcome,
            avg_latency_us: self.avg_latency_us(),
        }
    }
}

impl Default for BridgeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
