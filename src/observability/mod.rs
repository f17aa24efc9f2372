pub mod metrics;
pub mod monitor;

pub use metrics::{BridgeMetrics, MetricsSnapshot};
pub use monitor::generate_report;
