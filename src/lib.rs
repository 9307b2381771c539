//! Daily snapshot of offline cameras reported by a VSaaS watcher.

pub use collector::{client, collector::Collector, config, error, models, pagination, report, snapshot};
pub use telemetry;
