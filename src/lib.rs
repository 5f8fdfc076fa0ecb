pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod feed;
pub mod monitor;
pub mod notify;
pub mod observability;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use monitor::{RateMonitor, MonitorStatus, CycleOutcome};
pub use notify::{NotificationSink, SinkRegistry};
pub use types::{RateEntry, RateSnapshot};
