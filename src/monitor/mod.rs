pub mod change_detector;
pub mod rate_monitor;

pub use change_detector::has_changes;
pub use rate_monitor::{CycleOutcome, MonitorStatus, RateMonitor};
