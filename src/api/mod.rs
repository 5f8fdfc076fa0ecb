pub mod rest;
pub mod websocket;

use std::sync::Arc;
use crate::broadcast::BroadcastSink;
use crate::monitor::RateMonitor;

pub use rest::create_router;

/// Handles shared by every request handler.
pub struct AppState {
    pub monitor: Arc<RateMonitor>,
    pub broadcast: Arc<BroadcastSink>,
    pub email_preview_limit: usize,
}
