pub mod email_sink;
pub mod log_sink;
pub mod summary_sink;

use std::sync::{Arc, RwLock};
use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{info, error, warn, Instrument};
use crate::error::Result;
use crate::observability::metrics;
use crate::types::{RateSnapshot, SinkId};

pub use email_sink::EmailSink;
pub use log_sink::LogSink;
pub use summary_sink::SummarySink;

/// A consumer of published snapshots.
///
/// `update` resolves once the delivery attempt is over. Errors are reported to
/// the registry, which logs them and carries on with the other sinks.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn id(&self) -> SinkId;
    fn name(&self) -> &str;
    async fn update(&self, snapshot: Arc<RateSnapshot>) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FanOutSummary {
    pub attempted: usize,
    pub failed: usize,
}

/// Ordered set of attached sinks, keyed by `SinkId`.
pub struct SinkRegistry {
    sinks: RwLock<Vec<Arc<dyn NotificationSink>>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        SinkRegistry {
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// Returns false if a sink with the same id is already attached.
    pub fn attach(&self, sink: Arc<dyn NotificationSink>) -> bool {
        let mut sinks = self.sinks.write().unwrap_or_else(|e| e.into_inner());
        if sinks.iter().any(|s| s.id() == sink.id()) {
            return false;
        }

        info!(sink = sink.name(), id = %sink.id(), "Sink attached");
        sinks.push(sink);
        true
    }

    pub fn detach(&self, id: SinkId) -> bool {
        let mut sinks = self.sinks.write().unwrap_or_else(|e| e.into_inner());
        match sinks.iter().position(|s| s.id() == id) {
            Some(index) => {
                let sink = sinks.remove(index);
                info!(sink = sink.name(), id = %id, "Sink detached");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `snapshot` to every attached sink concurrently and wait for all.
    ///
    /// The sink list is copied up front, so attach/detach during a fan-out only
    /// affects the next one. Each sink runs in its own task; an error or a panic
    /// in one of them is logged and counted, never propagated.
    pub async fn notify(&self, snapshot: Arc<RateSnapshot>) -> FanOutSummary {
        let sinks: Vec<Arc<dyn NotificationSink>> = self.sinks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        if sinks.is_empty() {
            info!("No sinks attached, snapshot not delivered");
            return FanOutSummary::default();
        }

        let span = tracing::info_span!("fan_out", sinks = sinks.len());
        info!(parent: &span, "Notifying {} sinks", sinks.len());

        let mut tasks = JoinSet::new();
        for sink in sinks.iter().cloned() {
            let snapshot = Arc::clone(&snapshot);
            tasks.spawn(
                async move {
                    let result = sink.update(snapshot).await;
                    (sink.name().to_string(), result)
                }
                .instrument(span.clone()),
            );
        }

        let mut summary = FanOutSummary {
            attempted: sinks.len(),
            failed: 0,
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((name, Err(e))) => {
                    summary.failed += 1;
                    metrics::SINK_DELIVERY_FAILURES.inc();
                    warn!(parent: &span, sink = %name, "Sink delivery failed: {}", e);
                }
                Err(e) => {
                    summary.failed += 1;
                    metrics::SINK_DELIVERY_FAILURES.inc();
                    error!(parent: &span, "Sink task aborted: {}", e);
                }
            }
        }

        summary
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
