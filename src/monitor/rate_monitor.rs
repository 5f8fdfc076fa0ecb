use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::future::Future;
use std::time::Duration;
use serde::Serialize;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{info, warn, Instrument};
use crate::feed::RateFeed;
use crate::monitor::change_detector::has_changes;
use crate::notify::{FanOutSummary, NotificationSink, SinkRegistry};
use crate::observability::metrics;
use crate::observability::tracing::trace_poll_cycle;
use crate::types::{RateSnapshot, SinkId};

/// Result of one fetch-compare-publish cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Published(FanOutSummary),
    Unchanged,
    FetchFailed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub poll_interval_ms: u64,
    pub sink_count: usize,
    pub tracked_currencies: usize,
}

struct SnapshotPair {
    current: Arc<RateSnapshot>,
    previous: Arc<RateSnapshot>,
}

/// Polls a feed on a fixed interval and publishes changed snapshots to sinks.
///
/// ## Lifecycle
/// `start` spawns the loop: one immediate cycle, then sleep / fetch / compare /
/// publish until `stop`. Stopping is cooperative: an in-flight fetch or fan-out
/// completes, and the loop exits at its next check.
///
/// ## Snapshot chaining
/// Every successful fetch moves `current` into `previous` before replacing it,
/// and cycles never overlap, so change detection always compares against the
/// immediately preceding snapshot. Failed or empty fetches leave both untouched.
pub struct RateMonitor {
    feed: Arc<dyn RateFeed>,
    sinks: Arc<SinkRegistry>,
    poll_interval: Duration,
    snapshots: RwLock<SnapshotPair>,
    running: AtomicBool,
    generation: AtomicU64,
    cycle_lock: Mutex<()>,
    wake: Notify,
    cycles: AtomicU64,
}

impl RateMonitor {
    pub fn new(feed: Arc<dyn RateFeed>, sinks: Arc<SinkRegistry>, poll_interval: Duration) -> Self {
        let empty = Arc::new(RateSnapshot::empty());
        RateMonitor {
            feed,
            sinks,
            poll_interval,
            snapshots: RwLock::new(SnapshotPair {
                current: Arc::clone(&empty),
                previous: empty,
            }),
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            cycle_lock: Mutex::new(()),
            wake: Notify::new(),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn attach(&self, sink: Arc<dyn NotificationSink>) -> bool {
        self.sinks.attach(sink)
    }

    pub fn detach(&self, id: SinkId) -> bool {
        self.sinks.detach(id)
    }

    pub fn sinks(&self) -> &Arc<SinkRegistry> {
        &self.sinks
    }

    pub fn current(&self) -> Arc<RateSnapshot> {
        Arc::clone(&self.snapshots.read().unwrap_or_else(|e| e.into_inner()).current)
    }

    pub fn previous(&self) -> Arc<RateSnapshot> {
        Arc::clone(&self.snapshots.read().unwrap_or_else(|e| e.into_inner()).previous)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            running: self.is_running(),
            poll_interval_ms: self.poll_interval.as_millis() as u64,
            sink_count: self.sinks.len(),
            tracked_currencies: self.current().len(),
        }
    }

    /// Spawn the poll loop. Returns `None` if it is already running.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rate monitor already running");
            return None;
        }

        // A loop left over from an earlier start exits once it sees a newer generation
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let monitor = Arc::clone(self);
        Some(tokio::spawn(async move { monitor.run_loop(generation).await }))
    }

    fn owns_loop(&self, generation: u64) -> bool {
        self.is_running() && self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Rate monitoring stop requested");
        }
        self.wake.notify_waiters();
    }

    async fn run_loop(&self, generation: u64) {
        info!(interval_ms = self.poll_interval.as_millis() as u64, generation, "Rate monitoring started");

        self.poll_once().await;

        loop {
            // Register for wake-ups before checking the flag so a concurrent stop is never missed
            let wake = self.wake.notified();
            tokio::pin!(wake);
            wake.as_mut().enable();

            if !self.owns_loop(generation) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = &mut wake => {}
            }

            if !self.owns_loop(generation) {
                break;
            }

            self.poll_once().await;
        }

        info!(generation, "Rate monitoring stopped");
    }

    /// Run `f` against the current snapshot while no cycle can replace or publish it.
    pub async fn with_current<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce(Arc<RateSnapshot>) -> Fut,
        Fut: Future<Output = T>,
    {
        let _serial = self.cycle_lock.lock().await;
        f(self.current()).await
    }

    /// One regular cycle: publish only if the new snapshot differs.
    pub async fn poll_once(&self) -> CycleOutcome {
        self.cycle(false).await
    }

    /// Out-of-band fetch that publishes whatever it gets, changed or not.
    pub async fn force_update(&self) -> CycleOutcome {
        self.cycle(true).await
    }

    async fn cycle(&self, forced: bool) -> CycleOutcome {
        let _serial = self.cycle_lock.lock().await;
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;

        async {
            metrics::POLLS_TOTAL.inc();

            let fresh = match self.feed.fetch().await {
                Ok(snapshot) if !snapshot.is_empty() => Arc::new(snapshot),
                Ok(_) => {
                    metrics::FETCH_FAILURES.inc();
                    warn!(source = self.feed.source(), "Feed returned no rates");
                    return CycleOutcome::FetchFailed;
                }
                Err(e) => {
                    metrics::FETCH_FAILURES.inc();
                    warn!(source = self.feed.source(), "Feed fetch failed: {}", e);
                    return CycleOutcome::FetchFailed;
                }
            };

            let (previous, current) = {
                let mut pair = self.snapshots.write().unwrap_or_else(|e| e.into_inner());
                pair.previous = std::mem::replace(&mut pair.current, Arc::clone(&fresh));
                (Arc::clone(&pair.previous), Arc::clone(&pair.current))
            };

            if !forced && !has_changes(&previous, &current) {
                info!(currencies = current.len(), "No rate changes detected");
                return CycleOutcome::Unchanged;
            }

            info!(currencies = current.len(), date = current.source_date(), "Publishing rate snapshot");
            metrics::NOTIFICATIONS_PUBLISHED.inc();
            CycleOutcome::Published(self.sinks.notify(current).await)
        }
        .instrument(trace_poll_cycle(cycle, forced))
        .await
    }
}
