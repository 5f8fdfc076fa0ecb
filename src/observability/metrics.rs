use std::sync::Once;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Monitor metrics
    pub static ref POLLS_TOTAL: IntCounter = IntCounter::new(
        "rate_polls_total",
        "Total number of feed polls"
    ).expect("metric definition");

    pub static ref FETCH_FAILURES: IntCounter = IntCounter::new(
        "rate_fetch_failures_total",
        "Polls that produced no usable snapshot"
    ).expect("metric definition");

    pub static ref NOTIFICATIONS_PUBLISHED: IntCounter = IntCounter::new(
        "rate_notifications_published_total",
        "Snapshots fanned out to sinks"
    ).expect("metric definition");

    // Delivery metrics
    pub static ref SINK_DELIVERY_FAILURES: IntCounter = IntCounter::new(
        "sink_delivery_failures_total",
        "Sink updates that returned an error or panicked"
    ).expect("metric definition");

    pub static ref CONNECTION_DELIVERY_FAILURES: IntCounter = IntCounter::new(
        "connection_delivery_failures_total",
        "Push messages that could not be written to a connection"
    ).expect("metric definition");

    pub static ref OPEN_CONNECTIONS: IntGauge = IntGauge::new(
        "push_connections_open",
        "Currently registered push connections"
    ).expect("metric definition");
}

static REGISTER: Once = Once::new();

pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(POLLS_TOTAL.clone()),
            Box::new(FETCH_FAILURES.clone()),
            Box::new(NOTIFICATIONS_PUBLISHED.clone()),
            Box::new(SINK_DELIVERY_FAILURES.clone()),
            Box::new(CONNECTION_DELIVERY_FAILURES.clone()),
            Box::new(OPEN_CONNECTIONS.clone()),
        ];
        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                ::tracing::warn!("Metric registration failed: {}", e);
            }
        }
    });
}

/// Prometheus text exposition of every registered metric.
pub fn gather_metrics() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        ::tracing::warn!("Metric encoding failed: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
