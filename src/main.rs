use std::sync::Arc;
use anyhow::Context;
use rate_watch::api::{create_router, AppState};
use rate_watch::broadcast::BroadcastSink;
use rate_watch::config::AppConfig;
use rate_watch::feed::{CbrFeedClient, RateFeed};
use rate_watch::monitor::RateMonitor;
use rate_watch::notify::{EmailSink, LogSink, SinkRegistry, SummarySink};
use rate_watch::observability::{metrics, tracing::init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("RATEWATCH_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_logging(&config.logging);
    metrics::register_metrics();

    let feed = Arc::new(
        CbrFeedClient::new(&config.feed.url, config.feed.timeout())
            .context("building feed client")?,
    );
    let broadcast = Arc::new(BroadcastSink::new(feed.source()));

    let monitor = Arc::new(RateMonitor::new(
        feed,
        Arc::new(SinkRegistry::new()),
        config.monitor.poll_interval(),
    ));

    for recipient in &config.sinks.email_recipients {
        monitor.attach(Arc::new(EmailSink::with_preview_limit(
            recipient.as_str(),
            config.sinks.email_preview_limit,
        )));
    }
    monitor.attach(Arc::new(LogSink::new(&config.sinks.log_path)));
    monitor.attach(Arc::new(SummarySink::new(config.sinks.tracked_currencies.clone())));
    monitor.attach(broadcast.clone());

    let monitor_task = monitor.start();

    let state = Arc::new(AppState {
        monitor: Arc::clone(&monitor),
        broadcast,
        email_preview_limit: config.sinks.email_preview_limit,
    });

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr.as_str())
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, env = %env, "Rate watch service listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("serving HTTP")?;

    monitor.stop();
    if let Some(task) = monitor_task {
        let _ = task.await;
    }
    tracing::info!("Rate watch service stopped");
    Ok(())
}
