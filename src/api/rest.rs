use axum::{
    Router,
    routing::{get, post, delete},
    extract::{Path, State, Json},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use crate::api::AppState;
use crate::api::websocket::websocket_handler;
use crate::broadcast::message::{CurrencyUpdateData, WireRate};
use crate::feed::cbrf::CBRF_SOURCE;
use crate::monitor::MonitorStatus;
use crate::notify::{EmailSink, NotificationSink, SummarySink};
use crate::observability::metrics::gather_metrics;
use crate::types::SinkId;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .route("/current-rates", get(get_current_rates))
        .route("/rates/:code", get(get_rate))
        .route("/sinks/email", post(attach_email_sink))
        .route("/sinks/summary", post(attach_summary_sink))
        .route("/sinks/:id", delete(detach_sink))
        .route("/metrics", get(get_metrics))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<MonitorStatus> {
    Json(state.monitor.status())
}

async fn get_current_rates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CurrencyUpdateData>, StatusCode> {
    let current = state.monitor.current();
    if current.is_empty() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(CurrencyUpdateData::from_snapshot(&current, CBRF_SOURCE)))
}

#[derive(Serialize)]
struct RateResponse {
    currency: String,
    data: WireRate,
}

async fn get_rate(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RateResponse>, StatusCode> {
    let code = code.to_uppercase();
    let current = state.monitor.current();
    let entry = current.get(&code).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(RateResponse {
        data: WireRate {
            rate: entry.rate_per_unit(),
            name: entry.name().to_string(),
            nominal: entry.nominal(),
            value: entry.raw_value(),
            original_value: entry.raw_value_text().to_string(),
        },
        currency: code,
    }))
}

#[derive(Serialize)]
struct SinkAttached {
    id: SinkId,
    sink: String,
}

#[derive(Deserialize)]
struct EmailSinkRequest {
    email: String,
}

async fn attach_email_sink(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailSinkRequest>,
) -> Result<(StatusCode, Json<SinkAttached>), StatusCode> {
    if !req.email.contains('@') {
        return Err(StatusCode::BAD_REQUEST);
    }

    let sink = Arc::new(EmailSink::with_preview_limit(req.email, state.email_preview_limit));
    let id = sink.id();
    state.monitor.attach(sink);
    Ok((StatusCode::CREATED, Json(SinkAttached { id, sink: "email".to_string() })))
}

#[derive(Deserialize)]
struct SummarySinkRequest {
    #[serde(default)]
    currencies: Vec<String>,
}

async fn attach_summary_sink(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarySinkRequest>,
) -> (StatusCode, Json<SinkAttached>) {
    let sink = Arc::new(SummarySink::new(req.currencies));
    let id = sink.id();
    state.monitor.attach(sink);
    (StatusCode::CREATED, Json(SinkAttached { id, sink: "summary".to_string() }))
}

async fn detach_sink(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let Ok(uuid) = Uuid::parse_str(&id) else {
        return StatusCode::BAD_REQUEST;
    };

    if state.monitor.detach(SinkId(uuid)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn get_metrics() -> String {
    gather_metrics()
}
