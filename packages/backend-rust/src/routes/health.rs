use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::db;
use crate::state::AppState;

const DB_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    started_at: String,
}

#[derive(Serialize)]
struct ReadinessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    model_version: String,
    checks: ReadinessChecks,
}

#[derive(Serialize)]
struct ReadinessChecks {
    database: &'static str,
    database_latency_ms: Option<u64>,
    model: bool,
}

async fn root() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: now_iso(),
    })
}

async fn live(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        started_at: system_time_iso(state.started_at_system()),
    })
}

async fn ready(State(state): State<AppState>) -> Response {
    let (database, latency_ms) = match database_check(&state).await {
        DbCheckStatus::Connected { latency_ms } => ("connected", Some(latency_ms)),
        DbCheckStatus::Timeout => ("timeout", None),
        DbCheckStatus::Disconnected => ("disconnected", None),
    };

    let status = match database {
        "connected" => "healthy",
        "timeout" => "degraded",
        _ => "unhealthy",
    };

    let response = ReadinessResponse {
        status,
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        model_version: state.predictor().model_version().to_string(),
        checks: ReadinessChecks {
            database,
            database_latency_ms: latency_ms,
            model: true,
        },
    };

    let status_code = if status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response)).into_response()
}

#[derive(Debug)]
enum DbCheckStatus {
    Connected { latency_ms: u64 },
    Timeout,
    Disconnected,
}

async fn database_check(state: &AppState) -> DbCheckStatus {
    let started = Instant::now();
    match tokio::time::timeout(DB_CHECK_TIMEOUT, db::ping(state.pool())).await {
        Ok(Ok(())) => DbCheckStatus::Connected {
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "readiness database ping failed");
            DbCheckStatus::Disconnected
        }
        Err(_) => DbCheckStatus::Timeout,
    }
}

fn system_time_iso(time: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
