mod entries;
mod feedback;
mod health;
mod predictions;
mod recommendations;
mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::response::{json_error, AppError};
use crate::services::validation::check_not_blank;
use crate::state::AppState;

const SERVICE_NAME: &str = "Period Pain Predictor API";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/health", health::router())
        .nest("/api/v1", api_router())
        .fallback(fallback_handler)
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(entries::router())
        .merge(predictions::router())
        .merge(recommendations::router())
        .merge(feedback::router())
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
    status: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Endpoint not found").into_response()
}

/// Trimmed `user_id` query value, rejected when missing or blank.
pub(crate) fn require_user_id(value: Option<&str>) -> Result<&str, AppError> {
    Ok(check_not_blank("user_id", value.unwrap_or_default())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_user_id() {
        assert_eq!(require_user_id(Some(" u-1 ")).unwrap(), "u-1");
        assert_eq!(
            require_user_id(None).unwrap_err().message(),
            "user_id must not be empty"
        );
        assert!(require_user_id(Some("")).is_err());
    }
}
