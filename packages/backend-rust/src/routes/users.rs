use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::operations::{create_user, find_user, User};
use crate::response::{ok, AppError, SuccessResponse};
use crate::services::privacy::{anonymize_user_id, should_retain_data};
use crate::services::validation::check_not_blank;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create))
        .route("/users/:user_id", get(fetch))
}

#[derive(Debug, Default, Deserialize)]
struct CreateUserRequest {
    #[serde(default)]
    timezone: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    user_id: String,
    created_at: DateTime<Utc>,
    timezone: String,
    consent_flags: serde_json::Value,
    experiment_group: String,
    data_retention_allowed: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            data_retention_allowed: should_retain_data(&user.consent_flags),
            user_id: user.user_id,
            created_at: user.created_at,
            timezone: user.timezone,
            consent_flags: user.consent_flags,
            experiment_group: user.experiment_group,
        }
    }
}

async fn create(
    State(state): State<AppState>,
    body: Option<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<SuccessResponse<UserResponse>>), AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let timezone = match request.timezone.as_deref() {
        Some(tz) => Some(check_not_blank("timezone", tz)?),
        None => None,
    };

    let user = create_user(state.pool(), timezone).await?;
    tracing::info!(user = %anonymize_user_id(&user.user_id), "user created");

    Ok((StatusCode::CREATED, ok(UserResponse::from(user))))
}

async fn fetch(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse<UserResponse>>, AppError> {
    let user = find_user(state.pool(), &user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(ok(UserResponse::from(user)))
}
