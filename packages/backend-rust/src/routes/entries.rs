use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::{
    insert_lifestyle_entry, insert_pain_entry, recent_pain_entries, NewLifestyleEntry,
    NewPainEntry, PainEntry,
};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::{ok, AppError, SuccessResponse};
use crate::routes::require_user_id;
use crate::services::entries::{validate_lifestyle_entry, validate_pain_entry};
use crate::services::privacy::anonymize_user_id;
use crate::services::validation::check_range;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 30;
const MAX_HISTORY_LIMIT: i64 = 365;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pain", post(submit_pain))
        .route("/pain/:user_id", get(pain_history))
        .route("/lifestyle", post(submit_lifestyle))
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct EntryCreated {
    status: &'static str,
    entry_id: String,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct PainHistory {
    user_id: String,
    entries: Vec<PainEntry>,
}

async fn submit_pain(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
    ApiJson(entry): ApiJson<NewPainEntry>,
) -> Result<(StatusCode, Json<SuccessResponse<EntryCreated>>), AppError> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    validate_pain_entry(&entry)?;

    let stored = insert_pain_entry(state.pool(), user_id, &entry).await?;
    tracing::info!(
        user = %anonymize_user_id(user_id),
        pain_score = stored.pain_score,
        "pain entry recorded"
    );

    Ok((
        StatusCode::CREATED,
        ok(EntryCreated {
            status: "success",
            entry_id: stored.id,
            message: "Pain entry recorded successfully",
        }),
    ))
}

async fn submit_lifestyle(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
    ApiJson(entry): ApiJson<NewLifestyleEntry>,
) -> Result<(StatusCode, Json<SuccessResponse<EntryCreated>>), AppError> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    validate_lifestyle_entry(&entry)?;

    let stored = insert_lifestyle_entry(state.pool(), user_id, &entry).await?;
    tracing::info!(user = %anonymize_user_id(user_id), "lifestyle entry recorded");

    Ok((
        StatusCode::CREATED,
        ok(EntryCreated {
            status: "success",
            entry_id: stored.id,
            message: "Lifestyle data recorded successfully",
        }),
    ))
}

async fn pain_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<Json<SuccessResponse<PainHistory>>, AppError> {
    let limit = check_range(
        "Limit",
        query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        1,
        MAX_HISTORY_LIMIT,
    )?;

    let entries = recent_pain_entries(state.pool(), &user_id, limit).await?;
    Ok(ok(PainHistory { user_id, entries }))
}
