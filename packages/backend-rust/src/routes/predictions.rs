use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use painpredict_algo::Forecast;
use serde::{Deserialize, Serialize};

use crate::extract::ApiQuery;
use crate::response::{ok, AppError, SuccessResponse};
use crate::routes::health::now_iso;
use crate::routes::require_user_id;
use crate::services::privacy::anonymize_user_id;
use crate::services::user_context::load_user_context_on;
use crate::services::validation::check_range;
use crate::state::AppState;

pub const DEFAULT_FORECAST_DAYS: i64 = 7;
pub const MAX_FORECAST_DAYS: i64 = 14;

pub fn router() -> Router<AppState> {
    Router::new().route("/predictions", get(get_predictions))
}

#[derive(Debug, Deserialize)]
struct PredictionQuery {
    user_id: Option<String>,
    days: Option<i64>,
}

#[derive(Debug, Serialize)]
struct PredictionsResponse {
    user_id: String,
    predictions: Vec<Forecast>,
    generated_at: String,
    model_version: String,
}

async fn get_predictions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PredictionQuery>,
) -> Result<Json<SuccessResponse<PredictionsResponse>>, AppError> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    let days = check_range(
        "Days",
        query.days.unwrap_or(DEFAULT_FORECAST_DAYS),
        1,
        MAX_FORECAST_DAYS,
    )?;

    let today = Utc::now().date_naive();
    let context = load_user_context_on(state.pool(), user_id, today).await?;
    let predictor = state.predictor();
    let predictions = predictor.predict_from(&context, days as u32, today);

    tracing::info!(
        user = %anonymize_user_id(user_id),
        days,
        data_points = context.data_points,
        "forecast generated"
    );

    Ok(ok(PredictionsResponse {
        user_id: user_id.to_string(),
        predictions,
        generated_at: now_iso(),
        model_version: predictor.model_version().to_string(),
    }))
}
