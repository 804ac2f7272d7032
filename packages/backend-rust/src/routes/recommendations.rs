use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use painpredict_algo::{ContraindicationFlags, Forecast, RankedAction};
use serde::{Deserialize, Serialize};

use crate::extract::ApiQuery;
use crate::response::{ok, AppError, SuccessResponse};
use crate::routes::health::now_iso;
use crate::routes::predictions::MAX_FORECAST_DAYS;
use crate::routes::require_user_id;
use crate::services::privacy::anonymize_user_id;
use crate::services::user_context::load_user_context_on;
use crate::services::validation::ValidationError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/recommendations", get(get_recommendations))
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    user_id: Option<String>,
    prediction_date: Option<String>,
    #[serde(default)]
    skin_sensitivity: bool,
    #[serde(default)]
    acute_pain: bool,
}

#[derive(Debug, Serialize)]
struct RecommendationsResponse {
    user_id: String,
    prediction_context: Forecast,
    recommendations: Vec<RankedAction>,
    generated_at: String,
}

async fn get_recommendations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecommendationQuery>,
) -> Result<Json<SuccessResponse<RecommendationsResponse>>, AppError> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    let today = Utc::now().date_naive();
    let target = match query.prediction_date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_prediction_date(raw)?,
        _ => today,
    };

    let offset = (target - today).num_days();
    if !(0..MAX_FORECAST_DAYS).contains(&offset) {
        return Err(AppError::not_found("No predictions available"));
    }

    let context = load_user_context_on(state.pool(), user_id, today).await?;
    let prediction = state
        .predictor()
        .predict_from(&context, (offset + 1) as u32, today)
        .pop()
        .ok_or_else(|| AppError::not_found("No predictions available"))?;

    let flags = ContraindicationFlags {
        skin_sensitivity: query.skin_sensitivity,
        acute_pain: query.acute_pain,
    };
    let recommendations = state.recommendations().rank(&prediction, &flags);

    tracing::info!(
        user = %anonymize_user_id(user_id),
        date = %prediction.date,
        predicted_pain = prediction.predicted_pain,
        count = recommendations.len(),
        "recommendations ranked"
    );

    Ok(ok(RecommendationsResponse {
        user_id: user_id.to_string(),
        prediction_context: prediction,
        recommendations,
        generated_at: now_iso(),
    }))
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its UTC date is used).
fn parse_prediction_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| ValidationError::InvalidDate {
            label: "prediction_date",
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prediction_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(parse_prediction_date("2024-05-17").unwrap(), expected);
        assert_eq!(parse_prediction_date(" 2024-05-17T23:30:00Z ").unwrap(), expected);
        assert_eq!(
            parse_prediction_date("2024-05-17T23:30:00-02:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 18).unwrap()
        );
        assert!(parse_prediction_date("17/05/2024").is_err());
    }
}
