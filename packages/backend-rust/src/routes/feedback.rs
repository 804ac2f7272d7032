use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::extract::ApiJson;
use crate::response::{ok, AppError, SuccessResponse};
use crate::services::feedback::{validate_feedback, Feedback};
use crate::services::privacy::anonymize_user_id;
use crate::services::validation::check_not_blank;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/feedback", post(submit_feedback))
}

#[derive(Debug, Serialize)]
struct FeedbackAck {
    status: &'static str,
    message: &'static str,
    #[serde(flatten)]
    feedback: Feedback,
}

async fn submit_feedback(
    ApiJson(mut feedback): ApiJson<Feedback>,
) -> Result<Json<SuccessResponse<FeedbackAck>>, AppError> {
    feedback.user_id = check_not_blank("user_id", &feedback.user_id)?.to_string();
    feedback.recommendation_type =
        check_not_blank("recommendation_type", &feedback.recommendation_type)?.to_string();
    validate_feedback(feedback.helpfulness_score, feedback.pain_reduction)?;

    tracing::info!(
        user = %anonymize_user_id(&feedback.user_id),
        recommendation_type = %feedback.recommendation_type,
        helpfulness = feedback.helpfulness_score,
        pain_reduction = ?feedback.pain_reduction,
        "feedback received"
    );

    Ok(ok(FeedbackAck {
        status: "success",
        message: "Feedback recorded successfully",
        feedback,
    }))
}
