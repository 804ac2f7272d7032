pub mod config;
pub mod db;
pub mod extract;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::Router;
use painpredict_algo::{FileModelStore, ModelError, ModelSource, Predictor, Recommender};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::DbInitError;
use crate::state::{AppState, RecommendationService};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database initialization failed: {0}")]
    Database(#[from] DbInitError),
    #[error("model initialization failed: {0}")]
    Model(#[from] ModelError),
    #[error("model initialization task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Open storage, load or train the model, and wire the shared state.
pub async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let pool = db::init_pool(&config.database_url).await?;

    let store = FileModelStore::new(config.model_path.clone()).with_seed(config.model_seed);
    let (predictor, source) =
        tokio::task::spawn_blocking(move || Predictor::initialize(&store)).await??;

    match source {
        ModelSource::Loaded => tracing::info!(
            path = %config.model_path.display(),
            version = predictor.model_version(),
            "model loaded"
        ),
        ModelSource::Trained => tracing::info!(
            path = %config.model_path.display(),
            seed = config.model_seed,
            "model trained on synthetic population and saved"
        ),
    }

    let recommendations = RecommendationService::new(Recommender::new(), config.recommender_seed);

    Ok(AppState::new(
        pool,
        Arc::new(predictor),
        Arc::new(recommendations),
    ))
}

pub async fn create_app(config: &Config) -> Result<Router, StartupError> {
    let state = build_state(config).await?;

    Ok(routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
