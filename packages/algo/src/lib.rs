//! # painpredict-algo - period pain forecasting core
//!
//! Pure Rust implementation of the prediction and recommendation pipeline:
//!
//! - **Bagged Regression Trees** - shallow CART ensemble fitted on bootstrap resamples
//! - **Synthetic Population** - seeded training data for the initial model
//! - **Predictor** - cycle-aware multi-day pain forecasts with drivers
//! - **Recommender** - contraindication-aware ranking of self-care actions
//!
//! ## Module layout
//!
//! - [`forest`] - regression tree ensemble
//! - [`synthetic`] - synthetic training set generation
//! - [`model`] - persisted model artifact and the load/save/train store
//! - [`predictor`] - forecast construction
//! - [`recommender`] - action filtering and scoring
//! - [`sanitize`] - input repair before scoring
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use painpredict_algo::{ContraindicationFlags, MemoryModelStore, Predictor, Recommender, UserContext};
//!
//! let (predictor, _source) = Predictor::initialize(&MemoryModelStore::new()).unwrap();
//! let forecasts = predictor.predict_for_user(&UserContext::default(), 3);
//! assert_eq!(forecasts.len(), 3);
//!
//! let ranked = Recommender::new().get_recommendations(
//!     "user-1",
//!     &forecasts[0],
//!     &ContraindicationFlags::default(),
//! );
//! assert!(ranked.len() <= 3);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod forest;
pub mod model;
pub mod predictor;
pub mod recommender;
pub mod sanitize;
pub mod synthetic;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use forest::{FitError, ForestConfig, RandomForestRegressor, StructureError};

pub use model::{
    load_or_train, FileModelStore, MemoryModelStore, ModelError, ModelSource, ModelStore,
    PainModel, MODEL_VERSION,
};

pub use predictor::Predictor;

pub use recommender::{Recommender, CATALOG, TOP_K};

/// Seedable generator used for recommendation jitter
pub use rand_chacha::ChaCha8Rng as JitterRng;

/// Build a jitter generator, from `seed` when given, else from OS entropy.
pub fn jitter_rng(seed: Option<u64>) -> JitterRng {
    use rand::SeedableRng;

    match seed {
        Some(seed) => JitterRng::seed_from_u64(seed),
        None => JitterRng::from_entropy(),
    }
}
