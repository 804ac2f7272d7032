//! Population Model Artifact
//!
//! The persisted regression model and the storage abstraction around it.
//! A store can load an existing artifact, save one, and train a fresh one
//! from the seeded synthetic population.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forest::{FitError, ForestConfig, RandomForestRegressor, StructureError};
use crate::synthetic::{generate_training_set, DEFAULT_SAMPLE_COUNT, DEFAULT_SEED};
use crate::types::FEATURE_DIMENSION;

/// Version tag reported alongside predictions
pub const MODEL_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to access model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model expects {found} features, predictor supplies {expected}")]
    FeatureMismatch { expected: usize, found: usize },
    #[error("failed to serialize model: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error("model artifact is malformed: {0}")]
    Malformed(#[from] StructureError),
}

/// Fitted population model plus the metadata needed to reproduce it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PainModel {
    pub version: String,
    pub seed: u64,
    pub sample_count: usize,
    pub forest: RandomForestRegressor,
}

impl PainModel {
    /// Fit the ensemble on the synthetic population drawn with `seed`
    pub fn train(seed: u64) -> Result<Self, ModelError> {
        let data = generate_training_set(DEFAULT_SAMPLE_COUNT, seed);
        let config = ForestConfig {
            seed,
            ..ForestConfig::default()
        };
        let forest = RandomForestRegressor::fit(&data.rows, &data.targets, config)?;

        Ok(Self {
            version: MODEL_VERSION.to_string(),
            seed,
            sample_count: data.len(),
            forest,
        })
    }

    pub fn predict(&self, features: &[f64; FEATURE_DIMENSION]) -> f64 {
        self.forest.predict(features)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.forest.n_features() != FEATURE_DIMENSION {
            return Err(ModelError::FeatureMismatch {
                expected: FEATURE_DIMENSION,
                found: self.forest.n_features(),
            });
        }
        self.forest.check_structure()?;
        Ok(())
    }
}

/// Where the predictor's model came from at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSource {
    Loaded,
    Trained,
}

/// Load/save/train capability for the population model
pub trait ModelStore: Send + Sync {
    /// `Ok(None)` when no artifact exists yet
    fn load(&self) -> Result<Option<PainModel>, ModelError>;

    fn save(&self, model: &PainModel) -> Result<(), ModelError>;

    fn training_seed(&self) -> u64 {
        DEFAULT_SEED
    }

    fn train(&self) -> Result<PainModel, ModelError> {
        PainModel::train(self.training_seed())
    }
}

/// Reuse the stored artifact, or train one and persist it.
pub fn load_or_train(store: &dyn ModelStore) -> Result<(PainModel, ModelSource), ModelError> {
    if let Some(model) = store.load()? {
        model.validate()?;
        return Ok((model, ModelSource::Loaded));
    }

    let model = store.train()?;
    store.save(&model)?;
    Ok((model, ModelSource::Trained))
}

// ==================== File Store ====================

/// JSON artifact on the local filesystem
#[derive(Clone, Debug)]
pub struct FileModelStore {
    path: PathBuf,
    seed: u64,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ModelError {
        ModelError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Option<PainModel>, ModelError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ModelError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, model: &PainModel) -> Result<(), ModelError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_vec(model).map_err(ModelError::Serialize)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn training_seed(&self) -> u64 {
        self.seed
    }
}

// ==================== Memory Store ====================

/// In-process store, mainly for tests
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    model: Mutex<Option<PainModel>>,
    seed: Option<u64>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: PainModel) -> Self {
        Self {
            model: Mutex::new(Some(model)),
            seed: None,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            model: Mutex::new(None),
            seed: Some(seed),
        }
    }

    pub fn stored(&self) -> Option<PainModel> {
        self.model
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Option<PainModel>, ModelError> {
        Ok(self.stored())
    }

    fn save(&self, model: &PainModel) -> Result<(), ModelError> {
        let mut guard = self
            .model
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(model.clone());
        Ok(())
    }

    fn training_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_train_produces_full_ensemble() {
        let model = PainModel::train(DEFAULT_SEED).unwrap();
        assert_eq!(model.version, MODEL_VERSION);
        assert_eq!(model.sample_count, DEFAULT_SAMPLE_COUNT);
        assert_eq!(model.forest.trees().len(), 50);
        assert!(model.forest.trees().iter().all(|t| t.depth() <= 5));
        assert_eq!(model.forest.n_features(), FEATURE_DIMENSION);
    }

    #[test]
    fn test_load_or_train_persists_then_reuses() {
        let store = MemoryModelStore::new();
        let (first, source) = load_or_train(&store).unwrap();
        assert_eq!(source, ModelSource::Trained);
        assert!(store.stored().is_some());

        let (second, source) = load_or_train(&store).unwrap();
        assert_eq!(source, ModelSource::Loaded);
        assert_eq!(first, second);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("population_model.json");
        let store = FileModelStore::new(&path).with_seed(7);

        assert!(store.load().unwrap().is_none());

        let (trained, source) = load_or_train(&store).unwrap();
        assert_eq!(source, ModelSource::Trained);
        assert_eq!(trained.seed, 7);
        assert!(path.exists());

        let reloaded = store.load().unwrap().expect("artifact saved");
        let features = [3.0, 12.0, 5.0, 5.5, 8.0, 10.0];
        assert_eq!(trained.predict(&features), reloaded.predict(&features));
    }

    #[test]
    fn test_file_store_reports_corrupt_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("population_model.json");
        fs::write(&path, b"not a model").unwrap();

        let store = FileModelStore::new(&path);
        let err = load_or_train(&store).unwrap_err();
        assert!(matches!(err, ModelError::Corrupt { .. }), "got {:?}", err);
    }

    #[test]
    fn test_feature_mismatch_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![2.0, 3.0]];
        let forest = RandomForestRegressor::fit(&rows, &[1.0, 2.0], ForestConfig::default()).unwrap();
        let model = PainModel {
            version: MODEL_VERSION.to_string(),
            seed: 1,
            sample_count: 2,
            forest,
        };
        let store = MemoryModelStore::with_model(model);
        let err = load_or_train(&store).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureMismatch {
                expected: FEATURE_DIMENSION,
                found: 2
            }
        ));
    }

    fn tampered_model(edit: impl FnOnce(&mut serde_json::Value)) -> PainModel {
        let rows: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![i as f64, 0.0, 0.0, 0.0, 0.0, 0.0])
            .collect();
        let targets: Vec<f64> = (0..40).map(|i| if i < 20 { 2.0 } else { 7.0 }).collect();
        let config = ForestConfig {
            n_trees: 1,
            ..ForestConfig::default()
        };
        let forest = RandomForestRegressor::fit(&rows, &targets, config).unwrap();
        let model = PainModel {
            version: MODEL_VERSION.to_string(),
            seed: 1,
            sample_count: rows.len(),
            forest,
        };
        let mut value = serde_json::to_value(&model).unwrap();
        edit(&mut value);
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_out_of_bounds_child_rejected_on_load() {
        let model = tampered_model(|v| {
            v["forest"]["trees"][0]["nodes"][0]["left"] = 999.into();
            v["forest"]["trees"][0]["nodes"][0]["right"] = 999.into();
        });
        let err = load_or_train(&MemoryModelStore::with_model(model)).unwrap_err();
        assert!(
            matches!(err, ModelError::Malformed(StructureError::BadChild { child: 999, .. })),
            "got {:?}",
            err
        );
    }

    #[test]
    fn test_self_referencing_split_rejected_on_load() {
        let model = tampered_model(|v| {
            v["forest"]["trees"][0]["nodes"][0]["left"] = 0.into();
        });
        let err = load_or_train(&MemoryModelStore::with_model(model)).unwrap_err();
        assert!(
            matches!(err, ModelError::Malformed(StructureError::BadChild { child: 0, .. })),
            "got {:?}",
            err
        );
    }

    #[test]
    fn test_empty_artifact_rejected_on_load() {
        let no_nodes = tampered_model(|v| {
            v["forest"]["trees"][0]["nodes"] = serde_json::json!([]);
        });
        let err = load_or_train(&MemoryModelStore::with_model(no_nodes)).unwrap_err();
        assert!(
            matches!(err, ModelError::Malformed(StructureError::EmptyTree { tree: 0 })),
            "got {:?}",
            err
        );

        let no_trees = tampered_model(|v| {
            v["forest"]["trees"] = serde_json::json!([]);
        });
        let err = load_or_train(&MemoryModelStore::with_model(no_trees)).unwrap_err();
        assert!(
            matches!(err, ModelError::Malformed(StructureError::NoTrees)),
            "got {:?}",
            err
        );
    }

    #[test]
    fn test_file_artifact_with_bad_feature_index_rejected() {
        let model = tampered_model(|v| {
            v["forest"]["trees"][0]["nodes"][0]["feature"] = 42.into();
        });
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("population_model.json");
        fs::write(&path, serde_json::to_vec(&model).unwrap()).unwrap();

        let err = load_or_train(&FileModelStore::new(&path)).unwrap_err();
        assert!(
            matches!(err, ModelError::Malformed(StructureError::BadFeature { feature: 42, .. })),
            "got {:?}",
            err
        );
    }
}
