//! Synthetic Population Data
//!
//! Generates the seeded training set used to fit the initial population
//! model when no persisted artifact exists.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::types::{clamp_pain, EPSILON, FEATURE_DIMENSION};

/// Rows generated for the initial model
pub const DEFAULT_SAMPLE_COUNT: usize = 1000;

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;

const BASE_PAIN: f64 = 2.0;
const NOISE_STD_DEV: f64 = 0.5;

/// Feature rows and matching pain targets
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSet {
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Draw `n_samples` rows of (cycle_day, days_to_period, historical_pain,
/// sleep, stress, exercise) with their synthetic pain score.
pub fn generate_training_set(n_samples: usize, seed: u64) -> TrainingSet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let cycle_day = rng.gen_range(1..=28i64) as f64;
        let days_to_period = rng.gen_range(1..=14i64) as f64;
        let historical_pain = rng.gen_range(0.0..10.0);
        let sleep = rng.gen_range(4.0..10.0);
        let stress = rng.gen_range(0.0..10.0);
        let exercise = rng.gen_range(0.0..120.0);

        let row = vec![cycle_day, days_to_period, historical_pain, sleep, stress, exercise];
        debug_assert_eq!(row.len(), FEATURE_DIMENSION);

        let target = synthetic_pain(&mut rng, cycle_day, sleep, stress, exercise);
        rows.push(row);
        targets.push(target);
    }

    TrainingSet { rows, targets }
}

fn synthetic_pain<R: Rng>(rng: &mut R, cycle_day: f64, sleep: f64, stress: f64, exercise: f64) -> f64 {
    let mut pain = BASE_PAIN;

    if (1.0..=7.0).contains(&cycle_day) {
        pain += rng.gen_range(3.0..=6.0);
    } else if (25.0..=28.0).contains(&cycle_day) {
        pain += rng.gen_range(1.0..=3.0);
    }

    pain += (7.0 - sleep).max(0.0) * 0.5;
    pain += stress * 0.3;
    pain += (30.0 - exercise).max(0.0) * 0.02;

    clamp_pain(pain + sample_normal(rng) * NOISE_STD_DEV)
}

/// Standard normal sample via the Box-Muller transform
pub fn sample_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(EPSILON);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
