use std::sync::Arc;
use std::time::{Instant, SystemTime};

use painpredict_algo::{
    jitter_rng, ContraindicationFlags, Forecast, JitterRng, Predictor, RankedAction, Recommender,
};
use parking_lot::Mutex;
use sqlx::SqlitePool;

/// Recommender plus the generator its score jitter is drawn from.
pub struct RecommendationService {
    recommender: Recommender,
    rng: Mutex<JitterRng>,
}

impl RecommendationService {
    pub fn new(recommender: Recommender, seed: Option<u64>) -> Self {
        Self {
            recommender,
            rng: Mutex::new(jitter_rng(seed)),
        }
    }

    pub fn rank(&self, prediction: &Forecast, flags: &ContraindicationFlags) -> Vec<RankedAction> {
        let mut rng = self.rng.lock();
        self.recommender
            .recommend_with(prediction.predicted_pain, flags, &mut *rng)
    }
}

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    pool: SqlitePool,
    predictor: Arc<Predictor>,
    recommendations: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        predictor: Arc<Predictor>,
        recommendations: Arc<RecommendationService>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            pool,
            predictor,
            recommendations,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn recommendations(&self) -> &RecommendationService {
        &self.recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn forecast(pain: f64) -> Forecast {
        Forecast {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            predicted_pain: pain,
            severity_probability: 0.5,
            confidence_interval: (0.0, 10.0),
            drivers: vec![],
        }
    }

    #[test]
    fn test_seeded_service_is_reproducible() {
        let a = RecommendationService::new(Recommender::new(), Some(7));
        let b = RecommendationService::new(Recommender::new(), Some(7));
        let flags = ContraindicationFlags::default();

        for pain in [2.0, 5.0, 8.5] {
            let left: Vec<f64> = a.rank(&forecast(pain), &flags).iter().map(|r| r.personal_score).collect();
            let right: Vec<f64> = b.rank(&forecast(pain), &flags).iter().map(|r| r.personal_score).collect();
            assert_eq!(left, right);
        }
    }
}
