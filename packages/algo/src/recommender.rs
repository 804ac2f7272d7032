//! Relief Recommender
//!
//! Ranks a fixed catalog of self-care actions against one forecast.
//!
//! Pipeline:
//! - drop actions with any contraindication flagged in the request
//! - scale effectiveness by forecast severity and action category
//! - perturb with bounded multiplicative jitter for exploration
//! - attach an explanation and keep the top three

use std::ops::RangeInclusive;

use rand::Rng;

use crate::types::{
    round_to, Action, ActionKind, Contraindication, ContraindicationFlags, EvidenceLevel, Forecast,
    RankedAction, RankingConfidence, MILD_PAIN_THRESHOLD, SEVERE_PAIN_THRESHOLD,
};

/// Number of actions returned per request
pub const TOP_K: usize = 3;

const SEVERE_BOOST: f64 = 1.3;
const SEVERE_STRETCH_PENALTY: f64 = 0.7;
const MILD_BOOST: f64 = 1.2;
const DEFAULT_JITTER: (f64, f64) = (0.9, 1.1);

const SEVERE_SUFFIX: &str = "Particularly helpful for severe pain.";
const MILD_SUFFIX: &str = "Good for maintaining comfort.";
const FALLBACK_EXPLANATION: &str = "This may help manage your symptoms.";

pub static CATALOG: [Action; 6] = [
    Action {
        name: "hydration",
        kind: ActionKind::Hydration,
        description: "Drink 500ml of water",
        evidence_level: EvidenceLevel::High,
        effectiveness: 0.3,
        contraindications: &[],
    },
    Action {
        name: "heat_pad",
        kind: ActionKind::HeatPad,
        description: "Apply heat pad for 15-20 minutes",
        evidence_level: EvidenceLevel::High,
        effectiveness: 0.4,
        contraindications: &[Contraindication::SkinSensitivity],
    },
    Action {
        name: "gentle_stretching",
        kind: ActionKind::Exercise,
        description: "Gentle pelvic stretches",
        evidence_level: EvidenceLevel::Medium,
        effectiveness: 0.35,
        contraindications: &[Contraindication::AcutePain],
    },
    Action {
        name: "magnesium_foods",
        kind: ActionKind::Dietary,
        description: "Foods rich in magnesium (nuts, leafy greens)",
        evidence_level: EvidenceLevel::Medium,
        effectiveness: 0.25,
        contraindications: &[],
    },
    Action {
        name: "breathing_exercise",
        kind: ActionKind::MindBody,
        description: "Deep breathing for 5 minutes",
        evidence_level: EvidenceLevel::Medium,
        effectiveness: 0.3,
        contraindications: &[],
    },
    Action {
        name: "rest",
        kind: ActionKind::Rest,
        description: "Take a 20-minute rest break",
        evidence_level: EvidenceLevel::High,
        effectiveness: 0.35,
        contraindications: &[],
    },
];

/// Stateless ranker over the static catalog
#[derive(Clone, Debug)]
pub struct Recommender {
    catalog: &'static [Action],
    jitter: RangeInclusive<f64>,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    pub fn new() -> Self {
        Self {
            catalog: &CATALOG,
            jitter: DEFAULT_JITTER.0..=DEFAULT_JITTER.1,
        }
    }

    /// Override the jitter bounds; `1.0..=1.0` disables exploration noise.
    pub fn with_jitter(mut self, low: f64, high: f64) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.jitter = low..=high;
        self
    }

    pub fn catalog(&self) -> &'static [Action] {
        self.catalog
    }

    /// Top-ranked actions for `prediction`, drawing jitter from the thread RNG.
    ///
    /// `user_id` is accepted for per-user personalization; the ranking does
    /// not yet depend on it.
    pub fn get_recommendations(
        &self,
        _user_id: &str,
        prediction: &Forecast,
        context: &ContraindicationFlags,
    ) -> Vec<RankedAction> {
        self.recommend_with(prediction.predicted_pain, context, &mut rand::thread_rng())
    }

    /// Rank with an explicit random source
    pub fn recommend_with<R: Rng>(
        &self,
        predicted_pain: f64,
        context: &ContraindicationFlags,
        rng: &mut R,
    ) -> Vec<RankedAction> {
        let mut ranked: Vec<RankedAction> = self
            .safe_actions(context)
            .map(|action| {
                let score = base_score(action, predicted_pain) * self.draw_jitter(rng);
                RankedAction {
                    action: action.clone(),
                    personal_score: round_to(score, 3),
                    explanation: explanation(action, predicted_pain),
                    confidence: RankingConfidence::Medium,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.personal_score.total_cmp(&a.personal_score));
        ranked.truncate(TOP_K);
        ranked
    }

    /// Catalog entries with no flagged contraindication
    pub fn safe_actions<'a>(
        &'a self,
        context: &'a ContraindicationFlags,
    ) -> impl Iterator<Item = &'static Action> + 'a {
        self.catalog
            .iter()
            .filter(move |action| !action.contraindications.iter().any(|&c| context.is_set(c)))
    }

    fn draw_jitter<R: Rng>(&self, rng: &mut R) -> f64 {
        let (low, high) = (*self.jitter.start(), *self.jitter.end());
        if low == high {
            low
        } else {
            rng.gen_range(low..=high)
        }
    }
}

/// Effectiveness adjusted for forecast severity, before jitter
pub fn base_score(action: &Action, predicted_pain: f64) -> f64 {
    let mut score = action.effectiveness;

    if predicted_pain >= SEVERE_PAIN_THRESHOLD {
        match action.kind {
            ActionKind::HeatPad | ActionKind::Rest => score *= SEVERE_BOOST,
            ActionKind::Exercise => score *= SEVERE_STRETCH_PENALTY,
            _ => {}
        }
    } else if predicted_pain <= MILD_PAIN_THRESHOLD {
        if matches!(action.kind, ActionKind::Exercise | ActionKind::Hydration) {
            score *= MILD_BOOST;
        }
    }

    score
}

pub fn explanation(action: &Action, predicted_pain: f64) -> String {
    let base = match action.name {
        "hydration" => "Hydration helps reduce bloating and muscle cramps.",
        "heat_pad" => "Heat relaxes uterine muscles and increases blood flow.",
        "gentle_stretching" => "Stretching can relieve muscle tension and improve circulation.",
        "magnesium_foods" => "Magnesium helps relax muscles and may reduce cramping.",
        "breathing_exercise" => "Deep breathing reduces stress and can help manage pain perception.",
        "rest" => "Rest allows your body to recover and can reduce inflammation.",
        _ => FALLBACK_EXPLANATION,
    };

    if predicted_pain >= SEVERE_PAIN_THRESHOLD {
        format!("{base} {SEVERE_SUFFIX}")
    } else if predicted_pain <= MILD_PAIN_THRESHOLD {
        format!("{base} {MILD_SUFFIX}")
    } else {
        base.to_string()
    }
}
