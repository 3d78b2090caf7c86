//! Composite health score.
//!
//! An illustrative dashboard heuristic, not a clinical standard. Every weight
//! comes from [`HealthScoreWeights`].

use serde::{Deserialize, Serialize};

use crate::config::HealthScoreWeights;

/// Score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl HealthBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthBand::Excellent => "excellent",
            HealthBand::Good => "good",
            HealthBand::Fair => "fair",
            HealthBand::NeedsAttention => "needs_attention",
        }
    }

    /// Label shown to clinic staff.
    pub fn label(&self) -> &'static str {
        match self {
            HealthBand::Excellent => "excelente",
            HealthBand::Good => "bueno",
            HealthBand::Fair => "regular",
            HealthBand::NeedsAttention => "requiere atención",
        }
    }
}

/// One adjustment applied to the base score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub reason: String,
    /// Signed adjustment
    pub points: i32,
}

/// Final score with its band and the adjustments that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Clamped to 0..=100
    pub score: u8,
    pub band: HealthBand,
    pub factors: Vec<ScoreFactor>,
}

/// Facts the score is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthInputs {
    pub has_critical_allergy: bool,
    pub has_severe_allergy: bool,
    pub overdue_vaccines: usize,
    pub deworming_stale: bool,
    pub recent_consultations: usize,
    pub vaccines_up_to_date: bool,
}

/// Compute the score.
pub fn health_score(inputs: &HealthInputs, weights: &HealthScoreWeights) -> HealthScore {
    let mut factors = Vec::new();
    let mut adjust = |reason: &str, points: i32| {
        factors.push(ScoreFactor {
            reason: reason.to_string(),
            points,
        });
    };

    if inputs.has_critical_allergy {
        adjust("critical_allergy", -weights.critical_allergy_penalty);
    } else if inputs.has_severe_allergy {
        adjust("severe_allergy", -weights.severe_allergy_penalty);
    }
    if inputs.overdue_vaccines > 0 {
        adjust("overdue_vaccine", -weights.overdue_vaccine_penalty);
    }
    if inputs.deworming_stale {
        adjust("stale_deworming", -weights.stale_deworming_penalty);
    }
    if inputs.recent_consultations > weights.frequent_visits_threshold {
        adjust("frequent_visits", -weights.frequent_visits_penalty);
    }
    if inputs.vaccines_up_to_date {
        adjust("vaccines_up_to_date", weights.vaccines_up_to_date_bonus);
    }

    let raw = factors
        .iter()
        .fold(i64::from(weights.base), |acc, f| acc + i64::from(f.points));
    let score = raw.clamp(0, 100) as u8;

    HealthScore {
        score,
        band: band_for(score, weights),
        factors,
    }
}

fn band_for(score: u8, weights: &HealthScoreWeights) -> HealthBand {
    let score = i32::from(score);
    if score >= weights.excellent_min {
        HealthBand::Excellent
    } else if score >= weights.good_min {
        HealthBand::Good
    } else if score >= weights.fair_min {
        HealthBand::Fair
    } else {
        HealthBand::NeedsAttention
    }
}
