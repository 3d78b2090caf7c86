//! Clinical thresholds and scoring weights.
//!
//! Every rule threshold lives here as a named constant and as a field of
//! [`AnalysisConfig`], which can be overridden from a TOML file:
//!
//! ```toml
//! page_size = 25
//!
//! [thresholds]
//! vaccine_overdue_high_days = 45
//!
//! [health_score]
//! critical_allergy_penalty = 40
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vaccine overdue by more than this many days is high priority.
pub const VACCINE_OVERDUE_HIGH_THRESHOLD_DAYS: i64 = 30;
/// Vaccine due within this many days raises an upcoming alert.
pub const VACCINE_UPCOMING_DAYS: i64 = 7;
/// Vaccine due within this many days is high priority.
pub const VACCINE_UPCOMING_HIGH_DAYS: i64 = 3;
/// Vaccine due within this many days raises a low-priority reminder.
pub const VACCINE_SCHEDULED_DAYS: i64 = 14;
/// Deworming overdue by more than this many days is high priority.
pub const DEWORMING_OVERDUE_HIGH_THRESHOLD_DAYS: i64 = 60;
/// Deworming due within this many days raises an upcoming alert.
pub const DEWORMING_UPCOMING_DAYS: i64 = 7;
/// Days without deworming (and nothing scheduled) before it is stale.
pub const DEWORMING_STALE_DAYS: i64 = 90;
/// Weight change vs baseline, in percent, that raises an alert.
pub const WEIGHT_CHANGE_ALERT_PERCENT: f64 = 10.0;
/// Weight change vs baseline, in percent, at or above which the alert is high priority.
pub const WEIGHT_CHANGE_HIGH_PERCENT: f64 = 20.0;
/// Lower bound of the normal temperature band (°C).
pub const TEMPERATURE_NORMAL_MIN_C: f64 = 37.5;
/// Upper bound of the normal temperature band (°C).
pub const TEMPERATURE_NORMAL_MAX_C: f64 = 39.5;
/// Below this temperature the alert is high priority (°C).
pub const TEMPERATURE_CRITICAL_MIN_C: f64 = 36.0;
/// Above this temperature the alert is high priority (°C).
pub const TEMPERATURE_CRITICAL_MAX_C: f64 = 40.0;
/// Days after a diagnosed/treated visit before a follow-up is suggested.
pub const FOLLOW_UP_DAYS: i64 = 30;
/// Days after which the follow-up suggestion becomes medium priority.
pub const FOLLOW_UP_MEDIUM_DAYS: i64 = 60;
/// Weight change between the two latest readings, in percent, still "stable".
pub const WEIGHT_TREND_STABLE_PERCENT: f64 = 5.0;
/// Size of the "recent activity" window in days.
pub const RECENT_WINDOW_DAYS: i64 = 30;
/// Default timeline page size.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration for all derivations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub thresholds: ClinicalThresholds,
    #[serde(default)]
    pub health_score: HealthScoreWeights,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: ClinicalThresholds::default(),
            health_score: HealthScoreWeights::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AnalysisConfig {
    /// Parse from TOML; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded analysis config");
        Ok(config)
    }

    /// Reject settings no derivation can work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }

        let t = &self.thresholds;
        if t.temperature_normal_min_c >= t.temperature_normal_max_c {
            return Err(ConfigError::Invalid(
                "temperature_normal_min_c must be below temperature_normal_max_c".into(),
            ));
        }
        if t.weight_change_alert_percent > t.weight_change_high_percent {
            return Err(ConfigError::Invalid(
                "weight_change_alert_percent must not exceed weight_change_high_percent".into(),
            ));
        }
        if t.vaccine_upcoming_days > t.vaccine_scheduled_days {
            return Err(ConfigError::Invalid(
                "vaccine_upcoming_days must not exceed vaccine_scheduled_days".into(),
            ));
        }

        Ok(())
    }
}

/// Rule thresholds used by the notification deriver and the metrics analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClinicalThresholds {
    pub vaccine_overdue_high_days: i64,
    pub vaccine_upcoming_days: i64,
    pub vaccine_upcoming_high_days: i64,
    pub vaccine_scheduled_days: i64,
    pub deworming_overdue_high_days: i64,
    pub deworming_upcoming_days: i64,
    pub deworming_stale_days: i64,
    pub weight_change_alert_percent: f64,
    pub weight_change_high_percent: f64,
    pub temperature_normal_min_c: f64,
    pub temperature_normal_max_c: f64,
    pub temperature_critical_min_c: f64,
    pub temperature_critical_max_c: f64,
    pub follow_up_days: i64,
    pub follow_up_medium_days: i64,
    pub weight_trend_stable_percent: f64,
    pub recent_window_days: i64,
}

impl Default for ClinicalThresholds {
    fn default() -> Self {
        Self {
            vaccine_overdue_high_days: VACCINE_OVERDUE_HIGH_THRESHOLD_DAYS,
            vaccine_upcoming_days: VACCINE_UPCOMING_DAYS,
            vaccine_upcoming_high_days: VACCINE_UPCOMING_HIGH_DAYS,
            vaccine_scheduled_days: VACCINE_SCHEDULED_DAYS,
            deworming_overdue_high_days: DEWORMING_OVERDUE_HIGH_THRESHOLD_DAYS,
            deworming_upcoming_days: DEWORMING_UPCOMING_DAYS,
            deworming_stale_days: DEWORMING_STALE_DAYS,
            weight_change_alert_percent: WEIGHT_CHANGE_ALERT_PERCENT,
            weight_change_high_percent: WEIGHT_CHANGE_HIGH_PERCENT,
            temperature_normal_min_c: TEMPERATURE_NORMAL_MIN_C,
            temperature_normal_max_c: TEMPERATURE_NORMAL_MAX_C,
            temperature_critical_min_c: TEMPERATURE_CRITICAL_MIN_C,
            temperature_critical_max_c: TEMPERATURE_CRITICAL_MAX_C,
            follow_up_days: FOLLOW_UP_DAYS,
            follow_up_medium_days: FOLLOW_UP_MEDIUM_DAYS,
            weight_trend_stable_percent: WEIGHT_TREND_STABLE_PERCENT,
            recent_window_days: RECENT_WINDOW_DAYS,
        }
    }
}

/// Weights of the composite health score.
///
/// Illustrative heuristic carried over from the clinic dashboard; not a
/// validated clinical standard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HealthScoreWeights {
    /// Starting score before adjustments
    pub base: i32,
    /// Any active critical allergy
    pub critical_allergy_penalty: i32,
    /// Any active severe allergy (only when no critical one)
    pub severe_allergy_penalty: i32,
    /// Any overdue vaccine
    pub overdue_vaccine_penalty: i32,
    /// Deworming stale
    pub stale_deworming_penalty: i32,
    /// Too many recent consultations
    pub frequent_visits_penalty: i32,
    /// Recent consultation count above which the visit penalty applies
    pub frequent_visits_threshold: usize,
    /// Vaccines up to date
    pub vaccines_up_to_date_bonus: i32,
    /// Minimum score for the "excellent" band
    pub excellent_min: i32,
    /// Minimum score for the "good" band
    pub good_min: i32,
    /// Minimum score for the "fair" band
    pub fair_min: i32,
}

impl Default for HealthScoreWeights {
    fn default() -> Self {
        Self {
            base: 100,
            critical_allergy_penalty: 30,
            severe_allergy_penalty: 15,
            overdue_vaccine_penalty: 20,
            stale_deworming_penalty: 10,
            frequent_visits_penalty: 15,
            frequent_visits_threshold: 5,
            vaccines_up_to_date_bonus: 10,
            excellent_min: 80,
            good_min: 60,
            fair_min: 40,
        }
    }
}
