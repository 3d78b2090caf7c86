//! Vet-History Core Library
//!
//! Pure derivations over a veterinary patient's clinical history.
//!
//! # Architecture
//!
//! ```text
//!              backend JSON (patient + historial)
//!                              │
//!                        [ingest: validate]
//!                              │
//!                   Patient + HistorialSnapshot
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          │                   │                   │
//!          ▼                   ▼                   ▼
//!      Timeline          Notifications          Metrics
//!  (merge/sort/filter/   (threshold rules,   (counts, trends,
//!      paginate)           prioritized)       health score)
//!          │                   │                   │
//!          └───────────────────┼───────────────────┘
//!                              ▼
//!                   CSV / JSON report export
//! ```
//!
//! # Core Principle
//!
//! **Same snapshot and reference date, same output.** No derivation reads the
//! clock, mutates its input or keeps state between calls; "today" is always a
//! parameter.
//!
//! # Modules
//!
//! - [`models`]: Record types (Patient, Consultation, Vaccination, etc.)
//! - [`dates`]: Validated date parsing and day arithmetic
//! - [`timeline`]: Unified timeline with filtering and pagination
//! - [`notifications`]: Rule-based clinical alerts
//! - [`metrics`]: Dashboard metrics, health score and period comparison
//! - [`ingest`]: JSON ingestion boundary
//! - [`export`]: CSV and JSON exports
//! - [`config`]: Thresholds and score weights

pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod timeline;

// Re-export commonly used types
pub use config::{AnalysisConfig, ClinicalThresholds, HealthScoreWeights};
pub use error::{AnalysisError, AnalysisResult, MalformedRecord};
pub use metrics::{analyze, compare_periods, Comparison, HealthBand, Metrics, Period};
pub use models::{
    Allergy, Category, Consultation, Deworming, HistorialSnapshot, Patient, Severity, Surgery,
    Vaccination,
};
pub use notifications::{derive_notifications, Notification, NotificationKind, Priority};
pub use timeline::{build_timeline, filter_timeline, paginate, TimelineFilter, TimelineItem};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;
use crate::export::{PatientReport, TimelineExport};
use crate::metrics::{analyze_with, Change};
use crate::notifications::derive_notifications_with;
use crate::timeline::{build_timeline_with_report, CategoryFilter, SortOrder};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetHistoryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<AnalysisError> for VetHistoryError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::InvalidInput(msg) => VetHistoryError::InvalidInput(msg),
            AnalysisError::Json(e) => VetHistoryError::SerializationError(e.to_string()),
            AnalysisError::Config(e) => VetHistoryError::ConfigError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for VetHistoryError {
    fn from(e: serde_json::Error) -> Self {
        VetHistoryError::SerializationError(e.to_string())
    }
}

impl From<ConfigError> for VetHistoryError {
    fn from(e: ConfigError) -> Self {
        VetHistoryError::ConfigError(e.to_string())
    }
}

// =========================================================================
// Free Functions (exported to FFI)
// =========================================================================

/// Install the global `tracing` subscriber.
///
/// `filter` uses `RUST_LOG` syntax; when absent, `RUST_LOG` is read and
/// falls back to `vet_history_core=info`. Calling it again is a no-op.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("vet_history_core=info")),
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Content hash of a patient plus history, for caching derived views.
#[uniffi::export]
pub fn snapshot_fingerprint(
    patient_json: String,
    historial_json: String,
) -> Result<String, VetHistoryError> {
    let patient = ingest::parse_patient(&patient_json)?;
    let historial = ingest::parse_historial(&historial_json)?;
    Ok(historial.fingerprint(&patient)?)
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Create an analyzer with the default thresholds.
#[uniffi::export]
pub fn new_analyzer() -> Arc<VetHistoryAnalyzer> {
    Arc::new(VetHistoryAnalyzer {
        config: AnalysisConfig::default(),
    })
}

/// Create an analyzer from a TOML configuration document.
#[uniffi::export]
pub fn analyzer_from_toml(toml: String) -> Result<Arc<VetHistoryAnalyzer>, VetHistoryError> {
    let config = AnalysisConfig::from_toml_str(&toml)?;
    Ok(Arc::new(VetHistoryAnalyzer { config }))
}

/// Create an analyzer from a TOML configuration file.
#[uniffi::export]
pub fn load_analyzer(path: String) -> Result<Arc<VetHistoryAnalyzer>, VetHistoryError> {
    let config = AnalysisConfig::load(&path)?;
    Ok(Arc::new(VetHistoryAnalyzer { config }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Stateless analyzer bound to one configuration.
#[derive(uniffi::Object)]
pub struct VetHistoryAnalyzer {
    config: AnalysisConfig,
}

#[uniffi::export]
impl VetHistoryAnalyzer {
    // =========================================================================
    // Timeline
    // =========================================================================

    /// Build, filter and page a patient's timeline.
    pub fn build_patient_timeline(
        &self,
        historial_json: String,
        filter: Option<FfiTimelineFilter>,
        page: u32,
    ) -> Result<FfiTimelinePage, VetHistoryError> {
        let historial = ingest::parse_historial(&historial_json)?;
        let build = build_timeline_with_report(&historial);

        let criteria = match filter {
            Some(f) => TimelineFilter::try_from(f)?,
            None => TimelineFilter::default(),
        };
        let filtered = filter_timeline(&build.items, &criteria);
        let page = paginate(&filtered, page as usize, self.config.page_size)?;

        Ok(FfiTimelinePage {
            items: page.items.iter().map(FfiTimelineItem::from).collect(),
            page: page.page as u32,
            total_pages: page.total_pages as u32,
            total_items: page.total_items as u32,
            skipped_records: build.skipped.len() as u32,
        })
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Derive the patient's alerts as of `today` (YYYY-MM-DD).
    pub fn derive_patient_notifications(
        &self,
        patient_json: String,
        historial_json: String,
        today: String,
    ) -> Result<Vec<FfiNotification>, VetHistoryError> {
        let patient = ingest::parse_patient(&patient_json)?;
        let historial = ingest::parse_historial(&historial_json)?;
        let today = parse_today(&today)?;

        let notifications =
            derive_notifications_with(&patient, &historial, today, &self.config.thresholds);
        Ok(notifications.into_iter().map(|n| n.into()).collect())
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    /// Dashboard metrics as of `today` (YYYY-MM-DD).
    pub fn analyze_patient(
        &self,
        patient_json: String,
        historial_json: String,
        today: String,
    ) -> Result<FfiMetricsSummary, VetHistoryError> {
        let patient = ingest::parse_patient(&patient_json)?;
        let historial = ingest::parse_historial(&historial_json)?;
        let today = parse_today(&today)?;

        let metrics = analyze_with(&patient, &historial, today, &self.config);
        FfiMetricsSummary::try_from(&metrics)
    }

    /// Compare two date ranges of a patient's history.
    pub fn compare_patient_periods(
        &self,
        historial_json: String,
        period_a: FfiPeriod,
        period_b: FfiPeriod,
    ) -> Result<FfiComparison, VetHistoryError> {
        let historial = ingest::parse_historial(&historial_json)?;
        let a = Period::try_from(period_a)?;
        let b = Period::try_from(period_b)?;

        let comparison = compare_periods(&historial, &a, &b)?;
        Ok(comparison.into())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Full timeline as CSV.
    pub fn export_timeline_csv(
        &self,
        patient_json: String,
        historial_json: String,
        today: String,
    ) -> Result<String, VetHistoryError> {
        let patient = ingest::parse_patient(&patient_json)?;
        let historial = ingest::parse_historial(&historial_json)?;
        let today = parse_today(&today)?;

        let export = TimelineExport::new(&patient, &build_timeline(&historial), today)
            .with_fingerprint(historial.fingerprint(&patient)?);
        Ok(export.to_csv())
    }

    /// Timeline, notifications and metrics as one JSON report.
    pub fn export_patient_report_json(
        &self,
        patient_json: String,
        historial_json: String,
        today: String,
    ) -> Result<String, VetHistoryError> {
        let patient = ingest::parse_patient(&patient_json)?;
        let historial = ingest::parse_historial(&historial_json)?;
        let today = parse_today(&today)?;

        let report = PatientReport::build(&patient, &historial, today, &self.config)?;
        Ok(report.to_json()?)
    }
}

fn parse_today(raw: &str) -> Result<NaiveDate, VetHistoryError> {
    dates::parse_date(raw)
        .ok_or_else(|| VetHistoryError::InvalidInput(format!("not a date: {:?}", raw)))
}

fn parse_bound(raw: Option<String>) -> Result<Option<NaiveDate>, VetHistoryError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_today(&s))
        .transpose()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe timeline filter.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimelineFilter {
    pub query: String,
    /// Category name (English or Spanish); `None` or "all" for every category
    pub category: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub ascending: bool,
}

impl TryFrom<FfiTimelineFilter> for TimelineFilter {
    type Error = VetHistoryError;

    fn try_from(f: FfiTimelineFilter) -> Result<Self, Self::Error> {
        let category = match f.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") | Some("todos") => CategoryFilter::All,
            Some(name) => CategoryFilter::One(
                name.parse::<Category>().map_err(VetHistoryError::InvalidInput)?,
            ),
        };

        Ok(TimelineFilter {
            query: f.query,
            category,
            date_from: parse_bound(f.date_from)?,
            date_to: parse_bound(f.date_to)?,
            order: if f.ascending {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            },
        })
    }
}

/// FFI-safe timeline item.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimelineItem {
    pub category: String,
    /// ISO 8601 local timestamp
    pub timestamp: String,
    pub title: String,
    pub subtitle: String,
    pub record_id: String,
}

impl From<&TimelineItem> for FfiTimelineItem {
    fn from(item: &TimelineItem) -> Self {
        Self {
            category: item.category.as_str().to_string(),
            timestamp: item.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            record_id: item.record.id().to_string(),
        }
    }
}

/// FFI-safe timeline page.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimelinePage {
    pub items: Vec<FfiTimelineItem>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u32,
    /// Records left out for a missing or unparseable date
    pub skipped_records: u32,
}

/// FFI-safe notification.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotification {
    pub id: String,
    pub kind: String,
    pub priority: String,
    pub title: String,
    pub message: String,
    pub triggering_date: String,
    pub color: String,
    pub source_record_id: Option<String>,
}

impl From<Notification> for FfiNotification {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind.as_str().to_string(),
            priority: n.priority.as_str().to_string(),
            title: n.title,
            message: n.message,
            triggering_date: n.triggering_date.to_string(),
            color: n.color.as_str().to_string(),
            source_record_id: n.source_record_id,
        }
    }
}

/// FFI-safe metrics headline figures, plus the full metrics as JSON.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMetricsSummary {
    pub health_score: u8,
    pub health_band: String,
    pub consultations_total: u32,
    pub consultations_last_30_days: u32,
    pub average_visits_per_month: f64,
    pub visit_trend: String,
    pub vaccines_overdue: u32,
    pub vaccines_up_to_date: bool,
    pub days_since_deworming: Option<i64>,
    pub needs_deworming: bool,
    pub active_allergies: u32,
    pub latest_weight_kg: Option<f64>,
    pub weight_trend: String,
    pub latest_temperature_c: Option<f64>,
    pub temperature_trend: String,
    pub metrics_json: String,
}

impl TryFrom<&Metrics> for FfiMetricsSummary {
    type Error = VetHistoryError;

    fn try_from(m: &Metrics) -> Result<Self, Self::Error> {
        Ok(Self {
            health_score: m.health.score,
            health_band: m.health.band.as_str().to_string(),
            consultations_total: m.consultations.count.total as u32,
            consultations_last_30_days: m.consultations.count.last_30_days as u32,
            average_visits_per_month: m.consultations.average_per_month,
            visit_trend: m.consultations.visit_trend.as_str().to_string(),
            vaccines_overdue: m.vaccinations.overdue as u32,
            vaccines_up_to_date: m.vaccinations.up_to_date,
            days_since_deworming: m.dewormings.days_since_last,
            needs_deworming: m.dewormings.needs_deworming,
            active_allergies: m.allergies.active as u32,
            latest_weight_kg: m.weight.latest,
            weight_trend: m.weight_trend.as_str().to_string(),
            latest_temperature_c: m.temperature.latest,
            temperature_trend: m.temperature_trend.as_str().to_string(),
            metrics_json: serde_json::to_string(m)?,
        })
    }
}

/// FFI-safe period (dates as YYYY-MM-DD).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPeriod {
    pub label: String,
    pub start: String,
    pub end: String,
}

impl TryFrom<FfiPeriod> for Period {
    type Error = VetHistoryError;

    fn try_from(p: FfiPeriod) -> Result<Self, Self::Error> {
        let start = parse_today(&p.start)?;
        let end = parse_today(&p.end)?;
        Ok(Period::new(p.label, start, end)?)
    }
}

/// FFI-safe change between two periods.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChange {
    pub delta: f64,
    pub percent_change: f64,
}

impl From<Change> for FfiChange {
    fn from(c: Change) -> Self {
        Self {
            delta: c.delta,
            percent_change: c.percent_change,
        }
    }
}

/// FFI-safe period comparison.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiComparison {
    pub label_a: String,
    pub label_b: String,
    pub consultations_a: u32,
    pub consultations_b: u32,
    pub consultations: FfiChange,
    pub vaccinations: FfiChange,
    pub dewormings: FfiChange,
    pub surgeries: FfiChange,
    pub allergies: FfiChange,
    pub weight_average: FfiChange,
    pub temperature_average: FfiChange,
}

impl From<Comparison> for FfiComparison {
    fn from(c: Comparison) -> Self {
        Self {
            label_a: c.period_a.period.label,
            label_b: c.period_b.period.label,
            consultations_a: c.period_a.consultations as u32,
            consultations_b: c.period_b.consultations as u32,
            consultations: c.consultations.into(),
            vaccinations: c.vaccinations.into(),
            dewormings: c.dewormings.into(),
            surgeries: c.surgeries.into(),
            allergies: c.allergies.into(),
            weight_average: c.weight_average.into(),
            temperature_average: c.temperature_average.into(),
        }
    }
}
