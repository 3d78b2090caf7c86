//! Dashboard metrics over one patient's history.
//!
//! [`analyze`] computes per-category counts, vital-sign series and trends, the
//! most frequent diagnoses and the composite health score. [`compare_periods`]
//! puts two date ranges side by side.

mod comparison;
mod health;
mod series;

pub use comparison::*;
pub use health::*;
pub use series::*;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ClinicalThresholds};
use crate::dates;
use crate::models::{ClinicalRecord, HistorialSnapshot, Patient, Severity};
use crate::notifications::stale_deworming;

/// Number of diagnoses reported in [`ConsultationStats::top_diagnoses`].
const TOP_DIAGNOSES: usize = 5;
/// Number of upcoming doses reported in [`VaccinationStats::upcoming`].
const UPCOMING_DOSES: usize = 3;

/// Everything the dashboard shows for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub patient_id: String,
    /// Reference date of every "days since" figure
    pub as_of: NaiveDate,
    pub consultations: ConsultationStats,
    pub vaccinations: VaccinationStats,
    pub dewormings: DewormingStats,
    pub allergies: AllergyStats,
    pub surgeries: CategoryCount,
    pub weight: VitalSeries,
    pub weight_trend: Trend,
    pub temperature: VitalSeries,
    pub temperature_trend: TemperatureTrend,
    pub health: HealthScore,
}

/// Total and recent count of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub total: usize,
    /// Records dated within the recent window (30 days by default)
    pub last_30_days: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultationStats {
    pub count: CategoryCount,
    /// Visits per month since the first visit, one decimal
    pub average_per_month: f64,
    pub top_diagnoses: Vec<DiagnosisCount>,
    /// Last 3 months vs the 3 months before
    pub visit_trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisCount {
    /// Lowercased, trimmed diagnosis text
    pub diagnosis: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationStats {
    pub count: CategoryCount,
    /// Vaccines whose next dose is past due
    pub overdue: usize,
    /// At least one vaccine and none overdue
    pub up_to_date: bool,
    /// Soonest future doses
    pub upcoming: Vec<UpcomingDose>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingDose {
    pub record_id: String,
    pub vaccine_type: String,
    pub due: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DewormingStats {
    pub count: CategoryCount,
    pub last_applied: Option<NaiveDate>,
    pub days_since_last: Option<i64>,
    /// Latest deworming is stale and nothing is scheduled
    pub needs_deworming: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyStats {
    pub total: usize,
    pub active: usize,
    /// Active and severe
    pub severe: usize,
    /// Active and critical
    pub critical: usize,
}

/// Compute dashboard metrics with the default configuration.
pub fn analyze(patient: &Patient, historial: &HistorialSnapshot, today: NaiveDate) -> Metrics {
    analyze_with(patient, historial, today, &AnalysisConfig::default())
}

/// Compute dashboard metrics.
pub fn analyze_with(
    patient: &Patient,
    historial: &HistorialSnapshot,
    today: NaiveDate,
    config: &AnalysisConfig,
) -> Metrics {
    let thresholds = &config.thresholds;

    let consultations = consultation_stats(historial, thresholds, today);
    let vaccinations = vaccination_stats(historial, thresholds, today);
    let dewormings = deworming_stats(historial, thresholds, today);
    let allergies = allergy_stats(historial);
    let surgeries = count_recent(&historial.surgeries, thresholds, today);

    let weight = VitalSeries::weight(&historial.consultations);
    let temperature = VitalSeries::temperature(&historial.consultations);
    let weight_trend = weight_trend(&weight, thresholds);
    let temperature_trend = temperature_trend(&temperature, thresholds);

    let health = health_score(
        &HealthInputs {
            has_critical_allergy: allergies.critical > 0,
            has_severe_allergy: allergies.severe > 0,
            overdue_vaccines: vaccinations.overdue,
            deworming_stale: dewormings.needs_deworming,
            recent_consultations: consultations.count.last_30_days,
            vaccines_up_to_date: vaccinations.up_to_date,
        },
        &config.health_score,
    );

    tracing::debug!(
        patient_id = %patient.id,
        score = health.score,
        band = health.band.label(),
        "analyzed history"
    );

    Metrics {
        patient_id: patient.id.clone(),
        as_of: today,
        consultations,
        vaccinations,
        dewormings,
        allergies,
        surgeries,
        weight,
        weight_trend,
        temperature,
        temperature_trend,
        health,
    }
}

fn count_recent<T: ClinicalRecord>(
    records: &[T],
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> CategoryCount {
    let last_30_days = records
        .iter()
        .filter_map(|r| r.timestamp().ok())
        .map(|ts| dates::days_between(ts.date(), today))
        .filter(|days| (0..=thresholds.recent_window_days).contains(days))
        .count();

    CategoryCount {
        total: records.len(),
        last_30_days,
    }
}

fn consultation_stats(
    historial: &HistorialSnapshot,
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> ConsultationStats {
    let count = count_recent(&historial.consultations, thresholds, today);
    let visit_dates: Vec<NaiveDate> = historial
        .consultations
        .iter()
        .filter_map(|c| c.timestamp().ok())
        .map(|ts| ts.date())
        .collect();

    let average_per_month = match visit_dates.iter().min() {
        Some(first) => {
            let months = dates::whole_months_between(*first, today).max(1);
            round_tenth(count.total as f64 / f64::from(months))
        }
        None => 0.0,
    };

    ConsultationStats {
        count,
        average_per_month,
        top_diagnoses: top_diagnoses(historial),
        visit_trend: visit_trend(&visit_dates, today),
    }
}

/// Most frequent diagnoses; ties keep first-encounter order.
fn top_diagnoses(historial: &HistorialSnapshot) -> Vec<DiagnosisCount> {
    let mut order: Vec<DiagnosisCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for diagnosis in historial.consultations.iter().filter_map(|c| c.normalized_diagnosis()) {
        match index.get(&diagnosis) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(diagnosis.clone(), order.len());
                order.push(DiagnosisCount { diagnosis, count: 1 });
            }
        }
    }

    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(TOP_DIAGNOSES);
    order
}

/// Visits in the last 3 months against the 3 months before.
fn visit_trend(visit_dates: &[NaiveDate], today: NaiveDate) -> Trend {
    let three_months_ago = dates::months_before(today, 3);
    let six_months_ago = dates::months_before(today, 6);

    let recent = visit_dates
        .iter()
        .filter(|d| **d >= three_months_ago && **d <= today)
        .count() as f64;
    let older = visit_dates
        .iter()
        .filter(|d| **d >= six_months_ago && **d < three_months_ago)
        .count() as f64;

    if recent > older * 1.5 {
        Trend::Increasing
    } else if recent < older * 0.5 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn vaccination_stats(
    historial: &HistorialSnapshot,
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> VaccinationStats {
    let count = count_recent(&historial.vaccinations, thresholds, today);

    let overdue = historial
        .vaccinations
        .iter()
        .filter_map(|v| v.next_due_date())
        .filter(|due| *due < today)
        .count();

    let mut upcoming: Vec<UpcomingDose> = historial
        .vaccinations
        .iter()
        .filter_map(|v| {
            let due = v.next_due_date().filter(|due| *due > today)?;
            Some(UpcomingDose {
                record_id: v.id.clone(),
                vaccine_type: v.vaccine_type.clone(),
                due,
            })
        })
        .collect();
    upcoming.sort_by_key(|dose| dose.due);
    upcoming.truncate(UPCOMING_DOSES);

    VaccinationStats {
        count,
        overdue,
        up_to_date: count.total > 0 && overdue == 0,
        upcoming,
    }
}

fn deworming_stats(
    historial: &HistorialSnapshot,
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> DewormingStats {
    let last_applied = historial.most_recent_deworming().map(|(_, ts)| ts.date());

    DewormingStats {
        count: count_recent(&historial.dewormings, thresholds, today),
        last_applied,
        days_since_last: last_applied.map(|date| dates::days_between(date, today)),
        needs_deworming: stale_deworming(historial, thresholds, today).is_some(),
    }
}

fn allergy_stats(historial: &HistorialSnapshot) -> AllergyStats {
    historial
        .allergies
        .iter()
        .fold(AllergyStats::default(), |mut stats, allergy| {
            stats.total += 1;
            if allergy.active {
                stats.active += 1;
                match allergy.severity {
                    Severity::Critical => stats.critical += 1,
                    Severity::Severe => stats.severe += 1,
                    _ => {}
                }
            }
            stats
        })
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
