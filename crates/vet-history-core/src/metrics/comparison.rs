//! Side-by-side comparison of two date ranges.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::series::mean;
use crate::dates;
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{ClinicalRecord, HistorialSnapshot};

/// Inclusive date range; `end` covers its whole day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(label: impl Into<String>, start: NaiveDate, end: NaiveDate) -> AnalysisResult<Self> {
        let period = Self {
            label: label.into(),
            start,
            end,
        };
        period.validate()?;
        Ok(period)
    }

    /// From `days` days before `today` through `today`, both ends included.
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        Self {
            label: format!("Últimos {} días", days),
            start: dates::days_before(today, days),
            end: today,
        }
    }

    /// The `months` calendar months up to and including `today`.
    pub fn last_months(months: u32, today: NaiveDate) -> Self {
        let label = if months == 1 {
            "Último mes".to_string()
        } else {
            format!("Últimos {} meses", months)
        };
        Self {
            label,
            start: dates::months_before(today, months),
            end: today,
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.start > self.end {
            return Err(AnalysisError::InvalidInput(format!(
                "period {:?} starts after it ends ({} > {})",
                self.label, self.start, self.end
            )));
        }
        Ok(())
    }

    /// Check if a timestamp falls inside the range.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= dates::start_of_day(self.start) && at <= dates::end_of_day(self.end)
    }

    fn count<T: ClinicalRecord>(&self, records: &[T]) -> usize {
        records
            .iter()
            .filter_map(|r| r.timestamp().ok())
            .filter(|ts| self.contains(*ts))
            .count()
    }
}

/// Aggregates of one period. Averages are 0 when there are no readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub consultations: usize,
    pub vaccinations: usize,
    pub dewormings: usize,
    pub surgeries: usize,
    pub allergies: usize,
    pub weight_average: f64,
    pub weight_min: f64,
    pub weight_max: f64,
    pub weight_readings: usize,
    pub temperature_average: f64,
    pub temperature_readings: usize,
}

impl PeriodSummary {
    /// Summarize the records of `historial` that fall inside `period`.
    pub fn collect(historial: &HistorialSnapshot, period: &Period) -> Self {
        let in_range: Vec<_> = historial
            .consultations
            .iter()
            .filter(|c| c.timestamp().map(|ts| period.contains(ts)).unwrap_or(false))
            .collect();

        let weights: Vec<f64> = in_range.iter().filter_map(|c| c.vitals.weight_kg).collect();
        let temperatures: Vec<f64> = in_range.iter().filter_map(|c| c.vitals.temperature_c).collect();

        Self {
            period: period.clone(),
            consultations: in_range.len(),
            vaccinations: period.count(&historial.vaccinations),
            dewormings: period.count(&historial.dewormings),
            surgeries: period.count(&historial.surgeries),
            allergies: period.count(&historial.allergies),
            weight_average: mean(&weights).unwrap_or(0.0),
            weight_min: weights.iter().copied().reduce(f64::min).unwrap_or(0.0),
            weight_max: weights.iter().copied().reduce(f64::max).unwrap_or(0.0),
            weight_readings: weights.len(),
            temperature_average: mean(&temperatures).unwrap_or(0.0),
            temperature_readings: temperatures.len(),
        }
    }
}

/// Difference from period A to period B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// `b - a`
    pub delta: f64,
    /// `(b - a) / a * 100`, or 0 when `a` is 0
    pub percent_change: f64,
}

impl Change {
    pub fn between(a: f64, b: f64) -> Self {
        let delta = b - a;
        let percent_change = if a == 0.0 { 0.0 } else { delta / a * 100.0 };
        Self {
            delta,
            percent_change,
        }
    }

    fn counts(a: usize, b: usize) -> Self {
        Self::between(a as f64, b as f64)
    }
}

/// Both summaries and the changes between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub period_a: PeriodSummary,
    pub period_b: PeriodSummary,
    pub consultations: Change,
    pub vaccinations: Change,
    pub dewormings: Change,
    pub surgeries: Change,
    pub allergies: Change,
    pub weight_average: Change,
    pub temperature_average: Change,
}

/// Compare two periods of the same history.
pub fn compare_periods(
    historial: &HistorialSnapshot,
    period_a: &Period,
    period_b: &Period,
) -> AnalysisResult<Comparison> {
    period_a.validate()?;
    period_b.validate()?;

    let a = PeriodSummary::collect(historial, period_a);
    let b = PeriodSummary::collect(historial, period_b);

    tracing::debug!(
        a = %period_a.label,
        b = %period_b.label,
        consultations_a = a.consultations,
        consultations_b = b.consultations,
        "compared periods"
    );

    Ok(Comparison {
        consultations: Change::counts(a.consultations, b.consultations),
        vaccinations: Change::counts(a.vaccinations, b.vaccinations),
        dewormings: Change::counts(a.dewormings, b.dewormings),
        surgeries: Change::counts(a.surgeries, b.surgeries),
        allergies: Change::counts(a.allergies, b.allergies),
        weight_average: Change::between(a.weight_average, b.weight_average),
        temperature_average: Change::between(a.temperature_average, b.temperature_average),
        period_a: a,
        period_b: b,
    })
}
