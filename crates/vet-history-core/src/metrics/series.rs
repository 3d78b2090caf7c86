//! Vital-sign series and trend classification.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::ClinicalThresholds;
use crate::models::{ClinicalRecord, Consultation, VitalSigns};

/// One dated measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalPoint {
    pub recorded_at: NaiveDateTime,
    pub value: f64,
}

/// Chronological series of one vital sign with summary statistics.
///
/// All statistics are `None` when there are no readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSeries {
    /// Readings, oldest first
    pub points: Vec<VitalPoint>,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Most recent reading
    pub latest: Option<f64>,
    /// Reading before the most recent one
    pub previous: Option<f64>,
}

impl VitalSeries {
    /// Collect one vital sign from every dated consultation that recorded it.
    ///
    /// Consultations without a usable date are skipped; readings sharing a
    /// timestamp keep their input order.
    pub fn from_consultations<F>(consultations: &[Consultation], reading: F) -> Self
    where
        F: Fn(&VitalSigns) -> Option<f64>,
    {
        let mut points: Vec<VitalPoint> = consultations
            .iter()
            .filter_map(|c| {
                let value = reading(&c.vitals)?;
                let recorded_at = c.timestamp().ok()?;
                Some(VitalPoint { recorded_at, value })
            })
            .collect();
        points.sort_by_key(|p| p.recorded_at);
        Self::from_points(points)
    }

    /// Weight readings (kg).
    pub fn weight(consultations: &[Consultation]) -> Self {
        Self::from_consultations(consultations, |v| v.weight_kg)
    }

    /// Temperature readings (°C).
    pub fn temperature(consultations: &[Consultation]) -> Self {
        Self::from_consultations(consultations, |v| v.temperature_c)
    }

    fn from_points(points: Vec<VitalPoint>) -> Self {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let average = mean(&values);
        let min = values.iter().copied().reduce(f64::min);
        let max = values.iter().copied().reduce(f64::max);
        let latest = values.last().copied();
        let previous = values.len().checked_sub(2).map(|i| values[i]);

        Self {
            points,
            average,
            min,
            max,
            latest,
            previous,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest minus previous reading.
    pub fn change(&self) -> Option<f64> {
        Some(self.latest? - self.previous?)
    }

    /// Relative change of the latest reading vs the previous one, in percent.
    pub fn change_percent(&self) -> Option<f64> {
        let previous = self.previous.filter(|p| *p != 0.0)?;
        Some((self.latest? - previous) / previous * 100.0)
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Direction of a quantity over time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

/// Temperature status based on the latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureTrend {
    Normal,
    Elevated,
    Low,
    /// Not enough readings to say
    Stable,
}

impl TemperatureTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureTrend::Normal => "normal",
            TemperatureTrend::Elevated => "elevated",
            TemperatureTrend::Low => "low",
            TemperatureTrend::Stable => "stable",
        }
    }
}

/// Weight trend from the two most recent readings.
pub fn weight_trend(series: &VitalSeries, thresholds: &ClinicalThresholds) -> Trend {
    match series.change_percent() {
        Some(pct) if pct.abs() <= thresholds.weight_trend_stable_percent => Trend::Stable,
        Some(pct) if pct > 0.0 => Trend::Increasing,
        Some(_) => Trend::Decreasing,
        None => Trend::Stable,
    }
}

/// Temperature status from the most recent reading.
pub fn temperature_trend(series: &VitalSeries, thresholds: &ClinicalThresholds) -> TemperatureTrend {
    if series.len() < 2 {
        return TemperatureTrend::Stable;
    }
    match series.latest {
        Some(t) if t > thresholds.temperature_normal_max_c => TemperatureTrend::Elevated,
        Some(t) if t < thresholds.temperature_normal_min_c => TemperatureTrend::Low,
        Some(_) => TemperatureTrend::Normal,
        None => TemperatureTrend::Stable,
    }
}
