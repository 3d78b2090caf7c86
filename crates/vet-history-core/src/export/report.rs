//! Full patient report: everything the clinical-history page derives.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimelineRow;
use crate::config::AnalysisConfig;
use crate::error::AnalysisResult;
use crate::metrics::{analyze_with, Metrics};
use crate::models::{HistorialSnapshot, Patient};
use crate::notifications::{count_by_priority, derive_notifications_with, Notification, NotificationCounts};
use crate::timeline::build_timeline_with_report;

/// Report format version.
pub const REPORT_FORMAT_VERSION: &str = "1";

/// Complete derived report for one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Patient as received
    pub patient: Patient,
    /// Dashboard metrics
    pub metrics: Metrics,
    /// Active alerts, sorted
    pub notifications: Vec<Notification>,
    /// Alert totals per priority
    pub notification_counts: NotificationCounts,
    /// Full timeline, newest first
    pub timeline: Vec<TimelineRow>,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report format version
    pub format_version: String,
    /// Reference date of every derivation
    pub generated_on: NaiveDate,
    /// SHA-256 of patient plus snapshot
    pub fingerprint: String,
    /// Records left out of the timeline for bad dates
    pub skipped_records: usize,
}

impl PatientReport {
    /// Derive every view of a snapshot into one report.
    pub fn build(
        patient: &Patient,
        historial: &HistorialSnapshot,
        today: NaiveDate,
        config: &AnalysisConfig,
    ) -> AnalysisResult<Self> {
        let fingerprint = historial.fingerprint(patient)?;
        let timeline = build_timeline_with_report(historial);
        let notifications = derive_notifications_with(patient, historial, today, &config.thresholds);

        Ok(Self {
            metadata: ReportMetadata {
                format_version: REPORT_FORMAT_VERSION.to_string(),
                generated_on: today,
                fingerprint,
                skipped_records: timeline.skipped.len(),
            },
            patient: patient.clone(),
            metrics: analyze_with(patient, historial, today, config),
            notification_counts: count_by_priority(&notifications),
            notifications,
            timeline: timeline.items.iter().map(TimelineRow::from).collect(),
        })
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allergy, Consultation, Severity, Vaccination};

    #[test]
    fn test_report_collects_all_views() {
        let patient = Patient::new("p1", "Luna", "felino").with_weight(4.0);
        let historial = HistorialSnapshot {
            consultations: vec![
                Consultation::new("c1", "2024-06-01", "Control"),
                Consultation::new("c2", "sin fecha", "Revisión"),
            ],
            vaccinations: vec![Vaccination::new("v1", "Triple felina", "2024-01-01").due("2024-06-20")],
            allergies: vec![Allergy::new("a1", "Pollo", Severity::Moderate).detected("2023-05-01")],
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let report = PatientReport::build(&patient, &historial, today, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.timeline.len(), 3);
        assert_eq!(report.metadata.skipped_records, 1);
        assert_eq!(report.metadata.fingerprint, historial.fingerprint(&patient).unwrap());
        assert_eq!(report.notification_counts.total, report.notifications.len());
        assert_eq!(report.notification_counts.medium, 2);
        assert_eq!(report.metrics.consultations.count.total, 2);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"format_version\": \"1\""));
    }
}
