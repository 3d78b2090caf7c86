//! Timeline export for spreadsheets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::models::Patient;
use crate::timeline::TimelineItem;

const CSV_HEADER: &str = "patient_id,patient_name,date,time,category,title,subtitle,record_id\n";

/// Timeline export for one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineExport {
    /// Export metadata
    pub metadata: TimelineExportMetadata,
    /// One row per timeline item, in timeline order
    pub rows: Vec<TimelineRow>,
}

/// Timeline export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineExportMetadata {
    /// Backend patient id
    pub patient_id: String,
    /// Patient name
    pub patient_name: String,
    /// Owner, when known
    pub owner: Option<String>,
    /// Reference date of the export
    pub exported_on: NaiveDate,
    /// Snapshot fingerprint for traceability
    pub fingerprint: Option<String>,
}

/// Single exported timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    /// Record date (YYYY-MM-DD)
    pub date: String,
    /// Record time (HH:MM)
    pub time: String,
    /// Category label as shown to staff
    pub category: String,
    pub title: String,
    pub subtitle: String,
    /// Source record id
    pub record_id: String,
}

impl From<&TimelineItem> for TimelineRow {
    fn from(item: &TimelineItem) -> Self {
        Self {
            date: item.timestamp.format("%Y-%m-%d").to_string(),
            time: item.timestamp.format("%H:%M").to_string(),
            category: item.category.label().to_string(),
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            record_id: item.record.id().to_string(),
        }
    }
}

impl TimelineExport {
    /// Create an export from a patient and their (possibly filtered) timeline.
    pub fn new(patient: &Patient, items: &[TimelineItem], exported_on: NaiveDate) -> Self {
        Self {
            metadata: TimelineExportMetadata {
                patient_id: patient.id.clone(),
                patient_name: patient.name.clone(),
                owner: patient.owner_full_name(),
                exported_on,
                fingerprint: None,
            },
            rows: items.iter().map(TimelineRow::from).collect(),
        }
    }

    /// Attach the snapshot fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.metadata.fingerprint = Some(fingerprint.into());
        self
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);

        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                escape_csv(&self.metadata.patient_id),
                escape_csv(&self.metadata.patient_name),
                row.date,
                row.time,
                escape_csv(&row.category),
                escape_csv(&row.title),
                escape_csv(&row.subtitle),
                escape_csv(&row.record_id),
            ));
        }

        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Consultation, HistorialSnapshot, Vaccination};
    use crate::timeline::build_timeline;

    fn make_export() -> TimelineExport {
        let mut consultation = Consultation::new("c1", "2024-03-10 09:30:00", "Vómito, diarrea");
        consultation.clinician = Some("Laura Gómez".into());
        let mut vaccine = Vaccination::new("v1", "Rabia", "2024-02-01");
        vaccine.lot = Some("L-42".into());

        let historial = HistorialSnapshot {
            consultations: vec![consultation],
            vaccinations: vec![vaccine],
            ..Default::default()
        };
        let mut patient = Patient::new("p1", "Max", "canino");
        patient.owner_name = Some("Ana".into());

        TimelineExport::new(
            &patient,
            &build_timeline(&historial),
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        )
    }

    #[test]
    fn test_rows_follow_timeline() {
        let export = make_export();
        assert_eq!(export.rows.len(), 2);
        assert_eq!(export.rows[0].date, "2024-03-10");
        assert_eq!(export.rows[0].time, "09:30");
        assert_eq!(export.rows[0].category, "Consulta");
        assert_eq!(export.rows[1].title, "Vacuna: Rabia");
        assert_eq!(export.metadata.owner.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_timeline_export_csv() {
        let csv = make_export().to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3); // Header + 2 rows
        assert!(lines[0].starts_with("patient_id,"));
        assert!(lines[1].contains("\"Vómito, diarrea\""));
        assert!(lines[2].contains("Lote: L-42"));
    }

    #[test]
    fn test_timeline_export_json() {
        let json = make_export().with_fingerprint("abc123").to_json().unwrap();
        assert!(json.contains("\"fingerprint\": \"abc123\""));
        assert!(json.contains("Vacuna: Rabia"));
    }
}
