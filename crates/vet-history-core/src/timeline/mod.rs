//! Unified clinical timeline.
//!
//! Pipeline: five record collections → normalized items → sort → filter → page
//!
//! Items are ordered by timestamp (newest first by default). Items sharing a
//! timestamp fall back to category order (consultation, vaccination,
//! deworming, allergy, surgery) and then to their position in the input.

mod filter;
mod pagination;

pub use filter::*;
pub use pagination::*;

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::MalformedRecord;
use crate::models::{
    Allergy, Category, ClinicalRecord, Consultation, Deworming, HistorialSnapshot, Surgery,
    Vaccination,
};

/// One normalized, sortable timeline entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineItem {
    /// Record kind
    pub category: Category,
    /// Ordering timestamp
    pub timestamp: NaiveDateTime,
    /// Headline shown on the card
    pub title: String,
    /// Secondary line (may be empty)
    pub subtitle: String,
    /// The source record
    pub record: TimelineRecord,
}

/// Source record behind a timeline item.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TimelineRecord {
    Consultation(Consultation),
    Vaccination(Vaccination),
    Deworming(Deworming),
    Allergy(Allergy),
    Surgery(Surgery),
}

impl TimelineRecord {
    /// Source record id.
    pub fn id(&self) -> &str {
        match self {
            TimelineRecord::Consultation(r) => &r.id,
            TimelineRecord::Vaccination(r) => &r.id,
            TimelineRecord::Deworming(r) => &r.id,
            TimelineRecord::Allergy(r) => &r.id,
            TimelineRecord::Surgery(r) => &r.id,
        }
    }
}

/// Timeline plus the records that could not be placed on it.
#[derive(Debug, Clone, Default)]
pub struct TimelineBuild {
    /// Items in default (newest first) order
    pub items: Vec<TimelineItem>,
    /// Records skipped for a missing or unparseable date
    pub skipped: Vec<MalformedRecord>,
}

/// Merge every collection of the snapshot into one newest-first timeline.
///
/// Records without a usable date are left out; use
/// [`build_timeline_with_report`] to see which.
pub fn build_timeline(historial: &HistorialSnapshot) -> Vec<TimelineItem> {
    build_timeline_with_report(historial).items
}

/// Like [`build_timeline`], also reporting skipped records.
pub fn build_timeline_with_report(historial: &HistorialSnapshot) -> TimelineBuild {
    let mut build = TimelineBuild {
        items: Vec::with_capacity(historial.total_records()),
        skipped: Vec::new(),
    };

    build.collect(&historial.consultations, describe_consultation);
    build.collect(&historial.vaccinations, describe_vaccination);
    build.collect(&historial.dewormings, describe_deworming);
    build.collect(&historial.allergies, describe_allergy);
    build.collect(&historial.surgeries, describe_surgery);

    sort_timeline(&mut build.items, SortOrder::Descending);

    tracing::debug!(
        items = build.items.len(),
        skipped = build.skipped.len(),
        "built clinical timeline"
    );

    build
}

/// Sort in place. Stable, so equal keys keep their current relative order.
pub fn sort_timeline(items: &mut [TimelineItem], order: SortOrder) {
    items.sort_by(|a, b| compare_items(a, b, order));
}

fn compare_items(a: &TimelineItem, b: &TimelineItem, order: SortOrder) -> Ordering {
    let by_time = match order {
        SortOrder::Descending => b.timestamp.cmp(&a.timestamp),
        SortOrder::Ascending => a.timestamp.cmp(&b.timestamp),
    };
    by_time.then_with(|| a.category.cmp(&b.category))
}

impl TimelineBuild {
    fn collect<T, F>(&mut self, records: &[T], describe: F)
    where
        T: ClinicalRecord,
        F: Fn(&T) -> (String, String, TimelineRecord),
    {
        for record in records {
            match record.timestamp() {
                Ok(timestamp) => {
                    let (title, subtitle, source) = describe(record);
                    self.items.push(TimelineItem {
                        category: T::CATEGORY,
                        timestamp,
                        title,
                        subtitle,
                        record: source,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        category = %err.category,
                        record_id = %err.record_id,
                        "record left out of timeline: {}",
                        err
                    );
                    self.skipped.push(err);
                }
            }
        }
    }
}

fn describe_consultation(c: &Consultation) -> (String, String, TimelineRecord) {
    let subtitle = c
        .clinician
        .as_deref()
        .map(|name| format!("Dr. {}", name))
        .unwrap_or_default();
    (c.reason.clone(), subtitle, TimelineRecord::Consultation(c.clone()))
}

fn describe_vaccination(v: &Vaccination) -> (String, String, TimelineRecord) {
    let subtitle = v
        .lot
        .as_deref()
        .map(|lot| format!("Lote: {}", lot))
        .unwrap_or_default();
    (
        format!("Vacuna: {}", v.vaccine_type),
        subtitle,
        TimelineRecord::Vaccination(v.clone()),
    )
}

fn describe_deworming(d: &Deworming) -> (String, String, TimelineRecord) {
    let subtitle = if d.dose.is_empty() {
        String::new()
    } else {
        format!("Dosis: {}", d.dose)
    };
    (
        format!("Desparasitación: {}", d.product),
        subtitle,
        TimelineRecord::Deworming(d.clone()),
    )
}

fn describe_allergy(a: &Allergy) -> (String, String, TimelineRecord) {
    (
        format!("Alergia: {}", a.allergen),
        format!("Severidad: {}", a.severity.label()),
        TimelineRecord::Allergy(a.clone()),
    )
}

fn describe_surgery(s: &Surgery) -> (String, String, TimelineRecord) {
    let subtitle = match (s.clinician.as_deref(), s.result.is_empty()) {
        (Some(name), false) => format!("Dr. {} - {}", name, s.result),
        (Some(name), true) => format!("Dr. {}", name),
        (None, false) => s.result.clone(),
        (None, true) => String::new(),
    };
    (s.name.clone(), subtitle, TimelineRecord::Surgery(s.clone()))
}
