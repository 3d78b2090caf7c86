//! Rule-based clinical alerts.
//!
//! Every rule is evaluated independently against the snapshot; a rule never
//! produces more than one notification per source record. The result is
//! sorted by priority (high first), then triggering date (oldest first), then
//! id, so identical input always yields an identical list.
//!
//! | Rule | Kind | Priority |
//! |------|------|----------|
//! | Next vaccine dose in the past | `vaccine_overdue` | high when > 30 days late |
//! | Next vaccine dose within 14 days | `vaccine_upcoming` | high ≤ 3 d, medium ≤ 7 d, low |
//! | Next deworming in the past | `deworming_overdue` | high when > 60 days late |
//! | Next deworming within 7 days | `deworming_upcoming` | medium |
//! | Last deworming > 90 days ago, nothing scheduled | `deworming_stale` | medium |
//! | Active allergy | `allergy_active` | by severity |
//! | Latest weight > 10% off the patient baseline | `abnormal_weight_change` | high from 20% |
//! | Latest temperature outside 37.5–39.5 °C | `abnormal_temperature` | high outside 36–40 °C |
//! | Latest visit diagnosed/treated > 30 days ago | `follow_up_suggested` | medium after 60 days |

mod rules;

pub(crate) use rules::stale_deworming;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ClinicalThresholds;
use crate::models::{HistorialSnapshot, Patient};

/// Rule that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    VaccineOverdue,
    VaccineUpcoming,
    DewormingOverdue,
    DewormingUpcoming,
    DewormingStale,
    AllergyActive,
    AbnormalWeightChange,
    AbnormalTemperature,
    FollowUpSuggested,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::VaccineOverdue => "vaccine_overdue",
            NotificationKind::VaccineUpcoming => "vaccine_upcoming",
            NotificationKind::DewormingOverdue => "deworming_overdue",
            NotificationKind::DewormingUpcoming => "deworming_upcoming",
            NotificationKind::DewormingStale => "deworming_stale",
            NotificationKind::AllergyActive => "allergy_active",
            NotificationKind::AbnormalWeightChange => "abnormal_weight_change",
            NotificationKind::AbnormalTemperature => "abnormal_temperature",
            NotificationKind::FollowUpSuggested => "follow_up_suggested",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification priority. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation color hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorHint {
    Red,
    Orange,
    Yellow,
    Blue,
    Purple,
}

impl ColorHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorHint::Red => "red",
            ColorHint::Orange => "orange",
            ColorHint::Yellow => "yellow",
            ColorHint::Blue => "blue",
            ColorHint::Purple => "purple",
        }
    }
}

/// A derived alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Stable id: rule slug plus source record id
    pub id: String,
    /// Rule that fired
    pub kind: NotificationKind,
    /// Priority
    pub priority: Priority,
    /// Short headline
    pub title: String,
    /// Detail line
    pub message: String,
    /// Date the alert is anchored to (due date, visit date...)
    pub triggering_date: NaiveDate,
    /// Presentation color hint
    pub color: ColorHint,
    /// Record that triggered the rule
    pub source_record_id: Option<String>,
}

/// Notification totals per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

/// Derive every notification for a patient with the default thresholds.
pub fn derive_notifications(
    patient: &Patient,
    historial: &HistorialSnapshot,
    today: NaiveDate,
) -> Vec<Notification> {
    derive_notifications_with(patient, historial, today, &ClinicalThresholds::default())
}

/// Derive every notification for a patient.
pub fn derive_notifications_with(
    patient: &Patient,
    historial: &HistorialSnapshot,
    today: NaiveDate,
    thresholds: &ClinicalThresholds,
) -> Vec<Notification> {
    let mut notifications = Vec::new();

    for vaccine in &historial.vaccinations {
        notifications.extend(rules::vaccine_due(vaccine, thresholds, today));
    }
    for deworming in &historial.dewormings {
        notifications.extend(rules::deworming_due(deworming, thresholds, today));
    }
    notifications.extend(rules::deworming_stale(historial, thresholds, today));
    for allergy in &historial.allergies {
        notifications.extend(rules::allergy_active(allergy, today));
    }
    if let Some((latest, visited_at)) = historial.most_recent_consultation() {
        let visit_date = visited_at.date();
        notifications.extend(rules::weight_change(patient, latest, visit_date, thresholds));
        notifications.extend(rules::temperature(latest, visit_date, thresholds));
        notifications.extend(rules::follow_up(latest, visit_date, thresholds, today));
    }

    sort_notifications(&mut notifications);

    tracing::debug!(
        patient_id = %patient.id,
        count = notifications.len(),
        "derived notifications"
    );

    notifications
}

/// Priority, then triggering date, then id.
pub fn sort_notifications(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.triggering_date.cmp(&b.triggering_date))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Keep notifications of one priority.
pub fn filter_by_priority(notifications: &[Notification], priority: Priority) -> Vec<Notification> {
    notifications
        .iter()
        .filter(|n| n.priority == priority)
        .cloned()
        .collect()
}

/// Keep notifications of one kind.
pub fn filter_by_kind(notifications: &[Notification], kind: NotificationKind) -> Vec<Notification> {
    notifications
        .iter()
        .filter(|n| n.kind == kind)
        .cloned()
        .collect()
}

/// Count notifications per priority.
pub fn count_by_priority(notifications: &[Notification]) -> NotificationCounts {
    notifications
        .iter()
        .fold(NotificationCounts::default(), |mut counts, n| {
            match n.priority {
                Priority::High => counts.high += 1,
                Priority::Medium => counts.medium += 1,
                Priority::Low => counts.low += 1,
            }
            counts.total += 1;
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allergy, Consultation, Deworming, Severity, Vaccination};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn busy_historial() -> HistorialSnapshot {
        let mut latest = Consultation::new("c2", "2024-06-10 10:00:00", "Fiebre");
        latest.vitals.temperature_c = Some(40.5);
        latest.vitals.weight_kg = Some(8.0);

        HistorialSnapshot {
            consultations: vec![Consultation::new("c1", "2024-01-10", "Control"), latest],
            vaccinations: vec![
                Vaccination::new("v1", "Rabia", "2023-04-01").due("2024-04-01"),
                Vaccination::new("v2", "Séxtuple", "2024-05-01").due("2024-06-25"),
            ],
            dewormings: vec![Deworming::new("d1", "Milbemax", "2024-04-01").due("2024-06-20")],
            allergies: vec![
                Allergy::new("a1", "Pollo", Severity::Mild).detected("2023-02-01"),
                Allergy::new("a2", "Penicilina", Severity::Critical).detected("2022-05-05"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_ordering_priority_then_date() {
        let patient = Patient::new("p1", "Max", "canino").with_weight(10.0);
        let notifications = derive_notifications(&patient, &busy_historial(), today());

        let ids: Vec<&str> = notifications.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "allergy-a2",
                "vaccine-overdue-v1",
                "temperature-c2",
                "weight-change-c2",
                "deworming-upcoming-d1",
                "allergy-a1",
                "vaccine-upcoming-v2",
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let patient = Patient::new("p1", "Max", "canino").with_weight(10.0);
        let a = derive_notifications(&patient, &busy_historial(), today());
        let b = derive_notifications(&patient, &busy_historial(), today());
        assert_eq!(a, b);
    }

    #[test]
    fn test_helpers() {
        let patient = Patient::new("p1", "Max", "canino").with_weight(10.0);
        let notifications = derive_notifications(&patient, &busy_historial(), today());

        let counts = count_by_priority(&notifications);
        assert_eq!(counts, NotificationCounts { high: 4, medium: 1, low: 2, total: 7 });

        assert_eq!(filter_by_priority(&notifications, Priority::Low).len(), 2);
        let allergies = filter_by_kind(&notifications, NotificationKind::AllergyActive);
        assert_eq!(allergies.len(), 2);
        assert!(allergies.iter().all(|n| n.kind == NotificationKind::AllergyActive));
    }

    #[test]
    fn test_empty_snapshot_has_no_notifications() {
        let patient = Patient::new("p1", "Max", "canino");
        assert!(derive_notifications(&patient, &HistorialSnapshot::default(), today()).is_empty());
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(NotificationKind::AbnormalWeightChange).unwrap();
        assert_eq!(json, "abnormal_weight_change");
        assert_eq!(serde_json::to_value(Priority::High).unwrap(), "high");
        assert!(Priority::High < Priority::Medium);
    }
}
