//! Individual notification rules.

use chrono::NaiveDate;

use super::{ColorHint, Notification, NotificationKind, Priority};
use crate::config::ClinicalThresholds;
use crate::dates;
use crate::models::{
    Allergy, ClinicalRecord, Consultation, Deworming, HistorialSnapshot, Patient, Severity,
    Vaccination,
};

#[allow(clippy::too_many_arguments)]
fn notification(
    kind: NotificationKind,
    priority: Priority,
    id: String,
    title: String,
    message: String,
    triggering_date: NaiveDate,
    color: ColorHint,
    source_record_id: &str,
) -> Notification {
    Notification {
        id,
        kind,
        priority,
        title,
        message,
        triggering_date,
        color,
        source_record_id: Some(source_record_id.to_string()),
    }
}

/// Overdue, upcoming, or scheduled vaccine dose.
pub(super) fn vaccine_due(
    vaccine: &Vaccination,
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> Option<Notification> {
    let due = vaccine.next_due_date()?;
    let days_until = dates::days_between(today, due);

    if days_until < 0 {
        let late = -days_until;
        let priority = if late > thresholds.vaccine_overdue_high_days {
            Priority::High
        } else {
            Priority::Medium
        };
        return Some(notification(
            NotificationKind::VaccineOverdue,
            priority,
            format!("vaccine-overdue-{}", vaccine.id),
            format!("Vacuna {} atrasada", vaccine.vaccine_type),
            format!("Esta vacuna está atrasada {} días", late),
            due,
            ColorHint::Red,
            &vaccine.id,
        ));
    }

    if days_until <= thresholds.vaccine_upcoming_days {
        let priority = if days_until <= thresholds.vaccine_upcoming_high_days {
            Priority::High
        } else {
            Priority::Medium
        };
        return Some(notification(
            NotificationKind::VaccineUpcoming,
            priority,
            format!("vaccine-upcoming-{}", vaccine.id),
            format!("Vacuna {} próxima", vaccine.vaccine_type),
            format!("Faltan {} día(s) para la próxima dosis", days_until),
            due,
            ColorHint::Yellow,
            &vaccine.id,
        ));
    }

    if days_until <= thresholds.vaccine_scheduled_days {
        return Some(notification(
            NotificationKind::VaccineUpcoming,
            Priority::Low,
            format!("vaccine-upcoming-{}", vaccine.id),
            format!("Vacuna {} programada", vaccine.vaccine_type),
            format!("Próxima dosis en {} días", days_until),
            due,
            ColorHint::Blue,
            &vaccine.id,
        ));
    }

    None
}

/// Overdue or upcoming deworming.
pub(super) fn deworming_due(
    deworming: &Deworming,
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> Option<Notification> {
    let due = deworming.next_due_date()?;
    let days_until = dates::days_between(today, due);

    if days_until < 0 {
        let late = -days_until;
        let priority = if late > thresholds.deworming_overdue_high_days {
            Priority::High
        } else {
            Priority::Medium
        };
        return Some(notification(
            NotificationKind::DewormingOverdue,
            priority,
            format!("deworming-overdue-{}", deworming.id),
            "Desparasitación atrasada".to_string(),
            format!("{} está atrasada {} días", product_or_default(deworming), late),
            due,
            ColorHint::Red,
            &deworming.id,
        ));
    }

    if days_until <= thresholds.deworming_upcoming_days {
        return Some(notification(
            NotificationKind::DewormingUpcoming,
            Priority::Medium,
            format!("deworming-upcoming-{}", deworming.id),
            "Desparasitación próxima".to_string(),
            format!("{} programada en {} día(s)", product_or_default(deworming), days_until),
            due,
            ColorHint::Purple,
            &deworming.id,
        ));
    }

    None
}

fn product_or_default(deworming: &Deworming) -> &str {
    if deworming.product.is_empty() {
        "Desparasitación"
    } else {
        &deworming.product
    }
}

/// Latest deworming when it is stale: nothing scheduled and applied too long
/// ago. Returns the record, its application date and the days elapsed.
pub(crate) fn stale_deworming<'a>(
    historial: &'a HistorialSnapshot,
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> Option<(&'a Deworming, NaiveDate, i64)> {
    let (latest, applied_at) = historial.most_recent_deworming()?;
    if latest.next_due_date().is_some() {
        return None;
    }

    let applied_on = applied_at.date();
    let elapsed = dates::days_between(applied_on, today);
    (elapsed > thresholds.deworming_stale_days).then_some((latest, applied_on, elapsed))
}

/// No deworming for too long and none scheduled.
pub(super) fn deworming_stale(
    historial: &HistorialSnapshot,
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> Option<Notification> {
    let (latest, applied_on, elapsed) = stale_deworming(historial, thresholds, today)?;
    Some(notification(
        NotificationKind::DewormingStale,
        Priority::Medium,
        format!("deworming-stale-{}", latest.id),
        "Programar desparasitación".to_string(),
        format!("Han pasado {} días desde la última desparasitación", elapsed),
        applied_on,
        ColorHint::Orange,
        &latest.id,
    ))
}

/// Active allergy reminder.
pub(super) fn allergy_active(allergy: &Allergy, today: NaiveDate) -> Option<Notification> {
    if !allergy.active {
        return None;
    }

    let priority = if allergy.severity.is_serious() {
        Priority::High
    } else if allergy.severity == Severity::Moderate {
        Priority::Medium
    } else {
        Priority::Low
    };
    let color = if priority == Priority::High {
        ColorHint::Red
    } else {
        ColorHint::Orange
    };
    let message = match allergy.symptoms.as_deref() {
        Some(symptoms) => format!("Severidad: {}. {}", allergy.severity.label(), symptoms),
        None => format!("Severidad: {}.", allergy.severity.label()),
    };
    let triggering_date = allergy.timestamp().map(|ts| ts.date()).unwrap_or(today);

    Some(notification(
        NotificationKind::AllergyActive,
        priority,
        format!("allergy-{}", allergy.id),
        format!("Alergia activa: {}", allergy.allergen),
        message,
        triggering_date,
        color,
        &allergy.id,
    ))
}

/// Latest recorded weight far from the patient's baseline.
pub(super) fn weight_change(
    patient: &Patient,
    latest: &Consultation,
    visit_date: NaiveDate,
    thresholds: &ClinicalThresholds,
) -> Option<Notification> {
    let baseline = patient.baseline_weight()?;
    let current = latest.vitals.weight_kg?;

    let change = (current - baseline) / baseline * 100.0;
    let magnitude = change.abs();
    if magnitude <= thresholds.weight_change_alert_percent {
        return None;
    }

    let priority = if magnitude >= thresholds.weight_change_high_percent {
        Priority::High
    } else {
        Priority::Medium
    };
    let direction = if change > 0.0 { "aumentado" } else { "disminuido" };

    Some(notification(
        NotificationKind::AbnormalWeightChange,
        priority,
        format!("weight-change-{}", latest.id),
        "Cambio significativo de peso".to_string(),
        format!("El peso ha {} un {:.1}%", direction, magnitude),
        visit_date,
        ColorHint::Yellow,
        &latest.id,
    ))
}

/// Latest recorded temperature outside the normal band.
pub(super) fn temperature(
    latest: &Consultation,
    visit_date: NaiveDate,
    thresholds: &ClinicalThresholds,
) -> Option<Notification> {
    let temp = latest.vitals.temperature_c?;
    let low = temp < thresholds.temperature_normal_min_c;
    if !low && temp <= thresholds.temperature_normal_max_c {
        return None;
    }

    let critical = temp < thresholds.temperature_critical_min_c
        || temp > thresholds.temperature_critical_max_c;
    let (priority, color) = if critical {
        (Priority::High, ColorHint::Red)
    } else {
        (Priority::Medium, ColorHint::Orange)
    };
    let title = if low { "Temperatura baja" } else { "Temperatura elevada" };

    Some(notification(
        NotificationKind::AbnormalTemperature,
        priority,
        format!("temperature-{}", latest.id),
        title.to_string(),
        format!(
            "Temperatura registrada: {}°C (normal: {}-{}°C)",
            temp, thresholds.temperature_normal_min_c, thresholds.temperature_normal_max_c
        ),
        visit_date,
        color,
        &latest.id,
    ))
}

/// Diagnosed or treated visit with no follow-up for a while.
pub(super) fn follow_up(
    latest: &Consultation,
    visit_date: NaiveDate,
    thresholds: &ClinicalThresholds,
    today: NaiveDate,
) -> Option<Notification> {
    if !latest.has_clinical_outcome() {
        return None;
    }

    let elapsed = dates::days_between(visit_date, today);
    if elapsed <= thresholds.follow_up_days {
        return None;
    }

    let priority = if elapsed > thresholds.follow_up_medium_days {
        Priority::Medium
    } else {
        Priority::Low
    };

    Some(notification(
        NotificationKind::FollowUpSuggested,
        priority,
        format!("follow-up-{}", latest.id),
        "Consulta de seguimiento sugerida".to_string(),
        format!("Han pasado {} días desde el último diagnóstico/tratamiento", elapsed),
        visit_date,
        ColorHint::Blue,
        &latest.id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn thresholds() -> ClinicalThresholds {
        ClinicalThresholds::default()
    }

    fn due_in(days: i64) -> String {
        (today() + chrono::Duration::days(days)).to_string()
    }

    #[test]
    fn test_vaccine_windows() {
        let cases = [
            (-40, NotificationKind::VaccineOverdue, Priority::High, ColorHint::Red),
            (-30, NotificationKind::VaccineOverdue, Priority::Medium, ColorHint::Red),
            (-1, NotificationKind::VaccineOverdue, Priority::Medium, ColorHint::Red),
            (0, NotificationKind::VaccineUpcoming, Priority::High, ColorHint::Yellow),
            (3, NotificationKind::VaccineUpcoming, Priority::High, ColorHint::Yellow),
            (4, NotificationKind::VaccineUpcoming, Priority::Medium, ColorHint::Yellow),
            (7, NotificationKind::VaccineUpcoming, Priority::Medium, ColorHint::Yellow),
            (8, NotificationKind::VaccineUpcoming, Priority::Low, ColorHint::Blue),
            (14, NotificationKind::VaccineUpcoming, Priority::Low, ColorHint::Blue),
        ];

        for (offset, kind, priority, color) in cases {
            let vaccine = Vaccination::new("9", "Rabia", "2023-06-01").due(due_in(offset));
            let n = vaccine_due(&vaccine, &thresholds(), today())
                .unwrap_or_else(|| panic!("no notification at offset {}", offset));
            assert_eq!((n.kind, n.priority, n.color), (kind, priority, color), "offset {}", offset);
        }

        let far = Vaccination::new("9", "Rabia", "2023-06-01").due(due_in(15));
        assert!(vaccine_due(&far, &thresholds(), today()).is_none());
    }

    #[test]
    fn test_vaccine_overdue_text() {
        let vaccine = Vaccination::new("17", "Rabia", "2023-01-01").due(due_in(-40));
        let n = vaccine_due(&vaccine, &thresholds(), today()).unwrap();
        assert_eq!(n.id, "vaccine-overdue-17");
        assert_eq!(n.title, "Vacuna Rabia atrasada");
        assert_eq!(n.message, "Esta vacuna está atrasada 40 días");
        assert_eq!(n.triggering_date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }

    #[test]
    fn test_vaccine_without_next_due() {
        let vaccine = Vaccination::new("1", "Rabia", "2024-01-01");
        assert!(vaccine_due(&vaccine, &thresholds(), today()).is_none());
    }

    #[test]
    fn test_deworming_windows() {
        let overdue = Deworming::new("1", "Milbemax", "2024-01-01").due(due_in(-61));
        let n = deworming_due(&overdue, &thresholds(), today()).unwrap();
        assert_eq!((n.kind, n.priority), (NotificationKind::DewormingOverdue, Priority::High));

        let recent = Deworming::new("1", "Milbemax", "2024-01-01").due(due_in(-60));
        assert_eq!(deworming_due(&recent, &thresholds(), today()).unwrap().priority, Priority::Medium);

        let upcoming = Deworming::new("1", "Milbemax", "2024-01-01").due(due_in(7));
        let n = deworming_due(&upcoming, &thresholds(), today()).unwrap();
        assert_eq!((n.kind, n.color), (NotificationKind::DewormingUpcoming, ColorHint::Purple));

        let later = Deworming::new("1", "Milbemax", "2024-01-01").due(due_in(8));
        assert!(deworming_due(&later, &thresholds(), today()).is_none());
    }

    #[test]
    fn test_stale_deworming_uses_latest_application() {
        let historial = HistorialSnapshot {
            dewormings: vec![
                Deworming::new("old", "Drontal", "2023-01-01"),
                Deworming::new("new", "Milbemax", "2024-02-01"),
            ],
            ..Default::default()
        };

        let n = deworming_stale(&historial, &thresholds(), today()).unwrap();
        assert_eq!(n.id, "deworming-stale-new");
        assert_eq!(n.priority, Priority::Medium);
        assert_eq!(n.triggering_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        let scheduled = HistorialSnapshot {
            dewormings: vec![Deworming::new("new", "Milbemax", "2024-02-01").due("2024-08-01")],
            ..Default::default()
        };
        assert!(deworming_stale(&scheduled, &thresholds(), today()).is_none());
    }

    #[test]
    fn test_stale_boundary() {
        let exactly = HistorialSnapshot {
            dewormings: vec![Deworming::new("1", "Milbemax", due_in(-90))],
            ..Default::default()
        };
        assert!(deworming_stale(&exactly, &thresholds(), today()).is_none());

        let over = HistorialSnapshot {
            dewormings: vec![Deworming::new("1", "Milbemax", due_in(-91))],
            ..Default::default()
        };
        assert!(deworming_stale(&over, &thresholds(), today()).is_some());
    }

    #[test]
    fn test_allergy_priorities() {
        let critical = Allergy::new("1", "Penicilina", Severity::Critical);
        let n = allergy_active(&critical, today()).unwrap();
        assert_eq!((n.priority, n.color), (Priority::High, ColorHint::Red));
        assert_eq!(n.triggering_date, today());

        let moderate = Allergy::new("2", "Pollo", Severity::Moderate).detected("2024-01-01");
        let n = allergy_active(&moderate, today()).unwrap();
        assert_eq!((n.priority, n.color), (Priority::Medium, ColorHint::Orange));
        assert_eq!(n.triggering_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let severe = Allergy::new("4", "Látex", Severity::Severe);
        assert_eq!(allergy_active(&severe, today()).unwrap().priority, Priority::High);

        let mild = Allergy::new("5", "Ácaros", Severity::Mild);
        assert_eq!(allergy_active(&mild, today()).unwrap().priority, Priority::Low);

        let mut inactive = Allergy::new("3", "Polen", Severity::Severe);
        inactive.active = false;
        assert!(allergy_active(&inactive, today()).is_none());
    }

    #[test]
    fn test_weight_change() {
        let patient = Patient::new("p", "Max", "canino").with_weight(10.0);
        let mut visit = Consultation::new("c1", "2024-06-01", "Control");
        let visit_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        visit.vitals.weight_kg = Some(11.0);
        assert!(weight_change(&patient, &visit, visit_date, &thresholds()).is_none());

        visit.vitals.weight_kg = Some(11.5);
        let n = weight_change(&patient, &visit, visit_date, &thresholds()).unwrap();
        assert_eq!(n.priority, Priority::Medium);
        assert_eq!(n.message, "El peso ha aumentado un 15.0%");

        visit.vitals.weight_kg = Some(7.5);
        let n = weight_change(&patient, &visit, visit_date, &thresholds()).unwrap();
        assert_eq!(n.priority, Priority::High);
        assert_eq!(n.message, "El peso ha disminuido un 25.0%");

        let no_baseline = Patient::new("p", "Max", "canino");
        assert!(weight_change(&no_baseline, &visit, visit_date, &thresholds()).is_none());
    }

    #[test]
    fn test_temperature_bands() {
        let visit_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let cases = [
            (38.5, None),
            (37.5, None),
            (39.5, None),
            (39.8, Some((Priority::Medium, "Temperatura elevada"))),
            (40.1, Some((Priority::High, "Temperatura elevada"))),
            (37.0, Some((Priority::Medium, "Temperatura baja"))),
            (35.9, Some((Priority::High, "Temperatura baja"))),
        ];

        for (temp, expected) in cases {
            let mut visit = Consultation::new("c1", "2024-06-01", "Control");
            visit.vitals.temperature_c = Some(temp);
            let got = temperature(&visit, visit_date, &thresholds())
                .map(|n| (n.priority, n.title.clone()));
            let expected = expected.map(|(p, t)| (p, t.to_string()));
            assert_eq!(got, expected, "temperature {}", temp);
        }
    }

    #[test]
    fn test_follow_up() {
        let mut visit = Consultation::new("42", "2024-04-01", "Otitis");
        let visit_date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert!(follow_up(&visit, visit_date, &thresholds(), today()).is_none());

        visit.diagnosis = Some("Otitis externa".into());
        let n = follow_up(&visit, visit_date, &thresholds(), today()).unwrap();
        assert_eq!(n.id, "follow-up-42");
        assert_eq!(n.priority, Priority::Medium);

        let recent = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let n = follow_up(&visit, recent, &thresholds(), today()).unwrap();
        assert_eq!(n.priority, Priority::Low);

        let too_recent = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        assert!(follow_up(&visit, too_recent, &thresholds(), today()).is_none());
    }
}
