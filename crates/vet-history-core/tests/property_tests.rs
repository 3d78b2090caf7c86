//! Property tests for the derivation invariants.

use chrono::NaiveDate;
use proptest::prelude::*;

use vet_history_core::config::HealthScoreWeights;
use vet_history_core::metrics::{analyze, health_score, Change, HealthInputs};
use vet_history_core::models::{
    Allergy, Category, Consultation, Deworming, HistorialSnapshot, Patient, Severity, Surgery,
    Vaccination,
};
use vet_history_core::notifications::derive_notifications;
use vet_history_core::timeline::{build_timeline_with_report, filter_timeline, TimelineFilter};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// Mostly valid dates, with the malformed values the backend actually sends.
fn raw_date() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => (2022i32..=2025, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d)),
        2 => (2022i32..=2025, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60)
            .prop_map(|(y, m, d, h, min)| format!("{:04}-{:02}-{:02} {:02}:{:02}:00", y, m, d, h, min)),
        1 => Just(String::new()),
        1 => Just("sin fecha".to_string()),
        1 => Just("2024-13-45".to_string()),
    ]
}

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Mild),
        Just(Severity::Moderate),
        Just(Severity::Severe),
        Just(Severity::Critical),
    ]
}

fn consultation() -> impl Strategy<Value = Consultation> {
    (
        raw_date(),
        "[a-z ]{0,12}",
        proptest::option::of("[a-z]{3,8}"),
        proptest::option::of(1.0f64..60.0),
        proptest::option::of(35.0f64..42.0),
    )
        .prop_map(|(date, reason, diagnosis, weight, temp)| {
            let mut c = Consultation::new("", date, reason);
            c.diagnosis = diagnosis;
            c.vitals.weight_kg = weight;
            c.vitals.temperature_c = temp;
            c
        })
}

fn vaccination() -> impl Strategy<Value = Vaccination> {
    (raw_date(), "[A-Za-z]{3,10}", proptest::option::of(raw_date())).prop_map(
        |(applied, kind, due)| {
            let mut v = Vaccination::new("", kind, applied);
            v.next_due = due;
            v
        },
    )
}

fn deworming() -> impl Strategy<Value = Deworming> {
    (raw_date(), "[A-Za-z]{3,10}", proptest::option::of(raw_date())).prop_map(
        |(applied, product, due)| {
            let mut d = Deworming::new("", product, applied);
            d.next_due = due;
            d
        },
    )
}

fn allergy() -> impl Strategy<Value = Allergy> {
    (proptest::option::of(raw_date()), "[a-z]{3,10}", severity(), any::<bool>()).prop_map(
        |(detected, allergen, severity, active)| {
            let mut a = Allergy::new("", allergen, severity);
            a.detected_at = detected;
            a.active = active;
            a
        },
    )
}

fn surgery() -> impl Strategy<Value = Surgery> {
    (raw_date(), "[a-z]{3,12}").prop_map(|(date, name)| Surgery::new("", name, date))
}

/// Snapshot with unique record ids per collection.
fn snapshot() -> impl Strategy<Value = HistorialSnapshot> {
    (
        proptest::collection::vec(consultation(), 0..12),
        proptest::collection::vec(vaccination(), 0..6),
        proptest::collection::vec(deworming(), 0..6),
        proptest::collection::vec(allergy(), 0..4),
        proptest::collection::vec(surgery(), 0..4),
    )
        .prop_map(|(mut c, mut v, mut d, mut a, mut s)| {
            c.iter_mut().enumerate().for_each(|(i, r)| r.id = format!("c{}", i));
            v.iter_mut().enumerate().for_each(|(i, r)| r.id = format!("v{}", i));
            d.iter_mut().enumerate().for_each(|(i, r)| r.id = format!("d{}", i));
            a.iter_mut().enumerate().for_each(|(i, r)| r.id = format!("a{}", i));
            s.iter_mut().enumerate().for_each(|(i, r)| r.id = format!("s{}", i));
            HistorialSnapshot {
                consultations: c,
                vaccinations: v,
                dewormings: d,
                allergies: a,
                surgeries: s,
            }
        })
}

fn patient() -> impl Strategy<Value = Patient> {
    proptest::option::of(1.0f64..60.0).prop_map(|weight| {
        let mut p = Patient::new("p1", "Max", "canino");
        p.weight_kg = weight;
        p
    })
}

fn criteria() -> impl Strategy<Value = TimelineFilter> {
    (
        "[a-z]{0,3}",
        proptest::option::of(proptest::sample::select(Category::ALL.to_vec())),
    )
        .prop_map(|(query, category)| {
            let filter = TimelineFilter::new().with_query(query);
            match category {
                Some(c) => filter.with_category(c),
                None => filter,
            }
        })
}

proptest! {
    #[test]
    fn prop_timeline_accounts_for_every_record(historial in snapshot()) {
        let build = build_timeline_with_report(&historial);
        prop_assert_eq!(build.items.len() + build.skipped.len(), historial.total_records());
    }

    #[test]
    fn prop_timeline_newest_first(historial in snapshot()) {
        let build = build_timeline_with_report(&historial);
        for pair in build.items.windows(2) {
            prop_assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn prop_filter_idempotent(historial in snapshot(), criteria in criteria()) {
        let items = build_timeline_with_report(&historial).items;
        let once = filter_timeline(&items, &criteria);
        let twice = filter_timeline(&once, &criteria);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_notifications_deterministic(patient in patient(), historial in snapshot()) {
        let first = derive_notifications(&patient, &historial, today());
        let second = derive_notifications(&patient, &historial, today());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_notifications_sorted_by_priority(patient in patient(), historial in snapshot()) {
        let notifications = derive_notifications(&patient, &historial, today());
        for pair in notifications.windows(2) {
            prop_assert!(pair[0].priority <= pair[1].priority);
        }
    }

    #[test]
    fn prop_health_score_bounded(patient in patient(), historial in snapshot()) {
        let metrics = analyze(&patient, &historial, today());
        prop_assert!(metrics.health.score <= 100);
    }

    #[test]
    fn prop_health_score_bounded_for_any_weights(
        critical in any::<bool>(),
        severe in any::<bool>(),
        overdue in 0usize..5,
        stale in any::<bool>(),
        recent in 0usize..20,
        up_to_date in any::<bool>(),
        penalty in -500i32..500,
        bonus in -500i32..500,
    ) {
        let weights = HealthScoreWeights {
            critical_allergy_penalty: penalty,
            overdue_vaccine_penalty: penalty,
            vaccines_up_to_date_bonus: bonus,
            ..Default::default()
        };
        let inputs = HealthInputs {
            has_critical_allergy: critical,
            has_severe_allergy: severe,
            overdue_vaccines: overdue,
            deworming_stale: stale,
            recent_consultations: recent,
            vaccines_up_to_date: up_to_date,
        };
        prop_assert!(health_score(&inputs, &weights).score <= 100);
    }

    #[test]
    fn prop_percent_change_zero_guard(b in 0.0f64..1000.0) {
        let change = Change::between(0.0, b);
        prop_assert_eq!(change.percent_change, 0.0);
        prop_assert_eq!(change.delta, b);
    }
}
