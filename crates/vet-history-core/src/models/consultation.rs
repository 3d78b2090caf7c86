//! Consultation (clinical visit) models.

use serde::{Deserialize, Serialize};

use super::{de, Category, ClinicalRecord};

/// A single clinical visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Consultation {
    /// Backend record id
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    /// Visit date/time
    #[serde(default, alias = "fecha_consulta", deserialize_with = "de::blank_as_none")]
    pub visit_date: Option<String>,
    /// Reason for the visit
    #[serde(default, alias = "motivo_consulta", deserialize_with = "de::text_or_empty")]
    pub reason: String,
    /// Diagnosis
    #[serde(default, alias = "diagnostico", deserialize_with = "de::blank_as_none")]
    pub diagnosis: Option<String>,
    /// Treatment
    #[serde(default, alias = "tratamiento", deserialize_with = "de::blank_as_none")]
    pub treatment: Option<String>,
    /// Vital signs taken during the visit
    #[serde(flatten)]
    pub vitals: VitalSigns,
    /// Attending clinician
    #[serde(default, alias = "veterinario", deserialize_with = "de::blank_as_none")]
    pub clinician: Option<String>,
    /// Free-text notes
    #[serde(default, alias = "observaciones", deserialize_with = "de::blank_as_none")]
    pub notes: Option<String>,
}

/// Vital signs recorded in a consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VitalSigns {
    /// Weight in kg
    #[serde(default, alias = "peso_actual", deserialize_with = "de::lenient_f64")]
    pub weight_kg: Option<f64>,
    /// Rectal temperature in °C
    #[serde(default, alias = "temperatura", deserialize_with = "de::lenient_f64")]
    pub temperature_c: Option<f64>,
    /// Beats per minute
    #[serde(default, alias = "frecuencia_cardiaca", deserialize_with = "de::lenient_f64")]
    pub heart_rate: Option<f64>,
    /// Breaths per minute
    #[serde(default, alias = "frecuencia_respiratoria", deserialize_with = "de::lenient_f64")]
    pub respiratory_rate: Option<f64>,
    /// Blood pressure as written (e.g. "120/80")
    #[serde(default, alias = "presion_arterial", deserialize_with = "de::blank_as_none")]
    pub blood_pressure: Option<String>,
    /// Capillary refill time as written
    #[serde(default, alias = "tiempo_llenado_capilar", deserialize_with = "de::blank_as_none")]
    pub capillary_refill: Option<String>,
    /// Pain score, 0-10
    #[serde(default, alias = "nivel_dolor", deserialize_with = "de::pain_level")]
    pub pain_level: Option<u8>,
    /// Body condition score as written
    #[serde(default, alias = "condicion_corporal", deserialize_with = "de::blank_as_none")]
    pub body_condition: Option<String>,
    /// Hydration state
    #[serde(default, alias = "estado_hidratacion", deserialize_with = "de::blank_as_none")]
    pub hydration: Option<String>,
}

impl Consultation {
    /// Create a consultation with required fields.
    pub fn new(id: impl Into<String>, visit_date: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visit_date: Some(visit_date.into()),
            reason: reason.into(),
            ..Default::default()
        }
    }

    /// Whether the visit ended with a diagnosis or a treatment plan.
    pub fn has_clinical_outcome(&self) -> bool {
        self.diagnosis.is_some() || self.treatment.is_some()
    }

    /// Diagnosis normalized for grouping (trimmed, lowercased).
    pub fn normalized_diagnosis(&self) -> Option<String> {
        self.diagnosis
            .as_deref()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
    }
}

impl ClinicalRecord for Consultation {
    const CATEGORY: Category = Category::Consultation;
    const DATE_FIELD: &'static str = "visit_date";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn raw_date(&self) -> Option<&str> {
        self.visit_date.as_deref()
    }
}
