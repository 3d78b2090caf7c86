//! Allergy models.

use serde::{Deserialize, Serialize};

use super::{de, Category, ClinicalRecord};

/// Allergy severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    /// Parse an English or Spanish severity label. Unknown labels are mild.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "critical" | "critica" | "crítica" => Severity::Critical,
            "severe" | "severa" => Severity::Severe,
            "moderate" | "moderada" => Severity::Moderate,
            _ => Severity::Mild,
        }
    }

    /// Label shown to clinic staff.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "leve",
            Severity::Moderate => "moderada",
            Severity::Severe => "severa",
            Severity::Critical => "crítica",
        }
    }

    /// Severe or critical.
    pub fn is_serious(&self) -> bool {
        matches!(self, Severity::Severe | Severity::Critical)
    }
}

/// A recorded allergy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Allergy {
    /// Backend record id
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    /// Allergen name
    #[serde(default, alias = "nombre_alergeno", deserialize_with = "de::text_or_empty")]
    pub allergen: String,
    /// Allergy category (food, drug, environmental...)
    #[serde(default, alias = "tipo_alergia", deserialize_with = "de::blank_as_none")]
    pub allergy_type: Option<String>,
    /// Severity
    #[serde(default, alias = "severidad", deserialize_with = "de::severity")]
    pub severity: Severity,
    /// Observed symptoms
    #[serde(default, alias = "sintomas", deserialize_with = "de::blank_as_none")]
    pub symptoms: Option<String>,
    /// Detection date
    #[serde(default, alias = "fecha_deteccion", deserialize_with = "de::blank_as_none")]
    pub detected_at: Option<String>,
    /// Record creation timestamp, used when no detection date was entered
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub created_at: Option<String>,
    /// Whether the allergy is still active
    #[serde(default, alias = "activa", deserialize_with = "de::lenient_bool")]
    pub active: bool,
}

impl Allergy {
    /// Create an active allergy.
    pub fn new(id: impl Into<String>, allergen: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            allergen: allergen.into(),
            severity,
            active: true,
            ..Default::default()
        }
    }

    /// Builder-style detection date setter.
    pub fn detected(mut self, date: impl Into<String>) -> Self {
        self.detected_at = Some(date.into());
        self
    }
}

impl ClinicalRecord for Allergy {
    const CATEGORY: Category = Category::Allergy;
    const DATE_FIELD: &'static str = "detected_at";

    fn record_id(&self) -> &str {
        &self.id
    }

    /// Detection date, or the creation timestamp when none was entered.
    fn raw_date(&self) -> Option<&str> {
        self.detected_at.as_deref().or(self.created_at.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::from_label("critica"), Severity::Critical);
        assert_eq!(Severity::from_label("Severa"), Severity::Severe);
        assert_eq!(Severity::from_label("moderate"), Severity::Moderate);
        assert_eq!(Severity::from_label("leve"), Severity::Mild);
        assert_eq!(Severity::from_label("desconocida"), Severity::Mild);
        assert!(Severity::Critical.is_serious());
        assert!(!Severity::Moderate.is_serious());
    }

    #[test]
    fn test_from_backend_row() {
        let allergy: Allergy = serde_json::from_str(
            r#"{"id": 8, "nombre_alergeno": "Penicilina", "tipo_alergia": "medicamento",
                "severidad": "critica", "sintomas": "Urticaria", "fecha_deteccion": null,
                "created_at": "2023-11-02 09:00:00", "activa": 1}"#,
        )
        .unwrap();

        assert_eq!(allergy.severity, Severity::Critical);
        assert!(allergy.active);
        assert_eq!(allergy.raw_date(), Some("2023-11-02 09:00:00"));
        assert!(allergy.timestamp().is_ok());
    }

    #[test]
    fn test_detection_date_preferred() {
        let mut allergy = Allergy::new("1", "Pollo", Severity::Mild).detected("2024-04-01");
        allergy.created_at = Some("2024-04-03 12:00:00".into());
        assert_eq!(allergy.timestamp().unwrap().date().to_string(), "2024-04-01");
    }
}
