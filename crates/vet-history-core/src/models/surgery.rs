//! Surgery and procedure models.

use serde::{Deserialize, Serialize};

use super::{de, Category, ClinicalRecord};

/// A surgery or procedure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Surgery {
    /// Backend record id
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    /// Procedure name
    #[serde(default, alias = "nombre", deserialize_with = "de::text_or_empty")]
    pub name: String,
    /// Procedure type
    #[serde(default, alias = "tipo", deserialize_with = "de::blank_as_none")]
    pub surgery_type: Option<String>,
    /// Date performed
    #[serde(default, alias = "fecha_realizacion", deserialize_with = "de::blank_as_none")]
    pub performed_at: Option<String>,
    /// Surgeon
    #[serde(default, alias = "veterinario", deserialize_with = "de::blank_as_none")]
    pub clinician: Option<String>,
    /// Duration in minutes
    #[serde(default, alias = "duracion_minutos", deserialize_with = "de::lenient_u32")]
    pub duration_minutes: Option<u32>,
    /// Anesthesia used
    #[serde(default, alias = "anestesia_utilizada", deserialize_with = "de::blank_as_none")]
    pub anesthesia: Option<String>,
    /// Outcome
    #[serde(default, alias = "resultado", deserialize_with = "de::text_or_empty")]
    pub result: String,
    /// Complications
    #[serde(default, alias = "complicaciones", deserialize_with = "de::blank_as_none")]
    pub complications: Option<String>,
    /// Post-operative notes
    #[serde(default, alias = "notas_postoperatorias", deserialize_with = "de::blank_as_none")]
    pub notes: Option<String>,
}

impl Surgery {
    /// Create a surgery with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, performed_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            performed_at: Some(performed_at.into()),
            ..Default::default()
        }
    }
}

impl ClinicalRecord for Surgery {
    const CATEGORY: Category = Category::Surgery;
    const DATE_FIELD: &'static str = "performed_at";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn raw_date(&self) -> Option<&str> {
        self.performed_at.as_deref()
    }
}
