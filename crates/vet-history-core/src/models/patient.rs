//! Patient models.

use serde::{Deserialize, Serialize};

use super::de;
use crate::error::{AnalysisError, AnalysisResult};

/// A patient with the biometric snapshot used as a clinical baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Patient {
    /// Backend patient id
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    /// Patient name
    #[serde(default, alias = "nombre_mascota", alias = "nombre", deserialize_with = "de::text_or_empty")]
    pub name: String,
    /// Species (e.g., "canino", "felino")
    #[serde(default, alias = "especie", deserialize_with = "de::text_or_empty")]
    pub species: String,
    /// Breed
    #[serde(default, alias = "raza", alias = "nombre_raza", deserialize_with = "de::blank_as_none")]
    pub breed: Option<String>,
    /// Recorded weight in kg, the baseline for weight-change alerts
    #[serde(default, alias = "peso", deserialize_with = "de::lenient_f64")]
    pub weight_kg: Option<f64>,
    /// Date of birth
    #[serde(default, alias = "fecha_nacimiento", deserialize_with = "de::blank_as_none")]
    pub birth_date: Option<String>,
    /// Owner first name
    #[serde(default, alias = "nombre_propietario", deserialize_with = "de::blank_as_none")]
    pub owner_name: Option<String>,
    /// Owner surname
    #[serde(default, alias = "apellidos_propietario", deserialize_with = "de::blank_as_none")]
    pub owner_surname: Option<String>,
    /// Contact phone
    #[serde(default, alias = "telefono", deserialize_with = "de::blank_as_none")]
    pub phone: Option<String>,
    /// Contact email
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub email: Option<String>,
}

impl Patient {
    /// Create a patient with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            species: species.into(),
            ..Default::default()
        }
    }

    /// Builder-style weight setter.
    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    /// Weight usable as a baseline (present and positive).
    pub fn baseline_weight(&self) -> Option<f64> {
        self.weight_kg.filter(|w| w.is_finite() && *w > 0.0)
    }

    /// Owner name and surname joined, when known.
    pub fn owner_full_name(&self) -> Option<String> {
        match (&self.owner_name, &self.owner_surname) {
            (Some(name), Some(surname)) => Some(format!("{} {}", name, surname)),
            (Some(name), None) => Some(name.clone()),
            (None, Some(surname)) => Some(surname.clone()),
            (None, None) => None,
        }
    }

    /// Check the patient invariants.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.id.trim().is_empty() {
            return Err(AnalysisError::InvalidInput("patient id is empty".into()));
        }

        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(AnalysisError::InvalidInput(format!(
                    "patient {} has non-positive weight {}",
                    self.id, weight
                )));
            }
        }

        Ok(())
    }
}
