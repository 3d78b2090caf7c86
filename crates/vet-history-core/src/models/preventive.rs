//! Preventive care records: vaccinations and dewormings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{de, Category, ClinicalRecord};
use crate::dates;

/// An applied vaccine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Vaccination {
    /// Backend record id
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    /// Vaccine type (e.g., "Rabia", "Séxtuple")
    #[serde(default, alias = "tipo_vacuna", deserialize_with = "de::text_or_empty")]
    pub vaccine_type: String,
    /// Application date
    #[serde(default, alias = "fecha_aplicacion", deserialize_with = "de::blank_as_none")]
    pub applied_at: Option<String>,
    /// Lot/batch number
    #[serde(default, alias = "lote_vacuna", deserialize_with = "de::blank_as_none")]
    pub lot: Option<String>,
    /// Clinician who applied it
    #[serde(default, alias = "veterinario", deserialize_with = "de::blank_as_none")]
    pub clinician: Option<String>,
    /// Next dose due date
    #[serde(default, alias = "fecha_proxima", deserialize_with = "de::blank_as_none")]
    pub next_due: Option<String>,
}

impl Vaccination {
    /// Create a vaccination with required fields.
    pub fn new(id: impl Into<String>, vaccine_type: impl Into<String>, applied_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vaccine_type: vaccine_type.into(),
            applied_at: Some(applied_at.into()),
            ..Default::default()
        }
    }

    /// Builder-style next-due setter.
    pub fn due(mut self, next_due: impl Into<String>) -> Self {
        self.next_due = Some(next_due.into());
        self
    }

    /// Parsed next-due date, if set and valid.
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        self.next_due.as_deref().and_then(dates::parse_date)
    }
}

impl ClinicalRecord for Vaccination {
    const CATEGORY: Category = Category::Vaccination;
    const DATE_FIELD: &'static str = "applied_at";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn raw_date(&self) -> Option<&str> {
        self.applied_at.as_deref()
    }
}

/// An applied deworming treatment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Deworming {
    /// Backend record id
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    /// Product name
    #[serde(default, alias = "producto", deserialize_with = "de::text_or_empty")]
    pub product: String,
    /// Dose as written
    #[serde(default, alias = "dosis", deserialize_with = "de::text_or_empty")]
    pub dose: String,
    /// Application date
    #[serde(default, alias = "fecha_aplicacion", deserialize_with = "de::blank_as_none")]
    pub applied_at: Option<String>,
    /// Clinician who applied it
    #[serde(default, alias = "veterinario", deserialize_with = "de::blank_as_none")]
    pub clinician: Option<String>,
    /// Next application due date
    #[serde(default, alias = "fecha_proxima", deserialize_with = "de::blank_as_none")]
    pub next_due: Option<String>,
}

impl Deworming {
    /// Create a deworming with required fields.
    pub fn new(id: impl Into<String>, product: impl Into<String>, applied_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            product: product.into(),
            applied_at: Some(applied_at.into()),
            ..Default::default()
        }
    }

    /// Builder-style next-due setter.
    pub fn due(mut self, next_due: impl Into<String>) -> Self {
        self.next_due = Some(next_due.into());
        self
    }

    /// Parsed next-due date, if set and valid.
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        self.next_due.as_deref().and_then(dates::parse_date)
    }
}

impl ClinicalRecord for Deworming {
    const CATEGORY: Category = Category::Deworming;
    const DATE_FIELD: &'static str = "applied_at";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn raw_date(&self) -> Option<&str> {
        self.applied_at.as_deref()
    }
}
