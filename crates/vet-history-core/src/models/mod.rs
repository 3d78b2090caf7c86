//! Domain models for patient clinical histories.

mod allergy;
mod consultation;
pub(crate) mod de;
mod historial;
mod patient;
mod preventive;
mod surgery;

pub use allergy::*;
pub use consultation::*;
pub use historial::*;
pub use patient::*;
pub use preventive::*;
pub use surgery::*;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::error::MalformedRecord;

/// The five kinds of clinical record in a history.
///
/// Declaration order is the timeline tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Consultation,
    Vaccination,
    Deworming,
    Allergy,
    Surgery,
}

impl Category {
    /// All categories in tie-break order.
    pub const ALL: [Category; 5] = [
        Category::Consultation,
        Category::Vaccination,
        Category::Deworming,
        Category::Allergy,
        Category::Surgery,
    ];

    /// Stable machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Consultation => "consultation",
            Category::Vaccination => "vaccination",
            Category::Deworming => "deworming",
            Category::Allergy => "allergy",
            Category::Surgery => "surgery",
        }
    }

    /// Label shown to clinic staff.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Consultation => "Consulta",
            Category::Vaccination => "Vacuna",
            Category::Deworming => "Desparasitación",
            Category::Allergy => "Alergia",
            Category::Surgery => "Cirugía",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the machine names and the frontend's Spanish filter values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consultation" | "consulta" => Ok(Category::Consultation),
            "vaccination" | "vacuna" => Ok(Category::Vaccination),
            "deworming" | "desparasitacion" | "desparasitación" => Ok(Category::Deworming),
            "allergy" | "alergia" => Ok(Category::Allergy),
            "surgery" | "cirugia" | "cirugía" => Ok(Category::Surgery),
            other => Err(format!("unknown record category: {}", other)),
        }
    }
}

/// Common view over every clinical record kind.
pub trait ClinicalRecord {
    /// Kind of this record.
    const CATEGORY: Category;

    /// Name of the field holding the ordering date.
    const DATE_FIELD: &'static str;

    /// Source record id.
    fn record_id(&self) -> &str;

    /// Raw ordering date as sent by the backend.
    fn raw_date(&self) -> Option<&str>;

    /// Validated ordering timestamp.
    fn timestamp(&self) -> Result<NaiveDateTime, MalformedRecord> {
        let raw = self.raw_date();
        dates::parse_optional(raw).ok_or_else(|| {
            MalformedRecord::for_date(Self::CATEGORY, self.record_id(), Self::DATE_FIELD, raw)
        })
    }
}
