//! The per-patient history snapshot consumed by every derivation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{de, Allergy, ClinicalRecord, Consultation, Deworming, Patient, Surgery, Vaccination};

/// Immutable bundle of one patient's clinical records.
///
/// Collections may be empty; `null` or missing arrays deserialize as empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HistorialSnapshot {
    /// Clinical visits
    #[serde(default, alias = "consultas", deserialize_with = "de::null_as_empty")]
    pub consultations: Vec<Consultation>,
    /// Applied vaccines
    #[serde(default, alias = "vacunas", deserialize_with = "de::null_as_empty")]
    pub vaccinations: Vec<Vaccination>,
    /// Applied dewormings
    #[serde(default, alias = "desparasitaciones", deserialize_with = "de::null_as_empty")]
    pub dewormings: Vec<Deworming>,
    /// Recorded allergies
    #[serde(default, alias = "alergias", deserialize_with = "de::null_as_empty")]
    pub allergies: Vec<Allergy>,
    /// Surgeries and procedures
    #[serde(default, alias = "cirugias", deserialize_with = "de::null_as_empty")]
    pub surgeries: Vec<Surgery>,
}

impl HistorialSnapshot {
    /// Total number of records across all collections.
    pub fn total_records(&self) -> usize {
        self.consultations.len()
            + self.vaccinations.len()
            + self.dewormings.len()
            + self.allergies.len()
            + self.surgeries.len()
    }

    /// Check if the snapshot holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }

    /// Latest consultation with a valid visit date.
    pub fn most_recent_consultation(&self) -> Option<(&Consultation, NaiveDateTime)> {
        most_recent(&self.consultations)
    }

    /// Latest deworming with a valid application date.
    pub fn most_recent_deworming(&self) -> Option<(&Deworming, NaiveDateTime)> {
        most_recent(&self.dewormings)
    }

    /// Content hash of the patient plus this snapshot.
    ///
    /// Identical inputs always produce the same derived views, so callers can
    /// key deduplication or caching on this value.
    pub fn fingerprint(&self, patient: &Patient) -> Result<String, serde_json::Error> {
        let payload = serde_json::to_vec(&(patient, self))?;
        Ok(hash_data(&payload))
    }
}

/// Record with the greatest valid timestamp; the earliest in input order wins ties.
pub(crate) fn most_recent<T: ClinicalRecord>(records: &[T]) -> Option<(&T, NaiveDateTime)> {
    records
        .iter()
        .filter_map(|record| record.timestamp().ok().map(|ts| (record, ts)))
        .fold(None, |best, (record, ts)| match best {
            Some((_, best_ts)) if best_ts >= ts => best,
            _ => Some((record, ts)),
        })
}

/// Hash data using SHA-256, hex encoded.
fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
