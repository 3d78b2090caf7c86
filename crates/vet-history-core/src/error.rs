//! Error types shared by the derivation pipeline.

use thiserror::Error;

use crate::models::Category;

/// Errors that abort a derivation call.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// A single record that could not be placed in a date-sensitive view.
///
/// Recoverable: the record is left out and the rest of the snapshot is
/// processed normally.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{category} record {record_id}: {field} {reason}")]
pub struct MalformedRecord {
    /// Kind of record
    pub category: Category,
    /// Source record id
    pub record_id: String,
    /// Offending wire field
    pub field: &'static str,
    /// What was wrong with it
    pub reason: MalformedReason,
}

/// Why a record field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// Field absent or empty
    Missing,
    /// Field present but not a recognizable date
    Unparseable(String),
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::Missing => write!(f, "is missing"),
            MalformedReason::Unparseable(raw) => write!(f, "is not a valid date: {:?}", raw),
        }
    }
}

impl MalformedRecord {
    /// Build a report for a date field that is absent or unparseable.
    pub fn for_date(
        category: Category,
        record_id: &str,
        field: &'static str,
        raw: Option<&str>,
    ) -> Self {
        let reason = match raw.map(str::trim) {
            None | Some("") => MalformedReason::Missing,
            Some(value) => MalformedReason::Unparseable(value.to_string()),
        };

        Self {
            category,
            record_id: record_id.to_string(),
            field,
            reason,
        }
    }
}
