//! Ingestion boundary: backend JSON into validated snapshots.
//!
//! This is the single place where payload shape is checked. A payload that is
//! not an object (or an object of the wrong shape) is rejected as
//! [`AnalysisError::InvalidInput`], as is a backend failure response
//! (`success: false`). Bad dates inside otherwise well-formed records are left
//! for the derivations to skip.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{HistorialSnapshot, Patient};

/// Keys of the five collections, English and backend (Spanish) names.
const HISTORIAL_KEYS: [&str; 10] = [
    "consultations",
    "consultas",
    "vaccinations",
    "vacunas",
    "dewormings",
    "desparasitaciones",
    "allergies",
    "alergias",
    "surgeries",
    "cirugias",
];

/// Parse and validate a patient payload.
pub fn parse_patient(json: &str) -> AnalysisResult<Patient> {
    let object = parse_object(json, "patient")?;
    let patient: Patient = decode(object, "patient")?;
    patient.validate()?;
    Ok(patient)
}

/// Parse a history payload, bare or wrapped in `{ "success": .., "data": .. }`.
///
/// The object must carry at least one of the five collections.
pub fn parse_historial(json: &str) -> AnalysisResult<HistorialSnapshot> {
    let object = parse_object(json, "historial")?;
    if !HISTORIAL_KEYS.iter().any(|key| object.contains_key(*key)) {
        return Err(AnalysisError::InvalidInput(format!(
            "historial has none of the record collections ({})",
            HISTORIAL_KEYS.join(", ")
        )));
    }

    let historial: HistorialSnapshot = decode(object, "historial")?;
    tracing::debug!(records = historial.total_records(), "parsed historial");
    Ok(historial)
}

fn parse_object(json: &str, what: &str) -> AnalysisResult<Map<String, Value>> {
    let value: Value = serde_json::from_str(json)?;
    match unwrap_envelope(value, what)? {
        Value::Object(map) => Ok(map),
        other => Err(AnalysisError::InvalidInput(format!(
            "{} must be a JSON object, got {}",
            what,
            kind_of(&other)
        ))),
    }
}

fn decode<T: DeserializeOwned>(object: Map<String, Value>, what: &str) -> AnalysisResult<T> {
    serde_json::from_value(Value::Object(object))
        .map_err(|e| AnalysisError::InvalidInput(format!("malformed {}: {}", what, e)))
}

/// Any object with a `success` flag is a backend response envelope.
fn unwrap_envelope(value: Value, what: &str) -> AnalysisResult<Value> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };
    let Some(success) = map.get("success") else {
        return Ok(Value::Object(map));
    };

    if success != &Value::Bool(true) {
        let message = ["msg", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .unwrap_or("request failed");
        return Err(AnalysisError::InvalidInput(format!(
            "backend returned no {}: {}",
            what, message
        )));
    }

    Ok(map.remove("data").unwrap_or(Value::Null))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patient_row() {
        let patient = parse_patient(
            r#"{"id": 12, "nombre_mascota": "Max", "especie": "canino",
                "peso": "10.5", "nombre_propietario": "Ana", "apellidos_propietario": "Ruiz"}"#,
        )
        .unwrap();
        assert_eq!(patient.id, "12");
        assert_eq!(patient.weight_kg, Some(10.5));
        assert_eq!(patient.owner_full_name().as_deref(), Some("Ana Ruiz"));
    }

    #[test]
    fn test_non_object_rejected() {
        for payload in ["null", "[]", "42", "\"patient\""] {
            assert!(
                matches!(parse_patient(payload), Err(AnalysisError::InvalidInput(_))),
                "payload {}",
                payload
            );
            assert!(matches!(parse_historial(payload), Err(AnalysisError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_invalid_json_is_json_error() {
        assert!(matches!(parse_historial("{consultas"), Err(AnalysisError::Json(_))));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let err = parse_historial(r#"{"consultas": "ninguna"}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        assert!(matches!(
            parse_patient(r#"{"id": 1, "nombre_mascota": "Max", "peso": 0}"#),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_envelope() {
        let historial = parse_historial(
            r#"{"success": true, "data": {
                "consultas": [{"id": 1, "fecha_consulta": "2024-01-01", "motivo_consulta": "Control"}],
                "vacunas": null
            }}"#,
        )
        .unwrap();
        assert_eq!(historial.consultations.len(), 1);
        assert!(historial.vaccinations.is_empty());

        let failed = parse_historial(r#"{"success": false, "data": null, "message": "Paciente no encontrado"}"#);
        assert!(matches!(failed, Err(AnalysisError::InvalidInput(m)) if m.contains("no encontrado")));
    }

    #[test]
    fn test_denied_response_without_data() {
        let denied = r#"{"success": false, "msg": "No tienes permiso para acceder a este paciente"}"#;

        let err = parse_historial(denied).unwrap_err();
        assert!(matches!(&err, AnalysisError::InvalidInput(m) if m.contains("No tienes permiso")));
        assert!(matches!(parse_patient(denied), Err(AnalysisError::InvalidInput(_))));

        let bad_request = parse_historial(r#"{"success": false, "msg": "ID de paciente inválido"}"#);
        assert!(matches!(bad_request, Err(AnalysisError::InvalidInput(m)) if m.contains("inválido")));
    }

    #[test]
    fn test_success_without_data_rejected() {
        assert!(matches!(
            parse_historial(r#"{"success": true}"#),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unrelated_object_rejected() {
        for payload in [r#"{"pacientes": [1, 2, 3]}"#, "{}", r#"{"success": true, "data": {}}"#] {
            assert!(
                matches!(parse_historial(payload), Err(AnalysisError::InvalidInput(_))),
                "payload {}",
                payload
            );
        }
    }

    #[test]
    fn test_single_collection_is_enough() {
        let historial = parse_historial(r#"{"alergias": []}"#).unwrap();
        assert!(historial.is_empty());

        let historial = parse_historial(r#"{"surgeries": null}"#).unwrap();
        assert_eq!(historial.total_records(), 0);
    }
}
