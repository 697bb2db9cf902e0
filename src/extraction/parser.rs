//! Lenient parsing of the extraction service's JSON payload.
//!
//! The service returns one patient quadruple and a list of name/value/unit
//! triples per document. Individual malformed readings are skipped with a
//! warning rather than sinking the whole document; malformed dates and sex
//! values are data noise and parse to None. Only an unparseable top-level
//! payload is an error.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{ExtractedIdentity, ExtractedReading, Sex};

use super::{DocumentExtraction, ExtractionError};

#[derive(Deserialize)]
struct RawPayload {
    patient: Option<RawPatient>,
    #[serde(default)]
    readings: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawPatient {
    name: Option<String>,
    date_of_birth: Option<String>,
    sex: Option<String>,
    collection_date: Option<String>,
}

#[derive(Deserialize)]
struct RawReading {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    collection_date: Option<String>,
}

/// Parse a service payload into a `DocumentExtraction`.
pub fn parse_extraction_payload(
    document_id: Uuid,
    payload: &str,
) -> Result<DocumentExtraction, ExtractionError> {
    let raw: RawPayload =
        serde_json::from_str(payload).map_err(|e| ExtractionError::JsonParsing(e.to_string()))?;

    let identity = raw
        .patient
        .map(|p| parse_identity(&document_id, p))
        .unwrap_or_default();

    let mut readings = Vec::with_capacity(raw.readings.len());
    for item in raw.readings {
        match serde_json::from_value::<RawReading>(item) {
            Ok(reading) => readings.push(ExtractedReading {
                collection_date: parse_date(reading.collection_date.as_deref()),
                name: reading.name,
                value: render_raw_value(&reading.value),
                unit: reading.unit.unwrap_or_default(),
            }),
            Err(e) => {
                tracing::warn!(
                    doc_id = %document_id,
                    error = %e,
                    "Skipping malformed reading in extraction payload"
                );
            }
        }
    }

    Ok(DocumentExtraction {
        document_id,
        identity,
        readings,
    })
}

fn parse_identity(document_id: &Uuid, raw: RawPatient) -> ExtractedIdentity {
    let sex = raw.sex.as_deref().and_then(|s| {
        let parsed = Sex::from_str(s.trim().to_lowercase().as_str()).ok();
        if parsed.is_none() {
            tracing::warn!(doc_id = %document_id, sex = %s, "Unrecognized sex value, treating as absent");
        }
        parsed
    });
    ExtractedIdentity {
        name: raw.name.filter(|n| !n.trim().is_empty()),
        date_of_birth: parse_date(raw.date_of_birth.as_deref()),
        sex,
        collection_date: parse_date(raw.collection_date.as_deref()),
    }
}

/// Parse a `YYYY-MM-DD` date. Anything else is treated as absent.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

/// The service sometimes emits numeric JSON values where a string is
/// expected; keep the reading rather than rejecting the type mismatch.
fn render_raw_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
