use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw biomarker reading as returned by the document-understanding
/// service for a single source document. The value is kept as a string:
/// extractions routinely contain placeholders ("N/A", "Pending") or
/// censored values ("<0.1") that must not be coerced to a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReading {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub collection_date: Option<NaiveDate>,
}

/// A reading after canonical-name resolution and unit normalization,
/// with full provenance back to the raw extraction.
///
/// `canonical_name` is either a taxonomy canonical name or, when no match
/// cleared the resolver threshold, the passthrough of the raw name; an
/// unresolvable reading is preserved for audit, never dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedReading {
    pub canonical_name: String,
    /// Parsed numeric value, after unit conversion if one was applied.
    pub value: Option<f64>,
    /// Unit the value is expressed in after normalization.
    pub unit: String,
    pub original_name: String,
    pub original_value: String,
    pub original_unit: String,
    /// Name-resolution confidence in [0, 1].
    pub match_confidence: f32,
    pub unit_converted: bool,
    pub is_numeric: bool,
}
