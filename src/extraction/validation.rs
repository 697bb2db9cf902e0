// Post-parse validation for service-extracted readings.
// Applied between parse_extraction_payload() and consolidation.
// Flags/caps implausible extractions that could be hallucinations or
// injection artifacts; warnings are reported data, not failures.

use super::DocumentExtraction;

/// Maximum plausible readings from a single lab report.
const MAX_READINGS: usize = 60;

/// Result of extraction validation: the document (possibly filtered/capped)
/// plus warnings for the caller to surface.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub document: DocumentExtraction,
    pub warnings: Vec<String>,
}

/// Validate one document's extraction for plausibility.
pub fn validate_extraction(mut document: DocumentExtraction) -> ValidationResult {
    let mut warnings = Vec::new();

    if document.readings.len() > MAX_READINGS {
        warnings.push(format!(
            "Excessive readings ({}) capped to {MAX_READINGS}",
            document.readings.len()
        ));
        document.readings.truncate(MAX_READINGS);
    }

    document.readings.retain(|reading| {
        if reading.name.trim().is_empty() {
            warnings.push("Reading with no name removed".to_string());
            return false;
        }
        if contains_injection_pattern(&reading.name) {
            warnings.push(format!(
                "Reading with suspicious name removed: '{}'",
                reading.name
            ));
            return false;
        }
        true
    });

    if !warnings.is_empty() {
        tracing::warn!(
            doc_id = %document.document_id,
            warning_count = warnings.len(),
            "Extraction validation warnings detected"
        );
    }

    ValidationResult { document, warnings }
}

/// Check if text contains prompt injection patterns (for name fields).
fn contains_injection_pattern(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("ignore previous")
        || lower.contains("ignore all")
        || lower.contains("disregard")
        || lower.contains("system:")
        || lower.contains("override")
        || lower.contains("[inst]")
        || lower.contains("<instruction")
        || lower.contains("</document")
}
