pub mod parser;
pub mod validation;

pub use parser::*;
pub use validation::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ExtractedIdentity, ExtractedReading};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction service error: {0}")]
    Service(String),

    #[error("Malformed extraction payload: {0}")]
    MalformedPayload(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),
}

/// Everything the document-understanding service extracted from one source
/// document: the patient-identity quadruple and the raw reading triples.
/// Immutable once built; lives only for the duration of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub document_id: Uuid,
    pub identity: ExtractedIdentity,
    pub readings: Vec<ExtractedReading>,
}

/// Document-understanding service abstraction (allows mocking).
///
/// The service call itself (batching, retries, rate limits, prompt
/// engineering) is owned by the caller; this core only defines the shape
/// that crosses the boundary.
pub trait ExtractionClient {
    fn extract_document(
        &self,
        document_id: &Uuid,
        raw_text: &str,
    ) -> Result<DocumentExtraction, ExtractionError>;
}
