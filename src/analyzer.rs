//! One-call orchestration of a full analysis run: consolidation, per-visit
//! benchmark matching, and the client-record decision.
//!
//! Each run is a pure transformation over its inputs: the taxonomy
//! snapshot and candidate pool are frozen by the caller, so independent
//! runs can proceed concurrently with no coordination.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze_readings, AnalysisResult};
use crate::client_match::{resolve_client, MatchDecision, MatchError};
use crate::consolidation::consolidate;
use crate::extraction::DocumentExtraction;
use crate::models::{ClientRecord, ConfidenceTier, ConsolidatedIdentity, NormalizedReading, Sex};
use crate::taxonomy::TaxonomySnapshot;

/// Benchmark-shaped results for one collection date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAnalysis {
    pub collection_date: Option<NaiveDate>,
    pub results: Vec<AnalysisResult>,
    pub unmatched: Vec<NormalizedReading>,
}

/// The complete output of one analysis run, in the shape the persistence
/// collaborator consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub identity: ConsolidatedIdentity,
    pub discrepancies: Vec<String>,
    pub confidence: ConfidenceTier,
    pub groups: Vec<GroupAnalysis>,
    pub decision: MatchDecision,
}

/// Run a full analysis over an ordered batch of document extractions.
///
/// The document order is meaningful: it drives every first-seen tie-break
/// in consolidation, so callers must supply a stable order.
pub fn run_analysis(
    documents: &[DocumentExtraction],
    snapshot: &TaxonomySnapshot,
    candidate_pool: &[ClientRecord],
) -> Result<AnalysisRun, MatchError> {
    let outcome = consolidate(documents, snapshot);

    // Benchmark ranges are stored per male/female; an unknown or other sex
    // reads the stored default.
    let sex = outcome.identity.sex.clone().unwrap_or(Sex::Male);

    let groups = outcome
        .groups
        .iter()
        .map(|group| {
            let analysis = analyze_readings(&sex, &group.readings, snapshot);
            GroupAnalysis {
                collection_date: group.collection_date,
                results: analysis.results,
                unmatched: analysis.unmatched,
            }
        })
        .collect();

    let decision = resolve_client(&outcome.identity, candidate_pool)?;

    tracing::info!(
        documents = documents.len(),
        groups = outcome.groups.len(),
        discrepancies = outcome.discrepancies.len(),
        confidence = outcome.confidence.as_str(),
        action = decision.action.as_str(),
        "Analysis run complete"
    );

    Ok(AnalysisRun {
        identity: outcome.identity,
        discrepancies: outcome.discrepancies,
        confidence: outcome.confidence,
        groups,
        decision,
    })
}
