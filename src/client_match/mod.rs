//! Fuzzy client-identity resolution: weighted multi-attribute matching of a
//! consolidated identity against a bounded pool of existing client records.
//!
//! The caller bounds the pool (e.g. via an upstream name search); this
//! module only scores and decides. Scoring is explainable on purpose: a
//! fixed weight per attribute, with a null field on either side removing
//! that weight from both numerator and denominator, so absence is not a
//! mismatch.

pub mod similarity;

pub use similarity::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ClientRecord, ConfidenceTier, ConsolidatedIdentity, SuggestedAction};

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Client record {id} is missing its identity key (blank name)")]
    MissingIdentityKey { id: Uuid },
}

/// Weight of name similarity in the overall score.
const NAME_WEIGHT: f64 = 3.0;
/// Weight of an exact date-of-birth match.
const DOB_WEIGHT: f64 = 3.0;
/// Weight of an exact sex match.
const SEX_WEIGHT: f64 = 1.0;

/// At or above this confidence an existing record is reused without asking.
const AUTO_MATCH_THRESHOLD: f64 = 0.85;
/// At or above this confidence an existing record is suggested for review.
const REVIEW_THRESHOLD: f64 = 0.65;
/// Two candidates this close above the review threshold need a human.
const AMBIGUITY_MARGIN: f64 = 0.05;

/// The decision for one analysis run. Computed fresh every run, never
/// persisted.
///
/// `confidence` and `tier` describe the decision, not always the match:
/// a create-new decision carries high confidence that a *new* record is
/// warranted, which is distinct from match quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDecision {
    pub client_id: Option<Uuid>,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub requires_confirmation: bool,
    pub action: SuggestedAction,
}

/// Score one candidate against the consolidated identity.
///
/// Name similarity earns up to 3 points (≥0.9 → 3, ≥0.7 → 2, ≥0.5 → 1),
/// an exact date-of-birth match 3, an exact sex match 1; the result is
/// earned points over the weight that was actually available on both sides.
fn score_candidate(identity: &ConsolidatedIdentity, candidate: &ClientRecord) -> f64 {
    let mut earned = 0.0;
    let mut possible = 0.0;

    if let Some(name) = &identity.name {
        possible += NAME_WEIGHT;
        earned += match name_similarity(name, &candidate.name) {
            s if s >= 0.9 => 3.0,
            s if s >= 0.7 => 2.0,
            s if s >= 0.5 => 1.0,
            _ => 0.0,
        };
    }

    if let (Some(a), Some(b)) = (identity.date_of_birth, candidate.date_of_birth) {
        possible += DOB_WEIGHT;
        if a == b {
            earned += DOB_WEIGHT;
        }
    }

    if let (Some(a), Some(b)) = (&identity.sex, &candidate.sex) {
        possible += SEX_WEIGHT;
        if a == b {
            earned += SEX_WEIGHT;
        }
    }

    if possible == 0.0 {
        0.0
    } else {
        earned / possible
    }
}

/// Decide whether the consolidated identity belongs to a record in the
/// candidate pool.
///
/// A record with a blank name is a caller contract violation, not data
/// noise, and fails immediately.
pub fn resolve_client(
    identity: &ConsolidatedIdentity,
    pool: &[ClientRecord],
) -> Result<MatchDecision, MatchError> {
    for candidate in pool {
        if candidate.name.trim().is_empty() {
            return Err(MatchError::MissingIdentityKey { id: candidate.id });
        }
    }

    let mut scored: Vec<(f64, &ClientRecord)> = pool
        .iter()
        .map(|candidate| (score_candidate(identity, candidate), candidate))
        .collect();
    // Stable sort: equal scores keep pool order, so the earliest candidate
    // wins deterministic ties.
    scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let qualifying: Vec<&(f64, &ClientRecord)> = scored
        .iter()
        .take_while(|(score, _)| *score >= REVIEW_THRESHOLD)
        .collect();

    let decision = match qualifying.as_slice() {
        [] => {
            // Nothing clears the review threshold: the system is confident
            // a new record is warranted.
            MatchDecision {
                client_id: None,
                confidence: scored.first().map(|(s, _)| *s).unwrap_or(0.0),
                tier: ConfidenceTier::High,
                requires_confirmation: true,
                action: SuggestedAction::CreateNew,
            }
        }
        [(best_score, best), rest @ ..] => {
            let ambiguous = rest
                .first()
                .is_some_and(|(second, _)| best_score - second < AMBIGUITY_MARGIN);
            if ambiguous {
                tracing::warn!(
                    best = %best.id,
                    score = best_score,
                    qualifying = qualifying.len(),
                    "Multiple near-equal client candidates, deferring to manual selection"
                );
                MatchDecision {
                    client_id: Some(best.id),
                    confidence: *best_score,
                    tier: ConfidenceTier::Medium,
                    requires_confirmation: true,
                    action: SuggestedAction::ManualSelect,
                }
            } else if *best_score >= AUTO_MATCH_THRESHOLD {
                MatchDecision {
                    client_id: Some(best.id),
                    confidence: *best_score,
                    tier: ConfidenceTier::High,
                    requires_confirmation: false,
                    action: SuggestedAction::ReuseExisting,
                }
            } else {
                MatchDecision {
                    client_id: Some(best.id),
                    confidence: *best_score,
                    tier: ConfidenceTier::Medium,
                    requires_confirmation: true,
                    action: SuggestedAction::ReuseExisting,
                }
            }
        }
    };

    Ok(decision)
}
