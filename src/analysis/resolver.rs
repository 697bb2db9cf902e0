//! Canonical-name resolution for extracted biomarker names.
//!
//! Resolution is language-independent: the alias index already folds case,
//! accents, and punctuation, so "Glycémie", "GLUCOSE SERIQUE" and
//! "blood glucose" all land on the same canonical entry.

use crate::taxonomy::{normalize_name, AliasIndex};

/// Exact hit on a canonical name or registered alias.
pub const EXACT_CONFIDENCE: f32 = 1.0;
/// Hit after stripping common qualifier tokens.
pub const STRIPPED_CONFIDENCE: f32 = 0.8;
/// No match: the raw name passes through as its own canonical name.
pub const PASSTHROUGH_CONFIDENCE: f32 = 0.3;
/// Below this confidence a result counts as unmatched for display purposes.
pub const MATCH_THRESHOLD: f32 = 0.5;

/// Qualifier tokens that lab reports attach to biomarker names without
/// changing what is being measured.
const STRIP_TOKENS: &[&str] = &["serum", "plasma", "total", "free", "level", "count"];

/// Outcome of resolving one raw name.
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    pub canonical_name: String,
    pub confidence: f32,
}

impl NameMatch {
    /// Whether the resolution cleared the match threshold. Unmatched
    /// readings are preserved for audit but displayed as unrecognized.
    pub fn is_match(&self) -> bool {
        self.confidence >= MATCH_THRESHOLD
    }
}

/// Maps arbitrary extracted biomarker names to canonical taxonomy entries.
pub struct NameResolver<'a> {
    index: &'a AliasIndex,
}

impl<'a> NameResolver<'a> {
    pub fn new(index: &'a AliasIndex) -> Self {
        Self { index }
    }

    /// Resolve a raw name: exact alias hit, then a retry with qualifier
    /// tokens stripped, then passthrough below the match threshold.
    pub fn resolve(&self, raw_name: &str) -> NameMatch {
        let normalized = normalize_name(raw_name);
        if let Some(canonical) = self.index.lookup(&normalized) {
            return NameMatch {
                canonical_name: canonical.to_string(),
                confidence: EXACT_CONFIDENCE,
            };
        }

        let stripped = strip_qualifiers(&normalized);
        if stripped != normalized && !stripped.is_empty() {
            if let Some(canonical) = self.index.lookup(&stripped) {
                return NameMatch {
                    canonical_name: canonical.to_string(),
                    confidence: STRIPPED_CONFIDENCE,
                };
            }
        }

        NameMatch {
            canonical_name: raw_name.to_string(),
            confidence: PASSTHROUGH_CONFIDENCE,
        }
    }
}

/// Drop qualifier tokens from an already-normalized name.
fn strip_qualifiers(normalized: &str) -> String {
    normalized
        .split(' ')
        .filter(|token| !STRIP_TOKENS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}
