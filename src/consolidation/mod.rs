//! Multi-document consolidation: N per-document extractions in, one
//! patient identity and one date-grouped reading set out.
//!
//! Documents are processed in the caller-supplied order; every tie-break is
//! "earliest document first", so the same input always produces the same
//! output. Conflicts are never silently resolved: each identity field that
//! varied across documents appends a human-readable discrepancy entry, and
//! the overall confidence tier is derived from the discrepancy count: a
//! deliberately coarse, explainable rule.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{parse_numeric, NameResolver};
use crate::extraction::DocumentExtraction;
use crate::models::{ConfidenceTier, ConsolidatedIdentity, ExtractedReading};
use crate::taxonomy::{normalize_name, TaxonomySnapshot};

/// Readings that share one collection date. Documents with no discernible
/// date land in the sentinel `collection_date: None` bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateGroup {
    pub collection_date: Option<NaiveDate>,
    pub readings: Vec<ExtractedReading>,
}

/// Everything one consolidation pass produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationOutcome {
    pub identity: ConsolidatedIdentity,
    pub groups: Vec<DateGroup>,
    pub discrepancies: Vec<String>,
    pub confidence: ConfidenceTier,
}

/// Consolidate an ordered batch of document extractions.
pub fn consolidate(
    documents: &[DocumentExtraction],
    snapshot: &TaxonomySnapshot,
) -> ConsolidationOutcome {
    let mut discrepancies = Vec::new();

    let names: Vec<&str> = documents
        .iter()
        .filter_map(|d| d.identity.name.as_deref())
        .collect();
    let name = majority_index(&names, |n| n.to_lowercase()).map(|(idx, distinct)| {
        let chosen = title_case(names[idx]);
        if distinct > 1 {
            discrepancies.push(format!(
                "patient name: {distinct} variants found, chose '{chosen}'"
            ));
        }
        chosen
    });

    let birth_dates: Vec<NaiveDate> = documents
        .iter()
        .filter_map(|d| d.identity.date_of_birth)
        .collect();
    let date_of_birth = majority_index(&birth_dates, |d| *d).map(|(idx, distinct)| {
        if distinct > 1 {
            discrepancies.push(format!(
                "date of birth: {distinct} variants found, chose '{}'",
                birth_dates[idx]
            ));
        }
        birth_dates[idx]
    });

    let sexes: Vec<_> = documents
        .iter()
        .filter_map(|d| d.identity.sex.clone())
        .collect();
    let sex = majority_index(&sexes, |s| s.clone()).map(|(idx, distinct)| {
        if distinct > 1 {
            discrepancies.push(format!(
                "sex: {distinct} variants found, chose '{}'",
                sexes[idx].as_str()
            ));
        }
        sexes[idx].clone()
    });

    // Collection date is the most recent valid date, not the most common:
    // several real lab visits in one batch are expected, not noise.
    let collection_date = documents
        .iter()
        .filter_map(|d| d.identity.collection_date)
        .max();

    if !discrepancies.is_empty() {
        tracing::warn!(
            documents = documents.len(),
            discrepancy_count = discrepancies.len(),
            "Identity fields varied across documents"
        );
    }

    let confidence = tier_for(discrepancies.len());

    ConsolidationOutcome {
        identity: ConsolidatedIdentity {
            name,
            date_of_birth,
            sex,
            collection_date,
        },
        groups: group_readings(documents, snapshot),
        discrepancies,
        confidence,
    }
}

/// Majority vote over normalized values: returns the index of the winning
/// value (the first-seen occurrence of the most common normalized form) and
/// the number of distinct normalized forms observed.
fn majority_index<T, K: PartialEq>(
    values: &[T],
    key: impl Fn(&T) -> K,
) -> Option<(usize, usize)> {
    let mut tally: Vec<(K, usize, usize)> = Vec::new(); // (key, count, first index)
    for (idx, value) in values.iter().enumerate() {
        let k = key(value);
        match tally.iter().position(|(existing, _, _)| *existing == k) {
            Some(pos) => tally[pos].1 += 1,
            None => tally.push((k, 1, idx)),
        }
    }
    let distinct = tally.len();
    // Ties go to the earliest-seen value: strict > keeps the first maximum.
    let winner = tally
        .into_iter()
        .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })?;
    Some((winner.2, distinct))
}

/// Re-render a chosen name in title case ("john SMITH" → "John Smith").
fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut boundary = true;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '\'' {
            boundary = true;
            out.push(ch);
        } else if boundary {
            out.extend(ch.to_uppercase());
            boundary = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

fn tier_for(discrepancy_count: usize) -> ConfidenceTier {
    match discrepancy_count {
        0 => ConfidenceTier::High,
        1 | 2 => ConfidenceTier::Medium,
        _ => ConfidenceTier::Low,
    }
}

/// Group readings by their per-document collection date (not the single
/// consolidated "most recent" value) so genuinely distinct lab visits
/// produce separate result sets downstream. Within a group, readings that
/// resolve to the same canonical name collapse to one entry, preferring a
/// numeric value over a placeholder.
fn group_readings(
    documents: &[DocumentExtraction],
    snapshot: &TaxonomySnapshot,
) -> Vec<DateGroup> {
    let resolver = NameResolver::new(snapshot.alias_index());
    let mut groups: Vec<(Option<NaiveDate>, Vec<(String, ExtractedReading)>)> = Vec::new();

    for document in documents {
        for reading in &document.readings {
            let date = reading
                .collection_date
                .or(document.identity.collection_date);
            let key = dedup_key(&resolver, &reading.name);

            let group_idx = match groups.iter().position(|(d, _)| *d == date) {
                Some(idx) => idx,
                None => {
                    groups.push((date, Vec::new()));
                    groups.len() - 1
                }
            };
            let entries = &mut groups[group_idx].1;

            match entries.iter().position(|(k, _)| *k == key) {
                Some(pos) => {
                    let existing = &mut entries[pos].1;
                    let existing_numeric = parse_numeric(&existing.value).is_some();
                    let incoming_numeric = parse_numeric(&reading.value).is_some();
                    if incoming_numeric && !existing_numeric {
                        *existing = reading.clone();
                    } else if incoming_numeric && existing.value != reading.value {
                        tracing::warn!(
                            biomarker = %key,
                            kept = %existing.value,
                            dropped = %reading.value,
                            "Conflicting duplicate reading in one date group, keeping first"
                        );
                    }
                }
                None => entries.push((key, reading.clone())),
            }
        }
    }

    // Most recent visit first; the no-date bucket sorts last.
    groups.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    groups
        .into_iter()
        .map(|(collection_date, entries)| DateGroup {
            collection_date,
            readings: entries.into_iter().map(|(_, r)| r).collect(),
        })
        .collect()
}

/// Canonical dedup key for a reading name: the taxonomy canonical name when
/// the resolver matches, the normalized raw name otherwise.
fn dedup_key(resolver: &NameResolver<'_>, raw_name: &str) -> String {
    let name_match = resolver.resolve(raw_name);
    if name_match.is_match() {
        name_match.canonical_name
    } else {
        normalize_name(raw_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractedIdentity, Sex};
    use uuid::Uuid;

    fn snapshot() -> TaxonomySnapshot {
        TaxonomySnapshot::bundled().unwrap()
    }

    fn date(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    fn doc(name: Option<&str>, collection: Option<&str>) -> DocumentExtraction {
        DocumentExtraction {
            document_id: Uuid::new_v4(),
            identity: ExtractedIdentity {
                name: name.map(Into::into),
                date_of_birth: None,
                sex: None,
                collection_date: collection.and_then(date),
            },
            readings: vec![],
        }
    }

    fn reading(name: &str, value: &str, collection: Option<&str>) -> ExtractedReading {
        ExtractedReading {
            name: name.into(),
            value: value.into(),
            unit: "mmol/L".into(),
            collection_date: collection.and_then(date),
        }
    }

    // ── Identity majority rule ──────────────────────────────────────

    #[test]
    fn majority_name_wins_and_discrepancy_recorded() {
        let documents = vec![
            doc(Some("Jon Smith"), None),
            doc(Some("John Smith"), None),
            doc(Some("John Smith"), None),
        ];
        let outcome = consolidate(&documents, &snapshot());
        assert_eq!(outcome.identity.name.as_deref(), Some("John Smith"));
        assert_eq!(outcome.discrepancies.len(), 1);
        assert!(
            outcome.discrepancies[0].contains("2 variants"),
            "got: {}",
            outcome.discrepancies[0]
        );
        assert_eq!(outcome.confidence, ConfidenceTier::Medium);
    }

    #[test]
    fn name_comparison_is_case_insensitive() {
        let documents = vec![
            doc(Some("john smith"), None),
            doc(Some("JOHN SMITH"), None),
        ];
        let outcome = consolidate(&documents, &snapshot());
        // One normalized variant, re-rendered in title case, no discrepancy
        assert_eq!(outcome.identity.name.as_deref(), Some("John Smith"));
        assert!(outcome.discrepancies.is_empty());
        assert_eq!(outcome.confidence, ConfidenceTier::High);
    }

    #[test]
    fn tie_broken_by_first_seen_order() {
        let documents = vec![
            doc(Some("Marie Dupont"), None),
            doc(Some("Maria Dupont"), None),
        ];
        let outcome = consolidate(&documents, &snapshot());
        assert_eq!(outcome.identity.name.as_deref(), Some("Marie Dupont"));
    }

    #[test]
    fn null_fields_do_not_vote() {
        let documents = vec![
            doc(None, None),
            doc(Some("John Smith"), None),
            doc(None, None),
        ];
        let outcome = consolidate(&documents, &snapshot());
        assert_eq!(outcome.identity.name.as_deref(), Some("John Smith"));
        assert!(outcome.discrepancies.is_empty());
    }

    #[test]
    fn sex_and_birth_date_consolidate_independently() {
        let mut a = doc(Some("John Smith"), None);
        a.identity.sex = Some(Sex::Male);
        a.identity.date_of_birth = date("1970-01-01");
        let mut b = doc(Some("John Smith"), None);
        b.identity.sex = Some(Sex::Female);
        b.identity.date_of_birth = date("1970-01-01");
        let mut c = doc(Some("John Smith"), None);
        c.identity.sex = Some(Sex::Male);
        c.identity.date_of_birth = date("1970-01-01");

        let outcome = consolidate(&[a, b, c], &snapshot());
        assert_eq!(outcome.identity.sex, Some(Sex::Male));
        assert_eq!(outcome.identity.date_of_birth, date("1970-01-01"));
        assert_eq!(outcome.discrepancies.len(), 1);
        assert!(outcome.discrepancies[0].starts_with("sex:"));
    }

    // ── Collection date ─────────────────────────────────────────────

    #[test]
    fn most_recent_collection_date_selected() {
        let documents = vec![
            doc(Some("John Smith"), Some("2024-01-10")),
            doc(Some("John Smith"), Some("2024-03-01")),
        ];
        let outcome = consolidate(&documents, &snapshot());
        assert_eq!(outcome.identity.collection_date, date("2024-03-01"));
    }

    #[test]
    fn distinct_visit_dates_produce_separate_buckets() {
        let mut a = doc(Some("John Smith"), Some("2024-01-10"));
        a.readings.push(reading("Glucose", "5.0", None));
        let mut b = doc(Some("John Smith"), Some("2024-03-01"));
        b.readings.push(reading("Glucose", "5.4", None));

        let outcome = consolidate(&[a, b], &snapshot());
        assert_eq!(outcome.identity.collection_date, date("2024-03-01"));
        assert_eq!(outcome.groups.len(), 2);
        // Most recent visit first
        assert_eq!(outcome.groups[0].collection_date, date("2024-03-01"));
        assert_eq!(outcome.groups[1].collection_date, date("2024-01-10"));
        assert_eq!(outcome.groups[0].readings[0].value, "5.4");
    }

    #[test]
    fn undated_documents_group_under_sentinel_bucket() {
        let mut a = doc(Some("John Smith"), Some("2024-03-01"));
        a.readings.push(reading("Glucose", "5.0", None));
        let mut b = doc(Some("John Smith"), None);
        b.readings.push(reading("TSH", "2.1", None));

        let outcome = consolidate(&[a, b], &snapshot());
        assert_eq!(outcome.groups.len(), 2);
        assert!(outcome.groups[1].collection_date.is_none());
        assert_eq!(outcome.groups[1].readings[0].name, "TSH");
    }

    #[test]
    fn reading_level_date_overrides_document_date() {
        let mut a = doc(Some("John Smith"), Some("2024-03-01"));
        a.readings.push(reading("Glucose", "5.0", Some("2024-02-15")));
        let outcome = consolidate(&[a], &snapshot());
        assert_eq!(outcome.groups[0].collection_date, date("2024-02-15"));
    }

    // ── Reading dedup ───────────────────────────────────────────────

    #[test]
    fn duplicate_canonical_names_collapse_within_group() {
        let mut a = doc(Some("John Smith"), Some("2024-03-01"));
        a.readings.push(reading("Glucose", "5.0", None));
        let mut b = doc(Some("John Smith"), Some("2024-03-01"));
        // Same biomarker, different language
        b.readings.push(reading("Glycémie", "5.0", None));

        let outcome = consolidate(&[a, b], &snapshot());
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].readings.len(), 1);
    }

    #[test]
    fn numeric_value_preferred_over_placeholder_in_dedup() {
        let mut a = doc(Some("John Smith"), Some("2024-03-01"));
        a.readings.push(reading("Glucose", "N/A", None));
        let mut b = doc(Some("John Smith"), Some("2024-03-01"));
        b.readings.push(reading("Glucose", "5.2", None));

        let outcome = consolidate(&[a, b], &snapshot());
        assert_eq!(outcome.groups[0].readings.len(), 1);
        assert_eq!(outcome.groups[0].readings[0].value, "5.2");
    }

    #[test]
    fn first_numeric_value_kept_on_conflict() {
        let mut a = doc(Some("John Smith"), Some("2024-03-01"));
        a.readings.push(reading("Glucose", "5.2", None));
        let mut b = doc(Some("John Smith"), Some("2024-03-01"));
        b.readings.push(reading("Glucose", "6.8", None));

        let outcome = consolidate(&[a, b], &snapshot());
        assert_eq!(outcome.groups[0].readings[0].value, "5.2");
    }

    #[test]
    fn unmatched_names_dedup_on_normalized_raw_name() {
        let mut a = doc(Some("John Smith"), Some("2024-03-01"));
        a.readings.push(reading("Mystery Enzyme", "N/A", None));
        let mut b = doc(Some("John Smith"), Some("2024-03-01"));
        b.readings.push(reading("MYSTERY ENZYME", "42", None));

        let outcome = consolidate(&[a, b], &snapshot());
        assert_eq!(outcome.groups[0].readings.len(), 1);
        assert_eq!(outcome.groups[0].readings[0].value, "42");
    }

    // ── Confidence tier ─────────────────────────────────────────────

    #[test]
    fn tier_thresholds() {
        assert_eq!(tier_for(0), ConfidenceTier::High);
        assert_eq!(tier_for(1), ConfidenceTier::Medium);
        assert_eq!(tier_for(2), ConfidenceTier::Medium);
        assert_eq!(tier_for(3), ConfidenceTier::Low);
        assert_eq!(tier_for(7), ConfidenceTier::Low);
    }

    // ── Determinism ─────────────────────────────────────────────────

    #[test]
    fn identical_input_produces_identical_output() {
        let make = || {
            let mut a = doc(Some("Jon Smith"), Some("2024-01-10"));
            a.readings.push(reading("Glucose", "5.0", None));
            let mut b = doc(Some("John Smith"), Some("2024-03-01"));
            b.readings.push(reading("Glycémie", "5.4", None));
            vec![a, b]
        };
        let snapshot = snapshot();
        let first = consolidate(&make(), &snapshot);
        let second = consolidate(&make(), &snapshot);
        assert_eq!(first.identity, second.identity);
        assert_eq!(first.groups, second.groups);
        assert_eq!(first.discrepancies, second.discrepancies);
    }

    #[test]
    fn empty_batch_consolidates_to_empty_identity() {
        let outcome = consolidate(&[], &snapshot());
        assert!(outcome.identity.name.is_none());
        assert!(outcome.groups.is_empty());
        assert!(outcome.discrepancies.is_empty());
        assert_eq!(outcome.confidence, ConfidenceTier::High);
    }
}
