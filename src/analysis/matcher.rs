//! Benchmark-shaped analysis of extracted readings.
//!
//! The output is always one `AnalysisResult` per active benchmark, not per
//! reading, so missing biomarkers are explicit. This is the one
//! user-visible correctness guarantee of the system: every known benchmark
//! appears exactly once in every analysis output, measured or not.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{ExtractedReading, NormalizedReading, ReadingStatus, Sex};
use crate::taxonomy::{BenchmarkDefinition, TaxonomySnapshot};

use super::range::{
    conversion_factor, evaluate, normalize_unit, parse_numeric, parse_range_expression,
    render_value, ParsedRange,
};
use super::resolver::NameResolver;

/// Display sentinel for a benchmark with no resolved reading.
pub const NOT_MEASURED: &str = "not measured";

/// Evaluation outcome for one benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub canonical_name: String,
    pub category: String,
    /// Measured value rendered for display; None means not measured.
    pub value: Option<String>,
    pub unit: Option<String>,
    /// Optimal-range expression for the analyzed sex category.
    pub optimal_range: String,
    pub status: ReadingStatus,
    /// Full provenance when a reading resolved to this benchmark.
    pub reading: Option<NormalizedReading>,
}

impl AnalysisResult {
    pub fn display_value(&self) -> &str {
        self.value.as_deref().unwrap_or(NOT_MEASURED)
    }
}

/// Benchmark-shaped results plus the readings nothing matched, preserved
/// for audit rather than silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingAnalysis {
    pub results: Vec<AnalysisResult>,
    pub unmatched: Vec<NormalizedReading>,
}

/// Analyze a list of extracted readings against the active taxonomy for one
/// sex category. Output is stable: sorted by canonical name, deterministic
/// for identical input.
pub fn analyze_readings(
    sex: &Sex,
    readings: &[ExtractedReading],
    snapshot: &TaxonomySnapshot,
) -> ReadingAnalysis {
    let resolver = NameResolver::new(snapshot.alias_index());

    let mut by_canonical: HashMap<String, Vec<(usize, f32)>> = HashMap::new();
    let mut unmatched = Vec::new();
    for (idx, reading) in readings.iter().enumerate() {
        let name_match = resolver.resolve(&reading.name);
        if name_match.is_match() {
            by_canonical
                .entry(name_match.canonical_name)
                .or_default()
                .push((idx, name_match.confidence));
        } else {
            unmatched.push(passthrough_reading(reading, name_match.confidence));
        }
    }

    let mut benchmarks: Vec<&BenchmarkDefinition> = snapshot.active().collect();
    benchmarks.sort_by_key(|d| d.canonical_name.to_lowercase());

    let results = benchmarks
        .into_iter()
        .map(|def| {
            let chosen = by_canonical
                .get(&def.canonical_name)
                .and_then(|candidates| pick_reading(candidates, readings));
            match chosen {
                Some((idx, confidence)) => {
                    evaluate_reading(def, &readings[idx], confidence, sex)
                }
                None => not_measured_result(def, sex),
            }
        })
        .collect();

    ReadingAnalysis { results, unmatched }
}

/// Choose among duplicate readings for one benchmark: a numeric value beats
/// a placeholder, a more recent collection date breaks ties, and the
/// earliest document-order reading wins after that.
fn pick_reading(
    candidates: &[(usize, f32)],
    readings: &[ExtractedReading],
) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32, bool, Option<NaiveDate>)> = None;
    for &(idx, confidence) in candidates {
        let numeric = parse_numeric(&readings[idx].value).is_some();
        let date = readings[idx].collection_date;
        let better = match &best {
            None => true,
            Some((_, _, best_numeric, best_date)) => {
                if numeric != *best_numeric {
                    numeric
                } else {
                    date > *best_date
                }
            }
        };
        if better {
            best = Some((idx, confidence, numeric, date));
        }
    }
    best.map(|(idx, confidence, _, _)| (idx, confidence))
}

fn evaluate_reading(
    def: &BenchmarkDefinition,
    reading: &ExtractedReading,
    match_confidence: f32,
    sex: &Sex,
) -> AnalysisResult {
    let range_expr = def.range_for(sex).to_string();

    let Some(raw_value) = parse_numeric(&reading.value) else {
        // Placeholder values ("N/A", "Pending", "<0.1") are excluded from
        // bound comparison and surface as not measured.
        return AnalysisResult {
            canonical_name: def.canonical_name.clone(),
            category: def.category.clone(),
            value: Some(reading.value.trim().to_string()),
            unit: Some(reading.unit.clone()),
            optimal_range: range_expr,
            status: ReadingStatus::NotMeasured,
            reading: Some(NormalizedReading {
                canonical_name: def.canonical_name.clone(),
                value: None,
                unit: reading.unit.clone(),
                original_name: reading.name.clone(),
                original_value: reading.value.clone(),
                original_unit: reading.unit.clone(),
                match_confidence,
                unit_converted: false,
                is_numeric: false,
            }),
        };
    };

    let segments = parse_range_expression(&range_expr);
    let resolved = resolve_bounds(&def.canonical_name, &reading.unit, &segments);

    let (value, unit, status, converted) = match resolved {
        Some((segment, factor, direct)) => {
            let value = raw_value * factor;
            let unit = if direct {
                reading.unit.clone()
            } else {
                segment.unit_raw.clone()
            };
            (value, unit, evaluate(value, &segment.bounds), !direct)
        }
        // No matching unit and no known conversion: report the reading
        // as-is with an unknown status rather than guessing.
        None => (
            raw_value,
            reading.unit.clone(),
            ReadingStatus::Unknown,
            false,
        ),
    };

    AnalysisResult {
        canonical_name: def.canonical_name.clone(),
        category: def.category.clone(),
        value: Some(render_value(value)),
        unit: Some(unit.clone()),
        optimal_range: range_expr,
        status,
        reading: Some(NormalizedReading {
            canonical_name: def.canonical_name.clone(),
            value: Some(value),
            unit,
            original_name: reading.name.clone(),
            original_value: reading.value.clone(),
            original_unit: reading.unit.clone(),
            match_confidence,
            unit_converted: converted,
            is_numeric: true,
        }),
    }
}

/// Find the range segment a reading can be compared against: first a direct
/// unit match, then any segment reachable through the conversion table.
/// Returns the segment, the multiplier to apply to the reading's value, and
/// whether the match was direct (no conversion).
fn resolve_bounds<'a>(
    canonical_name: &str,
    reading_unit: &str,
    segments: &'a [ParsedRange],
) -> Option<(&'a ParsedRange, f64, bool)> {
    let normalized = normalize_unit(reading_unit);
    if let Some(segment) = segments.iter().find(|s| s.unit == normalized) {
        return Some((segment, 1.0, true));
    }
    for segment in segments {
        if let Some(factor) = conversion_factor(canonical_name, reading_unit, &segment.unit_raw) {
            return Some((segment, factor, false));
        }
    }
    None
}

fn not_measured_result(def: &BenchmarkDefinition, sex: &Sex) -> AnalysisResult {
    AnalysisResult {
        canonical_name: def.canonical_name.clone(),
        category: def.category.clone(),
        value: None,
        unit: None,
        optimal_range: def.range_for(sex).to_string(),
        status: ReadingStatus::NotMeasured,
        reading: None,
    }
}

fn passthrough_reading(reading: &ExtractedReading, confidence: f32) -> NormalizedReading {
    NormalizedReading {
        canonical_name: reading.name.clone(),
        value: parse_numeric(&reading.value),
        unit: reading.unit.clone(),
        original_name: reading.name.clone(),
        original_value: reading.value.clone(),
        original_unit: reading.unit.clone(),
        match_confidence: confidence,
        unit_converted: false,
        is_numeric: parse_numeric(&reading.value).is_some(),
    }
}
