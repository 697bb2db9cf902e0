//! Reference-range parsing, unit normalization, and bound evaluation.
//!
//! Range expressions share one grammar with the benchmark catalog:
//! `"min-max unit"`, dual-unit `"min-max unit1 (min2-max2 unit2)"`, and the
//! unary comparisons `"< max unit"` / `"≤ max unit"` / `"> min unit"` /
//! `"≥ min unit"`. Anything unparseable yields no bounds: an unknown
//! status downstream, never an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ReadingStatus;

/// Numeric bounds of one range segment, in that segment's unit.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBounds {
    /// `min-max`, inclusive on both ends.
    Between { low: f64, high: f64 },
    /// `< max` / `≤ max`.
    AtMost { max: f64, inclusive: bool },
    /// `> min` / `≥ min`.
    AtLeast { min: f64, inclusive: bool },
}

/// One parsed segment of a range expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRange {
    pub bounds: RangeBounds,
    /// Unit text as written in the expression.
    pub unit_raw: String,
    /// Normalized unit, for comparison against a reading's unit.
    pub unit: String,
}

static RE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:[.,]\d+)?)\s*[-–—]\s*(\d+(?:[.,]\d+)?)\s*(.*?)\s*$").unwrap()
});
static RE_UNARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(<=|>=|[<>≤≥])\s*(\d+(?:[.,]\d+)?)\s*(.*?)\s*$").unwrap()
});

/// Parse a full range expression into its segments (primary first, then any
/// parenthesized alternates). Unparseable segments are skipped.
pub fn parse_range_expression(expr: &str) -> Vec<ParsedRange> {
    split_segments(expr)
        .iter()
        .filter_map(|segment| parse_segment(segment))
        .collect()
}

/// Split `"a-b u1 (c-d u2)"` into `["a-b u1", "c-d u2"]`.
fn split_segments(expr: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    for ch in expr.chars() {
        match ch {
            '(' => {
                if depth == 0 {
                    segments.push(std::mem::take(&mut current));
                } else {
                    current.push(ch);
                }
                depth += 1;
            }
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    segments.push(std::mem::take(&mut current));
                } else {
                    current.push(ch);
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        segments.push(current);
    }
    segments.retain(|s| !s.trim().is_empty());
    segments
}

fn parse_segment(segment: &str) -> Option<ParsedRange> {
    if let Some(caps) = RE_SPAN.captures(segment) {
        let low = parse_number(&caps[1])?;
        let high = parse_number(&caps[2])?;
        let unit_raw = caps[3].to_string();
        return Some(ParsedRange {
            bounds: RangeBounds::Between { low, high },
            unit: normalize_unit(&unit_raw),
            unit_raw,
        });
    }
    if let Some(caps) = RE_UNARY.captures(segment) {
        let operator = &caps[1];
        let bound = parse_number(&caps[2])?;
        let unit_raw = caps[3].to_string();
        let bounds = match operator {
            "<" => RangeBounds::AtMost { max: bound, inclusive: false },
            "≤" | "<=" => RangeBounds::AtMost { max: bound, inclusive: true },
            ">" => RangeBounds::AtLeast { min: bound, inclusive: false },
            "≥" | ">=" => RangeBounds::AtLeast { min: bound, inclusive: true },
            _ => return None,
        };
        return Some(ParsedRange {
            bounds,
            unit: normalize_unit(&unit_raw),
            unit_raw,
        });
    }
    None
}

fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', ".").parse::<f64>().ok()
}

/// Parse a raw reading value into a number, if it is one.
///
/// Placeholders ("N/A", "Pending") and censored values ("<0.1") are not
/// numbers and must never be coerced to 0; they return None. A single
/// decimal comma ("5,4") is accepted as the European spelling of "5.4".
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };
    candidate.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize a unit string for comparison: lowercase, strip spaces, fold
/// micro signs and typographic multipliers, so `"×10³/µL"`, `"x10^3/uL"`
/// and `"10^3/ul"` all compare equal.
pub fn normalize_unit(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_superscript = false;
    for ch in raw.trim().chars() {
        if let Some(digit) = superscript_digit(ch) {
            if !in_superscript {
                out.push('^');
                in_superscript = true;
            }
            out.push(digit);
            continue;
        }
        in_superscript = false;
        match ch {
            'µ' | 'μ' => out.push('u'),
            '×' => out.push('x'),
            c if c.is_whitespace() => {}
            c => out.extend(c.to_lowercase()),
        }
    }
    match out.strip_prefix("x10") {
        Some(rest) => format!("10{rest}"),
        None => out,
    }
}

fn superscript_digit(ch: char) -> Option<char> {
    match ch {
        '⁰' => Some('0'),
        '¹' => Some('1'),
        '²' => Some('2'),
        '³' => Some('3'),
        '⁴' => Some('4'),
        '⁵' => Some('5'),
        '⁶' => Some('6'),
        '⁷' => Some('7'),
        '⁸' => Some('8'),
        '⁹' => Some('9'),
        _ => None,
    }
}

/// A known multiplicative conversion between two units of one biomarker.
/// Units are stored in normalized form.
struct UnitConversion {
    canonical: &'static str,
    from: &'static str,
    to: &'static str,
    factor: f64,
}

/// Fixed biomarker-specific conversion table. Deliberately small: only
/// conversions with a single well-known multiplier belong here.
const CONVERSIONS: &[UnitConversion] = &[
    UnitConversion { canonical: "glucose", from: "mmol/l", to: "mg/dl", factor: 18.0 },
    UnitConversion { canonical: "total cholesterol", from: "mmol/l", to: "mg/dl", factor: 38.67 },
    UnitConversion { canonical: "ldl cholesterol", from: "mmol/l", to: "mg/dl", factor: 38.67 },
    UnitConversion { canonical: "hdl cholesterol", from: "mmol/l", to: "mg/dl", factor: 38.67 },
    UnitConversion { canonical: "triglycerides", from: "mmol/l", to: "mg/dl", factor: 88.57 },
    UnitConversion { canonical: "creatinine", from: "mg/dl", to: "umol/l", factor: 88.4 },
    UnitConversion { canonical: "urea", from: "mmol/l", to: "mg/dl", factor: 2.8 },
    UnitConversion { canonical: "calcium", from: "mmol/l", to: "mg/dl", factor: 4.008 },
    UnitConversion { canonical: "total bilirubin", from: "mg/dl", to: "umol/l", factor: 17.1 },
    UnitConversion { canonical: "white blood cells", from: "cells/ul", to: "10^3/ul", factor: 0.001 },
    UnitConversion { canonical: "white blood cells", from: "10^9/l", to: "10^3/ul", factor: 1.0 },
    UnitConversion { canonical: "platelets", from: "cells/ul", to: "10^3/ul", factor: 0.001 },
    UnitConversion { canonical: "platelets", from: "10^9/l", to: "10^3/ul", factor: 1.0 },
    UnitConversion { canonical: "red blood cells", from: "10^12/l", to: "10^6/ul", factor: 1.0 },
    UnitConversion { canonical: "hemoglobin", from: "g/l", to: "g/dl", factor: 0.1 },
    UnitConversion { canonical: "albumin", from: "g/dl", to: "g/l", factor: 10.0 },
    UnitConversion { canonical: "vitamin d", from: "ng/ml", to: "nmol/l", factor: 2.5 },
    UnitConversion { canonical: "vitamin b12", from: "pg/ml", to: "pmol/l", factor: 0.738 },
    UnitConversion { canonical: "ferritin", from: "ug/l", to: "ng/ml", factor: 1.0 },
];

/// Look up the multiplier converting `from_unit` to `to_unit` for the given
/// canonical biomarker name. The table is consulted in both directions;
/// identical units convert with factor 1.
pub fn conversion_factor(canonical_name: &str, from_unit: &str, to_unit: &str) -> Option<f64> {
    let canonical = canonical_name.to_lowercase();
    let from = normalize_unit(from_unit);
    let to = normalize_unit(to_unit);
    if from == to {
        return Some(1.0);
    }
    for conv in CONVERSIONS {
        if conv.canonical == canonical {
            if conv.from == from && conv.to == to {
                return Some(conv.factor);
            }
            if conv.from == to && conv.to == from {
                return Some(1.0 / conv.factor);
            }
        }
    }
    None
}

/// Evaluate a numeric value against resolved bounds.
pub fn evaluate(value: f64, bounds: &RangeBounds) -> ReadingStatus {
    match *bounds {
        RangeBounds::Between { low, high } => {
            if value < low {
                ReadingStatus::BelowRange
            } else if value > high {
                ReadingStatus::AboveRange
            } else {
                ReadingStatus::InRange
            }
        }
        RangeBounds::AtMost { max, inclusive } => {
            let within = if inclusive { value <= max } else { value < max };
            if within {
                ReadingStatus::InRange
            } else {
                ReadingStatus::AboveRange
            }
        }
        RangeBounds::AtLeast { min, inclusive } => {
            let within = if inclusive { value >= min } else { value > min };
            if within {
                ReadingStatus::InRange
            } else {
                ReadingStatus::BelowRange
            }
        }
    }
}

/// Render a numeric value for display, trimming float noise from unit
/// conversions (93.60000000000001 → "93.6").
pub fn render_value(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    format!("{rounded}")
}
