use serde::{Deserialize, Serialize};

use crate::models::Sex;

/// One canonical biomarker entry in the benchmark catalog.
///
/// The canonical name is the unique join key between extracted readings and
/// reference ranges. Aliases carry alternate spellings and languages; range
/// expressions use the same grammar the range parser consumes (`"3.9-5.6
/// mmol/L (70-100 mg/dL)"`, `"< 130 mg/dL"`), so catalog and parser share
/// one format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkDefinition {
    pub canonical_name: String,
    pub category: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub accepted_units: Vec<String>,
    pub male_range: String,
    /// Missing female range falls back to the male range at read time.
    /// The stored default is never mutated.
    #[serde(default)]
    pub female_range: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl BenchmarkDefinition {
    /// Optimal-range expression for the given sex category.
    /// `Other` and missing female ranges read the male (stored default) range.
    pub fn range_for(&self, sex: &Sex) -> &str {
        match sex {
            Sex::Female => self.female_range.as_deref().unwrap_or(&self.male_range),
            _ => &self.male_range,
        }
    }
}
