use std::path::Path;

use super::alias_index::AliasIndex;
use super::benchmark::BenchmarkDefinition;
use super::TaxonomyError;

/// Bundled default catalog, seeded once at build time.
const BUNDLED_CATALOG: &str = include_str!("../../resources/benchmarks.json");

/// An immutable, per-run view of the benchmark taxonomy.
///
/// Analysis runs never read a live, mutable catalog: per-tenant overrides are
/// merged into a snapshot once, before the run starts, so every lookup within
/// a run sees the same data. Entry order is preserved from the seed catalog
/// (overrides replace in place, new entries append).
#[derive(Debug, Clone)]
pub struct TaxonomySnapshot {
    entries: Vec<BenchmarkDefinition>,
    index: AliasIndex,
}

impl TaxonomySnapshot {
    /// Build a snapshot from an ordered list of definitions.
    ///
    /// An empty list or a duplicated canonical name is a caller contract
    /// violation, not noisy data, and fails immediately.
    pub fn from_entries(entries: Vec<BenchmarkDefinition>) -> Result<Self, TaxonomyError> {
        if entries.is_empty() {
            return Err(TaxonomyError::EmptyTaxonomy);
        }
        for (i, def) in entries.iter().enumerate() {
            if entries[..i]
                .iter()
                .any(|other| other.canonical_name == def.canonical_name)
            {
                return Err(TaxonomyError::DuplicateCanonicalName(
                    def.canonical_name.clone(),
                ));
            }
        }
        let index = AliasIndex::build(&entries);
        Ok(Self { entries, index })
    }

    /// Load the bundled default catalog.
    pub fn bundled() -> Result<Self, TaxonomyError> {
        let entries: Vec<BenchmarkDefinition> = serde_json::from_str(BUNDLED_CATALOG)
            .map_err(|e| TaxonomyError::CatalogParse("benchmarks.json".into(), e.to_string()))?;
        Self::from_entries(entries)
    }

    /// Load a catalog from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| TaxonomyError::CatalogLoad(path.display().to_string(), e.to_string()))?;
        let entries: Vec<BenchmarkDefinition> = serde_json::from_str(&json).map_err(|e| {
            TaxonomyError::CatalogParse(path.display().to_string(), e.to_string())
        })?;
        Self::from_entries(entries)
    }

    /// Merge user-authored overrides into a new snapshot.
    ///
    /// An override replaces the entry with the exact same canonical name
    /// (position preserved); a new canonical name appends. The original
    /// snapshot and the bundled default are left untouched.
    pub fn with_overrides(
        &self,
        overrides: Vec<BenchmarkDefinition>,
    ) -> Result<Self, TaxonomyError> {
        let mut merged = self.entries.clone();
        for def in overrides {
            match merged
                .iter()
                .position(|e| e.canonical_name == def.canonical_name)
            {
                Some(pos) => merged[pos] = def,
                None => merged.push(def),
            }
        }
        Self::from_entries(merged)
    }

    /// All entries, active or not, in seed order.
    pub fn entries(&self) -> &[BenchmarkDefinition] {
        &self.entries
    }

    /// Active entries in seed order.
    pub fn active(&self) -> impl Iterator<Item = &BenchmarkDefinition> {
        self.entries.iter().filter(|d| d.active)
    }

    /// Exact-canonical-name lookup.
    pub fn get(&self, canonical_name: &str) -> Option<&BenchmarkDefinition> {
        self.entries
            .iter()
            .find(|d| d.canonical_name == canonical_name)
    }

    pub fn alias_index(&self) -> &AliasIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
