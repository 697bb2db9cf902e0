use std::collections::HashMap;

use super::benchmark::BenchmarkDefinition;

/// Case- and accent-insensitive lookup from any registered biomarker name or
/// alias to its canonical name. Backed by a hash map keyed on the normalized
/// string: catalogs carry hundreds of aliases across dozens of languages, so
/// lookup must be O(1) amortized, not a linear scan.
///
/// Rebuilt whenever a taxonomy snapshot is constructed; never mutated after.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    map: HashMap<String, String>,
}

impl AliasIndex {
    /// Build the index over the active entries of a catalog, in order.
    /// On a normalized-key collision the first registration wins.
    pub fn build(entries: &[BenchmarkDefinition]) -> Self {
        let mut map = HashMap::new();
        for def in entries.iter().filter(|d| d.active) {
            register(&mut map, &def.canonical_name, &def.canonical_name);
            for alias in &def.aliases {
                register(&mut map, alias, &def.canonical_name);
            }
        }
        Self { map }
    }

    /// Look up an already-normalized name. Returns the canonical name.
    pub fn lookup(&self, normalized: &str) -> Option<&str> {
        self.map.get(normalized).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn register(map: &mut HashMap<String, String>, name: &str, canonical: &str) {
    let key = normalize_name(name);
    if key.is_empty() {
        return;
    }
    if let Some(existing) = map.get(&key) {
        if existing != canonical {
            tracing::warn!(
                alias = %name,
                kept = %existing,
                ignored = %canonical,
                "Alias registered for more than one benchmark, keeping first"
            );
        }
        return;
    }
    map.insert(key, canonical.to_string());
}

/// Normalize a biomarker name for index lookup: lowercase, strip accents,
/// replace punctuation with spaces, collapse whitespace.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars().flat_map(|c| c.to_lowercase()) {
        let folded = fold_accent(ch);
        match folded {
            Folded::Char(c) if c.is_alphanumeric() => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
            Folded::Str(s) => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push_str(s);
            }
            // Whitespace and punctuation both act as token separators
            _ => pending_space = true,
        }
    }
    out
}

enum Folded {
    Char(char),
    Str(&'static str),
}

fn fold_accent(ch: char) -> Folded {
    let c = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ç' => 'c',
        'ñ' => 'n',
        'ß' => return Folded::Str("ss"),
        'æ' => return Folded::Str("ae"),
        'œ' => return Folded::Str("oe"),
        other => other,
    };
    Folded::Char(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs() -> Vec<BenchmarkDefinition> {
        vec![
            BenchmarkDefinition {
                canonical_name: "Glucose".into(),
                category: "metabolic".into(),
                aliases: vec!["Glycémie".into(), "blood glucose".into()],
                accepted_units: vec![],
                male_range: "3.9-5.6 mmol/L".into(),
                female_range: None,
                active: true,
            },
            BenchmarkDefinition {
                canonical_name: "Creatinine".into(),
                category: "renal".into(),
                aliases: vec!["créatinine".into()],
                accepted_units: vec![],
                male_range: "65-119 µmol/L".into(),
                female_range: None,
                active: false,
            },
        ]
    }

    // ── Normalization ───────────────────────────────────────────────

    #[test]
    fn normalize_lowercases_and_collapses() {
        assert_eq!(normalize_name("  Blood   Glucose "), "blood glucose");
        assert_eq!(normalize_name("HbA1c"), "hba1c");
    }

    #[test]
    fn normalize_strips_accents() {
        assert_eq!(normalize_name("Glycémie"), "glycemie");
        assert_eq!(normalize_name("CRÉATININE"), "creatinine");
        assert_eq!(normalize_name("Hämoglobin"), "hamoglobin");
    }

    #[test]
    fn normalize_treats_punctuation_as_separator() {
        assert_eq!(normalize_name("T4, free"), "t4 free");
        assert_eq!(normalize_name("gamma-GT"), "gamma gt");
        assert_eq!(normalize_name("(TSH)"), "tsh");
    }

    // ── Index behavior ──────────────────────────────────────────────

    #[test]
    fn canonical_and_aliases_resolve() {
        let index = AliasIndex::build(&defs());
        assert_eq!(index.lookup("glucose"), Some("Glucose"));
        assert_eq!(index.lookup("glycemie"), Some("Glucose"));
        assert_eq!(index.lookup("blood glucose"), Some("Glucose"));
    }

    #[test]
    fn inactive_entries_not_indexed() {
        let index = AliasIndex::build(&defs());
        assert_eq!(index.lookup("creatinine"), None);
    }

    #[test]
    fn first_registration_wins_on_collision() {
        let mut entries = defs();
        entries[1].active = true;
        entries[1].aliases = vec!["Glucose".into()]; // collides with entry 0
        let index = AliasIndex::build(&entries);
        assert_eq!(index.lookup("glucose"), Some("Glucose"));
    }

    #[test]
    fn unknown_name_misses() {
        let index = AliasIndex::build(&defs());
        assert_eq!(index.lookup("ferritin"), None);
    }
}
