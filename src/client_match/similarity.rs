//! Person-name similarity for client matching.
//!
//! Names are normalized (case-folded, stripped of non-letters, tokens
//! sorted alphabetically) before comparison, so "Smith John" and
//! "John Smith" are identical, then scored with a Levenshtein ratio.

/// Normalize a person name for comparison: case-fold, keep letters only,
/// collapse whitespace, sort the tokens alphabetically.
pub fn normalize_person_name(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars().flat_map(|c| c.to_lowercase()) {
        if ch.is_alphabetic() {
            cleaned.push(ch);
        } else {
            cleaned.push(' ');
        }
    }
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity in [0, 1] between two raw names:
/// `1 - editDistance(a, b) / max(len(a), len(b))` over normalized forms.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_person_name(a);
    let b = normalize_person_name(b);
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    1.0 - edit_distance(&a, &b) as f64 / longest as f64
}

/// Compute Levenshtein edit distance between two strings.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, &a_ch) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
