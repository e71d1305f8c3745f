// Player name canonicalization.
//
// Two distinct normalizers live here. `normalize_name` is the general one used
// for search, roster filters and association lookups. `normalize_adp_name` is
// looser: it also drops generational suffixes, and is only used to key the
// ADP table.

/// Suffix tokens ignored when matching names against the ADP table.
const ADP_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii"];

/// Canonical form of a display name: lowercase, everything outside
/// `[a-z0-9]` and whitespace removed, whitespace runs collapsed, trimmed.
///
/// Idempotent: `normalize_name(&normalize_name(s)) == normalize_name(s)`.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    collapse_whitespace(&kept)
}

/// ADP lookup key: periods and apostrophes removed, lowercased, and any
/// `Jr`/`Sr`/`II`/`III` token dropped.
///
/// Only tokens are stripped, never substrings, so "Jrue" or "Siiri" survive.
pub fn normalize_adp_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| *c != '.' && *c != '\'')
        .collect::<String>()
        .to_lowercase();
    stripped
        .split_whitespace()
        .filter(|token| !ADP_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when `candidate` contains `query` either verbatim (case-insensitive)
/// or after both sides go through `normalize_name`.
///
/// This is the match rule shared by the player filter, `find_player` and every
/// search surface.
pub fn name_matches(candidate: &str, query: &str) -> bool {
    candidate.to_lowercase().contains(&query.to_lowercase())
        || normalize_name(candidate).contains(&normalize_name(query))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
