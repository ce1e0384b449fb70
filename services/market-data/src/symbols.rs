//! Symbol normalization and common-stock filtering.
//!
//! Universe feeds use SEC/Nasdaq notation (`BRK.B`); the quote provider wants
//! dash-separated class shares (`BRK-B`). Warrants, units, rights and most
//! preferred series rarely have fundamentals, so they are filtered out up
//! front rather than wasting fetch slots on them.

/// Suffixes that mark warrants/units/rights after class-share normalization.
const EXCLUDE_SUFFIXES: [&str; 8] = ["W", "WS", "WT", "WTA", "WTS", "U", "UN", "RT"];

/// Normalize a raw feed symbol into the quote provider's format.
/// Returns an empty string for symbols the provider cannot serve.
pub fn normalize_symbol(sym: &str) -> String {
    let s: String = sym
        .trim()
        .to_uppercase()
        .replace('.', "-")
        .replace(' ', "");
    if s.contains('^') {
        return String::new();
    }
    s
}

/// Heuristic filter keeping common stock and dropping warrants, units,
/// rights and preferred series.
pub fn is_common_stock(sym: &str) -> bool {
    let s = normalize_symbol(sym);
    if s.is_empty() {
        return false;
    }
    let tail = s.rsplit('-').next().unwrap_or("");
    if tail == "R" && s.contains('-') {
        return false;
    }
    if s.contains('-') && EXCLUDE_SUFFIXES.contains(&tail) {
        return false;
    }
    // Preferred series: "-PRA", "-PRB", and short "-PA"/"-PB" style tails
    if s.contains('-') && (tail.starts_with("PR") || (tail.len() <= 3 && tail.starts_with('P'))) {
        return false;
    }
    true
}
