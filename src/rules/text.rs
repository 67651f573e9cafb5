//! Text normalization and name matching.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|e| panic!("Failed to compile regex pattern: {e}"))
});

/// Collapses every whitespace run (newlines included) to a single space and
/// trims both ends.
///
/// OCR engines break lines wherever the layout does, so a name or a number
/// can be split across lines; normalizing first lets the rules see one line.
///
/// ```rust
/// use evidence_verifier::rules::normalize_text;
///
/// assert_eq!(normalize_text("  Total\n\n kills:\t10306  "), "Total kills: 10306");
/// ```
pub fn normalize_text(raw: &str) -> String {
    WHITESPACE_REGEX.replace_all(raw, " ").trim().to_string()
}

/// Case-insensitive substring test of `identity` within `text`.
///
/// Both sides are whitespace-normalized first. An identity that is blank
/// after normalization never matches.
pub fn contains_identity(text: &str, identity: &str) -> bool {
    let needle = normalize_text(identity).to_lowercase();
    if needle.is_empty() {
        return false;
    }
    normalize_text(text).to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize_text("a \n\r\n b\t\tc"), "a b c");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_name_presence_is_case_insensitive() {
        assert!(contains_identity("PLAYER: AERIS lvl 40", "aeris"));
        assert!(contains_identity("player:aerisX", "Aeris"));
        assert!(!contains_identity("player: Aer1s", "Aeris"));
    }

    #[test]
    fn test_name_split_across_lines_matches() {
        assert!(contains_identity("Dark\nKnight 9000", "Dark Knight"));
        assert!(contains_identity("Dark Knight", "Dark   Knight"));
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert!(!contains_identity("", "Aeris"));
        assert!(!contains_identity("Aeris", ""));
        assert!(!contains_identity("Aeris", "   "));
    }
}
