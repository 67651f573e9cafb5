//! Numeric extraction from noisy OCR text.
//!
//! Kill-count screenshots show several numbers: a per-session figure, levels,
//! timestamps. Runs shorter than the configured minimum are discarded as UI
//! chrome, and the largest remaining run is taken as the cumulative total.
//! This is a heuristic: a stray larger number (a resolution, a year) wins.

use once_cell::sync::Lazy;
use regex::Regex;

use super::text::normalize_text;

static DIGIT_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+").unwrap_or_else(|e| panic!("Failed to compile regex pattern: {e}"))
});

/// Returns every maximal ASCII digit run of at least `min_len` digits, in
/// reading order.
///
/// Separators such as commas break a run, so `"12,345"` yields only `345`
/// with the default minimum of three, never `12345`. Runs too long for `u64`
/// saturate at `u64::MAX`.
///
/// ```rust
/// use evidence_verifier::rules::extract_digit_runs;
///
/// assert_eq!(extract_digit_runs("Aeris 998 10306", 3), vec![998, 10306]);
/// assert_eq!(extract_digit_runs("ab123cd", 3), vec![123]);
/// assert_eq!(extract_digit_runs("12,345", 3), vec![345]);
/// ```
pub fn extract_digit_runs(text: &str, min_len: usize) -> Vec<u64> {
    let normalized = normalize_text(text);
    DIGIT_RUN_REGEX
        .find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|run| run.len() >= min_len)
        .map(|run| run.parse::<u64>().unwrap_or(u64::MAX))
        .collect()
}

/// Picks the kill count: the largest qualifying run, or 0 when there is none.
pub fn extract_kill_count(runs: &[u64]) -> u64 {
    runs.iter().copied().max().unwrap_or(0)
}
