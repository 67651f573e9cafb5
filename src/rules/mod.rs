//! Verification rules applied to recognized text.
//!
//! Everything in this module is pure and synchronous:
//!
//! * [`text`] - whitespace normalization and case-insensitive name presence
//! * [`numeric`] - digit-run extraction and kill-count selection
//! * [`engine`] - per-stage evaluation producing typed outcomes

pub mod engine;
pub mod numeric;
pub mod text;

pub use engine::RuleEngine;
pub use numeric::{extract_digit_runs, extract_kill_count};
pub use text::{contains_identity, normalize_text};
