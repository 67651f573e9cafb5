//! Per-stage rule evaluation.

use super::numeric::{extract_digit_runs, extract_kill_count};
use super::text::contains_identity;
use crate::core::config::RuleConfig;
use crate::domain::{
    ClaimedIdentity, ExtractionStatus, IdentityOutcome, KillCountOutcome, ProfileOutcome,
};
use tracing::debug;

/// Applies the verification rules to raw extracted text.
///
/// The engine holds only thresholds, so it is cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: RuleConfig,
}

impl RuleEngine {
    /// Creates a rule engine with the given thresholds.
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Returns the thresholds in use.
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Identity stage: valid when the input is non-empty after trimming.
    pub fn evaluate_identity(&self, raw_identity: &str) -> IdentityOutcome {
        IdentityOutcome::evaluate(raw_identity)
    }

    /// Kill-count stage: the largest qualifying number must reach the
    /// threshold and the claimed identity must appear in the text.
    ///
    /// # Arguments
    ///
    /// * `raw_text` - Text as returned by the extraction service, possibly empty
    /// * `identity` - The claimed identity
    /// * `extraction` - Diagnostic status of the extraction, carried through untouched
    pub fn evaluate_kill_count(
        &self,
        raw_text: &str,
        identity: &ClaimedIdentity,
        extraction: ExtractionStatus,
    ) -> KillCountOutcome {
        let digit_runs = extract_digit_runs(raw_text, self.config.min_digit_run);
        let kill_count = extract_kill_count(&digit_runs);
        let name_found = contains_identity(raw_text, identity.as_str());

        let outcome = KillCountOutcome::new(
            kill_count,
            name_found,
            digit_runs,
            self.config.min_kill_count,
            extraction,
        );
        debug!(
            kill_count,
            name_found,
            runs = outcome.digit_runs().len(),
            valid = outcome.is_valid(),
            "evaluated kill-count stage"
        );
        outcome
    }

    /// Profile stage: the claimed identity must appear in the text.
    pub fn evaluate_profile(
        &self,
        raw_text: &str,
        identity: &ClaimedIdentity,
        extraction: ExtractionStatus,
    ) -> ProfileOutcome {
        let name_match = contains_identity(raw_text, identity.as_str());
        debug!(name_match, "evaluated profile stage");
        ProfileOutcome::new(name_match, extraction)
    }
}
