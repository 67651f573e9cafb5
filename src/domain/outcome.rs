//! Stage outcomes and the aggregate verdict.
//!
//! Every outcome computes its `valid` flag in its constructor from the facts
//! it holds and the thresholds it was evaluated against. There is no setter,
//! so validity can never drift from the facts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One gated phase of the verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Identity,
    KillCount,
    Profile,
}

impl Stage {
    /// Human-readable label used in summaries and rendered cards.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::KillCount => "Kill count evidence",
            Self::Profile => "Profile evidence",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the text extraction for a stage went.
///
/// This is diagnostic only; it never feeds into a stage's validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// The engine returned non-blank text.
    Recognized,
    /// The engine succeeded but returned blank text.
    Empty,
    /// The engine failed; the stage saw empty text.
    EngineError,
    /// The engine exceeded the configured timeout; the stage saw empty text.
    TimedOut,
}

impl ExtractionStatus {
    /// Returns true if the stage was evaluated against substitute empty text.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::EngineError | Self::TimedOut)
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Recognized => "recognized",
            Self::Empty => "empty",
            Self::EngineError => "engine error",
            Self::TimedOut => "timed out",
        };
        f.write_str(text)
    }
}

/// Outcome of the identity stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityOutcome {
    valid: bool,
}

impl IdentityOutcome {
    /// Evaluates raw identity input: valid when non-empty after trimming.
    pub fn evaluate(raw_identity: &str) -> Self {
        Self {
            valid: !raw_identity.trim().is_empty(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Outcome of the kill-count stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KillCountOutcome {
    valid: bool,
    kill_count: u64,
    name_found: bool,
    digit_runs: Vec<u64>,
    min_kill_count: u64,
    extraction: ExtractionStatus,
}

impl KillCountOutcome {
    /// Builds the outcome; valid iff `kill_count >= min_kill_count` and the
    /// claimed name was found.
    pub fn new(
        kill_count: u64,
        name_found: bool,
        digit_runs: Vec<u64>,
        min_kill_count: u64,
        extraction: ExtractionStatus,
    ) -> Self {
        Self {
            valid: kill_count >= min_kill_count && name_found,
            kill_count,
            name_found,
            digit_runs,
            min_kill_count,
            extraction,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The largest qualifying number found, or 0.
    pub fn kill_count(&self) -> u64 {
        self.kill_count
    }

    pub fn name_found(&self) -> bool {
        self.name_found
    }

    /// Every qualifying digit run, in reading order.
    pub fn digit_runs(&self) -> &[u64] {
        &self.digit_runs
    }

    /// The threshold this outcome was evaluated against.
    pub fn min_kill_count(&self) -> u64 {
        self.min_kill_count
    }

    pub fn extraction(&self) -> ExtractionStatus {
        self.extraction
    }
}

/// Outcome of the profile stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileOutcome {
    valid: bool,
    name_match: bool,
    extraction: ExtractionStatus,
}

impl ProfileOutcome {
    /// Builds the outcome; valid iff the claimed name matched.
    pub fn new(name_match: bool, extraction: ExtractionStatus) -> Self {
        Self {
            valid: name_match,
            name_match,
            extraction,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn name_match(&self) -> bool {
        self.name_match
    }

    pub fn extraction(&self) -> ExtractionStatus {
        self.extraction
    }
}

/// Flattened, display-oriented view of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: Stage,
    pub valid: bool,
    /// Derived facts rendered as text, keyed by fact name.
    pub facts: BTreeMap<&'static str, String>,
    pub extraction: Option<ExtractionStatus>,
}

/// Aggregate pass/fail result of one verification attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    claimed_identity: String,
    identity: IdentityOutcome,
    kill_count: KillCountOutcome,
    profile: ProfileOutcome,
    overall_valid: bool,
    checked_at: DateTime<Utc>,
}

impl Verdict {
    /// Aggregates stage outcomes; `overall_valid` is the AND of every stage.
    pub fn new(
        claimed_identity: impl Into<String>,
        identity: IdentityOutcome,
        kill_count: KillCountOutcome,
        profile: ProfileOutcome,
    ) -> Self {
        let overall_valid = identity.is_valid() && kill_count.is_valid() && profile.is_valid();
        Self {
            claimed_identity: claimed_identity.into(),
            identity,
            kill_count,
            profile,
            overall_valid,
            checked_at: Utc::now(),
        }
    }

    pub fn claimed_identity(&self) -> &str {
        &self.claimed_identity
    }

    pub fn identity(&self) -> &IdentityOutcome {
        &self.identity
    }

    pub fn kill_count(&self) -> &KillCountOutcome {
        &self.kill_count
    }

    pub fn profile(&self) -> &ProfileOutcome {
        &self.profile
    }

    pub fn is_valid(&self) -> bool {
        self.overall_valid
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// Per-stage summaries in pipeline order.
    pub fn stage_summaries(&self) -> Vec<StageSummary> {
        let identity = StageSummary {
            stage: Stage::Identity,
            valid: self.identity.is_valid(),
            facts: BTreeMap::from([("identity", self.claimed_identity.clone())]),
            extraction: None,
        };

        let kill_count = StageSummary {
            stage: Stage::KillCount,
            valid: self.kill_count.is_valid(),
            facts: BTreeMap::from([
                ("kill_count", self.kill_count.kill_count.to_string()),
                ("name_found", self.kill_count.name_found.to_string()),
                ("required", self.kill_count.min_kill_count.to_string()),
            ]),
            extraction: Some(self.kill_count.extraction),
        };

        let profile = StageSummary {
            stage: Stage::Profile,
            valid: self.profile.is_valid(),
            facts: BTreeMap::from([("name_match", self.profile.name_match.to_string())]),
            extraction: Some(self.profile.extraction),
        };

        vec![identity, kill_count, profile]
    }

    /// Serializes the verdict as pretty-printed JSON for audit trails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overall = if self.overall_valid { "PASSED" } else { "FAILED" };
        writeln!(f, "Verification {overall} for '{}'", self.claimed_identity)?;
        for summary in self.stage_summaries() {
            let mark = if summary.valid { "ok" } else { "not met" };
            let facts = summary
                .facts
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "  {}: {mark} ({facts})", summary.stage)?;
            if let Some(status) = summary.extraction {
                write!(f, " [ocr: {status}]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
