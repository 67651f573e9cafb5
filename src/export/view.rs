//! The renderable view of a verdict.

use crate::domain::{Stage, Verdict};
use chrono::{DateTime, Utc};

/// One line of the verdict card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub label: String,
    pub detail: String,
    pub valid: bool,
}

/// Everything the renderer needs to draw a verdict, and nothing it does not.
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictView {
    pub title: String,
    pub claimed_identity: String,
    pub overall_valid: bool,
    pub rows: Vec<ViewRow>,
    pub checked_at: DateTime<Utc>,
}

impl VerdictView {
    /// Builds the view of `verdict`.
    pub fn from_verdict(verdict: &Verdict) -> Self {
        let rows = verdict
            .stage_summaries()
            .into_iter()
            .map(|summary| {
                let detail = match summary.stage {
                    Stage::Identity => format!("Claimed identity: {}", verdict.claimed_identity()),
                    Stage::KillCount => {
                        let outcome = verdict.kill_count();
                        format!(
                            "Kill count {} (required {}), name {}",
                            outcome.kill_count(),
                            outcome.min_kill_count(),
                            if outcome.name_found() { "found" } else { "not found" }
                        )
                    }
                    Stage::Profile => {
                        if verdict.profile().name_match() {
                            "Profile name matches".to_string()
                        } else {
                            "Profile name does not match".to_string()
                        }
                    }
                };
                ViewRow {
                    label: summary.stage.label().to_string(),
                    detail,
                    valid: summary.valid,
                }
            })
            .collect();

        Self {
            title: if verdict.is_valid() {
                "Eligibility verified".to_string()
            } else {
                "Eligibility not verified".to_string()
            },
            claimed_identity: verdict.claimed_identity().to_string(),
            overall_valid: verdict.is_valid(),
            rows,
            checked_at: verdict.checked_at(),
        }
    }
}

impl From<&Verdict> for VerdictView {
    fn from(verdict: &Verdict) -> Self {
        Self::from_verdict(verdict)
    }
}
