//! The verification pipeline.
//!
//! This module drives the three-stage wizard (identity, kill-count evidence,
//! profile evidence) to a [`crate::domain::Verdict`]:
//!
//! * [`state`] - the serializable wizard state and its pure transition function
//! * [`orchestrator`] - the session that applies transitions and runs submissions
//! * [`stats`] - per-session counters
//!
//! # Example
//!
//! ```rust,no_run
//! use evidence_verifier::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(extractor: Arc<dyn TextExtractor>, kills: EvidenceImage, profile: EvidenceImage)
//! # -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = VerificationSession::new(extractor, &VerificationConfig::default());
//! session.set_identity("Aeris")?;
//! session.advance()?;
//! session.attach_evidence(EvidenceKind::KillCount, kills)?;
//! session.advance()?;
//! session.attach_evidence(EvidenceKind::Profile, profile)?;
//!
//! let verdict = session.submit().await?;
//! println!("{verdict}");
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
pub mod state;
pub mod stats;

pub use orchestrator::{SubmissionReport, SubmissionTicket, VerificationSession};
pub use state::{WizardEvent, WizardState, WizardStep, reduce, submission_guard};
pub use stats::{StatsManager, VerificationStats};
