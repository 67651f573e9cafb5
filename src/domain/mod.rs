//! Domain-level structures shared across the verification pipeline.
//!
//! This module groups the evidence types produced by ingestion and the
//! outcome types produced by the rule engine, including the aggregate
//! [`Verdict`].

pub mod evidence;
pub mod outcome;

pub use evidence::{ClaimedIdentity, EvidenceImage, EvidenceKind};
pub use outcome::{
    ExtractionStatus, IdentityOutcome, KillCountOutcome, ProfileOutcome, Stage, StageSummary,
    Verdict,
};
