//! Wizard state and its pure transition function.
//!
//! [`reduce`] maps `(state, event)` to the next state or a
//! [`TransitionRejected`]. A rejection is a no-op: the caller keeps the
//! state it had. The orchestrator is the only component that applies events.

use crate::core::errors::{SubmissionError, TransitionRejected};
use crate::domain::{EvidenceImage, EvidenceKind, IdentityOutcome, Verdict};
use serde::Serialize;
use std::fmt;

/// Position of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Identity,
    KillCountEvidence,
    ProfileEvidence,
    Result,
}

impl WizardStep {
    /// The step in which evidence of `kind` is collected.
    pub fn for_evidence(kind: EvidenceKind) -> Self {
        match kind {
            EvidenceKind::KillCount => Self::KillCountEvidence,
            EvidenceKind::Profile => Self::ProfileEvidence,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::KillCountEvidence => "kill-count evidence",
            Self::ProfileEvidence => "profile evidence",
            Self::Result => "result",
        };
        f.write_str(name)
    }
}

/// Events accepted by [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// Replace the identity input.
    EditIdentity(String),
    /// Store (or replace) the evidence for a stage.
    AttachEvidence(EvidenceKind, EvidenceImage),
    /// Move forward one step (not the submit transition).
    Advance,
    /// Move back one step.
    Back,
    /// Mark a submission as in flight.
    SubmissionStarted,
    /// Record the verdict of the submission for `attempt`.
    SubmissionCompleted { attempt: u64, verdict: Verdict },
    /// Clear the in-flight flag after an unexpected failure.
    SubmissionFailed { attempt: u64 },
    /// Discard everything and return to the identity step.
    Reset,
}

impl WizardEvent {
    /// Name used in rejections and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EditIdentity(_) => "edit_identity",
            Self::AttachEvidence(..) => "attach_evidence",
            Self::Advance => "advance",
            Self::Back => "back",
            Self::SubmissionStarted => "submission_started",
            Self::SubmissionCompleted { .. } => "submission_completed",
            Self::SubmissionFailed { .. } => "submission_failed",
            Self::Reset => "reset",
        }
    }
}

/// Everything one verification attempt holds.
///
/// `attempt` increases on every reset so that results of a superseded
/// submission can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WizardState {
    step: WizardStep,
    identity: String,
    kill_count_evidence: Option<EvidenceImage>,
    profile_evidence: Option<EvidenceImage>,
    verdict: Option<Verdict>,
    in_flight: bool,
    attempt: u64,
}

impl WizardState {
    /// Initial state: identity step, nothing collected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// The raw identity input.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn evidence(&self, kind: EvidenceKind) -> Option<&EvidenceImage> {
        match kind {
            EvidenceKind::KillCount => self.kill_count_evidence.as_ref(),
            EvidenceKind::Profile => self.profile_evidence.as_ref(),
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    fn reject(&self, event: &WizardEvent, reason: impl Into<String>) -> TransitionRejected {
        TransitionRejected {
            event: event.name(),
            step: self.step,
            reason: reason.into(),
        }
    }
}

/// Checks whether a submission may start from `state`.
pub fn submission_guard(state: &WizardState) -> Result<(), SubmissionError> {
    if state.in_flight {
        return Err(SubmissionError::AlreadyInFlight);
    }
    if state.step != WizardStep::ProfileEvidence {
        return Err(SubmissionError::NotReady { step: state.step });
    }
    for kind in [EvidenceKind::KillCount, EvidenceKind::Profile] {
        if state.evidence(kind).is_none() {
            return Err(SubmissionError::MissingEvidence { kind });
        }
    }
    Ok(())
}

/// Applies `event` to `state`.
///
/// # Returns
///
/// The next state, or the guard that refused the event.
pub fn reduce(state: &WizardState, event: WizardEvent) -> Result<WizardState, TransitionRejected> {
    let mut next = state.clone();

    match event {
        WizardEvent::EditIdentity(raw) => {
            if state.step != WizardStep::Identity {
                return Err(state.reject(
                    &WizardEvent::EditIdentity(raw),
                    "identity can only change in the identity step",
                ));
            }
            next.identity = raw;
        }

        WizardEvent::AttachEvidence(kind, image) => {
            let expected = WizardStep::for_evidence(kind);
            if state.in_flight || state.step != expected {
                let reason = format!("{kind} evidence is only accepted in the {expected} step");
                return Err(state.reject(&WizardEvent::AttachEvidence(kind, image), reason));
            }
            match kind {
                EvidenceKind::KillCount => next.kill_count_evidence = Some(image),
                EvidenceKind::Profile => next.profile_evidence = Some(image),
            }
        }

        WizardEvent::Advance => match state.step {
            WizardStep::Identity => {
                if !IdentityOutcome::evaluate(&state.identity).is_valid() {
                    return Err(state.reject(&event, "identity is empty"));
                }
                next.step = WizardStep::KillCountEvidence;
            }
            WizardStep::KillCountEvidence => {
                if state.kill_count_evidence.is_none() {
                    return Err(state.reject(&event, "no kill-count evidence ingested"));
                }
                next.step = WizardStep::ProfileEvidence;
            }
            WizardStep::ProfileEvidence => {
                return Err(state.reject(&event, "the profile step is left by submitting"));
            }
            WizardStep::Result => {
                return Err(state.reject(&event, "the result step is left by resetting"));
            }
        },

        WizardEvent::Back => match state.step {
            WizardStep::KillCountEvidence => next.step = WizardStep::Identity,
            WizardStep::ProfileEvidence if !state.in_flight => {
                next.step = WizardStep::KillCountEvidence
            }
            WizardStep::ProfileEvidence => {
                return Err(state.reject(&event, "a submission is in flight"));
            }
            WizardStep::Identity | WizardStep::Result => {
                return Err(state.reject(&event, "no previous step"));
            }
        },

        WizardEvent::SubmissionStarted => {
            if let Err(guard) = submission_guard(state) {
                return Err(state.reject(&event, guard.to_string()));
            }
            next.in_flight = true;
        }

        WizardEvent::SubmissionCompleted { attempt, verdict } => {
            if attempt != state.attempt || !state.in_flight {
                let reason = format!(
                    "no submission in flight for attempt {attempt} (current attempt {})",
                    state.attempt
                );
                return Err(state.reject(
                    &WizardEvent::SubmissionCompleted { attempt, verdict },
                    reason,
                ));
            }
            next.in_flight = false;
            next.verdict = Some(verdict);
            next.step = WizardStep::Result;
        }

        WizardEvent::SubmissionFailed { attempt } => {
            if attempt != state.attempt || !state.in_flight {
                return Err(state.reject(&event, "no submission in flight for this attempt"));
            }
            next.in_flight = false;
        }

        WizardEvent::Reset => {
            next = WizardState {
                attempt: state.attempt + 1,
                ..WizardState::default()
            };
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExtractionStatus, KillCountOutcome, ProfileOutcome};

    fn evidence(name: &str) -> EvidenceImage {
        EvidenceImage::new(vec![1u8, 2, 3], "image/png", name).unwrap()
    }

    fn verdict() -> Verdict {
        Verdict::new(
            "Aeris",
            IdentityOutcome::evaluate("Aeris"),
            KillCountOutcome::new(0, false, Vec::new(), 3000, ExtractionStatus::Empty),
            ProfileOutcome::new(false, ExtractionStatus::Empty),
        )
    }

    fn apply(state: WizardState, events: Vec<WizardEvent>) -> WizardState {
        events
            .into_iter()
            .fold(state, |state, event| reduce(&state, event).unwrap())
    }

    fn ready_to_submit() -> WizardState {
        apply(
            WizardState::new(),
            vec![
                WizardEvent::EditIdentity("Aeris".into()),
                WizardEvent::Advance,
                WizardEvent::AttachEvidence(EvidenceKind::KillCount, evidence("kills.png")),
                WizardEvent::Advance,
                WizardEvent::AttachEvidence(EvidenceKind::Profile, evidence("profile.png")),
            ],
        )
    }

    #[test]
    fn test_identity_guard() {
        let state = WizardState::new();
        assert!(reduce(&state, WizardEvent::Advance).is_err());

        let state = reduce(&state, WizardEvent::EditIdentity("   ".into())).unwrap();
        let rejected = reduce(&state, WizardEvent::Advance).unwrap_err();
        assert_eq!(rejected.step, WizardStep::Identity);
        assert_eq!(rejected.event, "advance");

        let state = reduce(&state, WizardEvent::EditIdentity(" Aeris ".into())).unwrap();
        let state = reduce(&state, WizardEvent::Advance).unwrap();
        assert_eq!(state.step(), WizardStep::KillCountEvidence);
    }

    #[test]
    fn test_evidence_guard_and_back_keeps_data() {
        let state = apply(
            WizardState::new(),
            vec![WizardEvent::EditIdentity("Aeris".into()), WizardEvent::Advance],
        );
        assert!(reduce(&state, WizardEvent::Advance).is_err());

        let state = reduce(
            &state,
            WizardEvent::AttachEvidence(EvidenceKind::KillCount, evidence("kills.png")),
        )
        .unwrap();
        let back = reduce(&state, WizardEvent::Back).unwrap();
        assert_eq!(back.step(), WizardStep::Identity);
        assert_eq!(back.identity(), "Aeris");
        assert!(back.evidence(EvidenceKind::KillCount).is_some());
    }

    #[test]
    fn test_evidence_only_accepted_in_its_step() {
        let state = WizardState::new();
        let rejected = reduce(
            &state,
            WizardEvent::AttachEvidence(EvidenceKind::Profile, evidence("profile.png")),
        );
        assert!(rejected.is_err());
    }

    #[test]
    fn test_identity_frozen_after_identity_step() {
        let state = ready_to_submit();
        assert!(reduce(&state, WizardEvent::EditIdentity("Tifa".into())).is_err());
    }

    #[test]
    fn test_submission_lifecycle() {
        let state = ready_to_submit();
        assert!(submission_guard(&state).is_ok());
        assert!(reduce(&state, WizardEvent::Advance).is_err());

        let in_flight = reduce(&state, WizardEvent::SubmissionStarted).unwrap();
        assert!(in_flight.is_in_flight());
        assert!(matches!(
            submission_guard(&in_flight),
            Err(SubmissionError::AlreadyInFlight)
        ));
        assert!(reduce(&in_flight, WizardEvent::SubmissionStarted).is_err());
        assert!(reduce(&in_flight, WizardEvent::Back).is_err());

        let done = reduce(
            &in_flight,
            WizardEvent::SubmissionCompleted {
                attempt: 0,
                verdict: verdict(),
            },
        )
        .unwrap();
        assert_eq!(done.step(), WizardStep::Result);
        assert!(!done.is_in_flight());
        assert!(done.verdict().is_some());
    }

    #[test]
    fn test_failed_submission_allows_retry() {
        let in_flight = reduce(&ready_to_submit(), WizardEvent::SubmissionStarted).unwrap();
        let failed = reduce(&in_flight, WizardEvent::SubmissionFailed { attempt: 0 }).unwrap();
        assert_eq!(failed.step(), WizardStep::ProfileEvidence);
        assert!(!failed.is_in_flight());
        assert!(failed.verdict().is_none());
        assert!(reduce(&failed, WizardEvent::SubmissionStarted).is_ok());
    }

    #[test]
    fn test_reset_clears_everything() {
        let in_flight = reduce(&ready_to_submit(), WizardEvent::SubmissionStarted).unwrap();
        let done = reduce(
            &in_flight,
            WizardEvent::SubmissionCompleted {
                attempt: 0,
                verdict: verdict(),
            },
        )
        .unwrap();

        let reset = reduce(&done, WizardEvent::Reset).unwrap();
        assert_eq!(reset.step(), WizardStep::Identity);
        assert_eq!(reset.identity(), "");
        assert!(reset.evidence(EvidenceKind::KillCount).is_none());
        assert!(reset.evidence(EvidenceKind::Profile).is_none());
        assert!(reset.verdict().is_none());
        assert_eq!(reset.attempt(), 1);
    }

    #[test]
    fn test_stale_completion_rejected_after_reset() {
        let in_flight = reduce(&ready_to_submit(), WizardEvent::SubmissionStarted).unwrap();
        let reset = reduce(&in_flight, WizardEvent::Reset).unwrap();
        assert!(!reset.is_in_flight());

        let stale = reduce(
            &reset,
            WizardEvent::SubmissionCompleted {
                attempt: 0,
                verdict: verdict(),
            },
        );
        assert!(stale.is_err());
    }

    #[test]
    fn test_state_serializes() {
        let json = serde_json::to_value(ready_to_submit()).unwrap();
        assert_eq!(json["step"], "profile_evidence");
        assert_eq!(json["identity"], "Aeris");
        assert_eq!(json["in_flight"], false);
    }
}
