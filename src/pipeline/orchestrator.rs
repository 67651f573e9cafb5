//! Verification orchestrator.
//!
//! [`VerificationSession`] owns the [`WizardState`] and drives every
//! transition through [`reduce`]. The submit transition is split in three so
//! that a host can keep using the session while OCR runs:
//!
//! 1. [`VerificationSession::begin_submission`] checks the guards, sets the
//!    in-flight flag and snapshots the inputs into a [`SubmissionTicket`].
//! 2. [`SubmissionTicket::run`] performs kill-count extraction and rules,
//!    then profile extraction and rules, strictly in that order.
//! 3. [`VerificationSession::complete_submission`] records the verdict, or
//!    drops it when the session was reset in the meantime.
//!
//! [`VerificationSession::submit`] composes the three for hosts that simply
//! await the whole thing.

use super::state::{WizardEvent, WizardState, WizardStep, reduce, submission_guard};
use super::stats::{StatsManager, VerificationStats};
use crate::core::config::VerificationConfig;
use crate::core::errors::{SubmissionError, TransitionRejected, VerifierError};
use crate::core::traits::TextExtractor;
use crate::domain::{
    ClaimedIdentity, EvidenceImage, EvidenceKind, IdentityOutcome, KillCountOutcome,
    ProfileOutcome, Verdict,
};
use crate::extraction::ExtractionService;
use crate::ingestion::{IngestionSource, acquire};
use crate::rules::RuleEngine;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Inputs of one submission, detached from the session.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    attempt: u64,
    raw_identity: String,
    identity: ClaimedIdentity,
    kill_count_evidence: EvidenceImage,
    profile_evidence: EvidenceImage,
    extraction: ExtractionService,
    rules: RuleEngine,
}

/// What a finished [`SubmissionTicket::run`] hands back to the session.
#[derive(Debug)]
pub struct SubmissionReport {
    pub attempt: u64,
    pub result: Result<Verdict, SubmissionError>,
    /// Stages whose extraction failed or timed out.
    pub extraction_failures: usize,
    pub elapsed: Duration,
}

impl SubmissionTicket {
    /// Attempt this ticket belongs to.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Runs extraction and rules for both evidence stages.
    ///
    /// Never panics: a panic inside a collaborator is caught and reported as
    /// `SubmissionError::Panicked`.
    pub async fn run(self) -> SubmissionReport {
        let start = Instant::now();
        let attempt = self.attempt;

        let outcome = AssertUnwindSafe(self.evaluate()).catch_unwind().await;
        let (result, extraction_failures) = match outcome {
            Ok((verdict, failures)) => (Ok(verdict), failures),
            Err(payload) => (Err(SubmissionError::from_panic(payload)), 0),
        };

        SubmissionReport {
            attempt,
            result,
            extraction_failures,
            elapsed: start.elapsed(),
        }
    }

    async fn evaluate(self) -> (Verdict, usize) {
        let identity_outcome = IdentityOutcome::evaluate(&self.raw_identity);

        let kill_count = self.run_kill_count_stage().await;
        let profile = self.run_profile_stage().await;

        let failures = [kill_count.extraction(), profile.extraction()]
            .iter()
            .filter(|status| status.is_failure())
            .count();

        let verdict = Verdict::new(
            self.identity.as_str(),
            identity_outcome,
            kill_count,
            profile,
        );
        (verdict, failures)
    }

    async fn run_kill_count_stage(&self) -> KillCountOutcome {
        let extraction = self.extraction.extract(&self.kill_count_evidence).await;
        let outcome = self.rules.evaluate_kill_count(
            &extraction.text,
            &self.identity,
            extraction.report.status,
        );
        if !outcome.is_valid() && extraction.report.status.is_failure() {
            warn!(
                stage = "kill_count",
                status = %extraction.report.status,
                "stage failed because text extraction failed"
            );
        }
        outcome
    }

    async fn run_profile_stage(&self) -> ProfileOutcome {
        let extraction = self.extraction.extract(&self.profile_evidence).await;
        let outcome =
            self.rules
                .evaluate_profile(&extraction.text, &self.identity, extraction.report.status);
        if !outcome.is_valid() && extraction.report.status.is_failure() {
            warn!(
                stage = "profile",
                status = %extraction.report.status,
                "stage failed because text extraction failed"
            );
        }
        outcome
    }
}

/// One user's verification session.
#[derive(Debug)]
pub struct VerificationSession {
    state: WizardState,
    extraction: ExtractionService,
    rules: RuleEngine,
    stats: StatsManager,
}

impl VerificationSession {
    /// Creates a session in the identity step.
    pub fn new(extractor: Arc<dyn TextExtractor>, config: &VerificationConfig) -> Self {
        Self {
            state: WizardState::new(),
            extraction: ExtractionService::new(extractor, config.extraction.clone()),
            rules: RuleEngine::new(config.rules.clone()),
            stats: StatsManager::new(),
        }
    }

    /// Current wizard state.
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step()
    }

    /// The verdict of the current attempt, once in the result step.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.state.verdict()
    }

    /// Session statistics.
    pub fn stats(&self) -> VerificationStats {
        self.stats.get_stats()
    }

    /// Evaluates the identity stage for the current input.
    pub fn identity_outcome(&self) -> IdentityOutcome {
        self.rules.evaluate_identity(self.state.identity())
    }

    fn apply(&mut self, event: WizardEvent) -> Result<(), TransitionRejected> {
        let name = event.name();
        match reduce(&self.state, event) {
            Ok(next) => {
                if next.step() != self.state.step() {
                    info!(from = %self.state.step(), to = %next.step(), event = name, "wizard transition");
                }
                self.state = next;
                Ok(())
            }
            Err(rejected) => {
                debug!(%rejected, "transition rejected");
                Err(rejected)
            }
        }
    }

    /// Replaces the identity input. Only allowed in the identity step.
    pub fn set_identity(&mut self, raw: impl Into<String>) -> Result<(), TransitionRejected> {
        self.apply(WizardEvent::EditIdentity(raw.into()))
    }

    /// Stores evidence for `kind`. Only allowed in the matching step.
    pub fn attach_evidence(
        &mut self,
        kind: EvidenceKind,
        image: EvidenceImage,
    ) -> Result<(), TransitionRejected> {
        self.apply(WizardEvent::AttachEvidence(kind, image))
    }

    /// Acquires evidence from a host payload and stores it for `kind`.
    ///
    /// An ingestion failure leaves the state untouched.
    pub fn ingest(
        &mut self,
        kind: EvidenceKind,
        source: IngestionSource,
    ) -> Result<(), VerifierError> {
        let image = acquire(source)?;
        self.attach_evidence(kind, image)?;
        Ok(())
    }

    /// Moves forward one step (identity → kill count → profile).
    pub fn advance(&mut self) -> Result<WizardStep, TransitionRejected> {
        self.apply(WizardEvent::Advance)?;
        Ok(self.state.step())
    }

    /// Moves back one step without discarding anything.
    pub fn retreat(&mut self) -> Result<WizardStep, TransitionRejected> {
        self.apply(WizardEvent::Back)?;
        Ok(self.state.step())
    }

    /// Starts a submission and returns the detached work.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, SubmissionError> {
        submission_guard(&self.state)?;

        let identity =
            ClaimedIdentity::parse(self.state.identity()).ok_or(SubmissionError::MissingIdentity)?;
        let kill_count_evidence = self
            .state
            .evidence(EvidenceKind::KillCount)
            .cloned()
            .ok_or(SubmissionError::MissingEvidence {
                kind: EvidenceKind::KillCount,
            })?;
        let profile_evidence = self.state.evidence(EvidenceKind::Profile).cloned().ok_or(
            SubmissionError::MissingEvidence {
                kind: EvidenceKind::Profile,
            },
        )?;

        self.apply(WizardEvent::SubmissionStarted)
            .map_err(|_| SubmissionError::AlreadyInFlight)?;

        info!(attempt = self.state.attempt(), identity = %identity, "submission started");
        Ok(SubmissionTicket {
            attempt: self.state.attempt(),
            raw_identity: self.state.identity().to_string(),
            identity,
            kill_count_evidence,
            profile_evidence,
            extraction: self.extraction.clone(),
            rules: self.rules.clone(),
        })
    }

    /// Records the outcome of a submission.
    ///
    /// # Returns
    ///
    /// * `Ok(&Verdict)` - the verdict, now visible in the result step
    /// * `Err(StaleAttempt)` - the session was reset; the result was dropped
    /// * `Err(..)` - the submission failed unexpectedly; the session stays in
    ///   the profile step with the in-flight flag cleared
    pub fn complete_submission(
        &mut self,
        report: SubmissionReport,
    ) -> Result<&Verdict, SubmissionError> {
        let current = self.state.attempt();
        if report.attempt != current || !self.state.is_in_flight() {
            info!(
                attempt = report.attempt,
                current, "discarding result of superseded submission"
            );
            self.stats.record_discarded();
            return Err(SubmissionError::StaleAttempt {
                attempt: report.attempt,
                current,
            });
        }

        match report.result {
            Ok(verdict) => {
                let passed = verdict.is_valid();
                let elapsed_ms = report.elapsed.as_secs_f64() * 1000.0;
                self.apply(WizardEvent::SubmissionCompleted {
                    attempt: report.attempt,
                    verdict,
                })
                .map_err(|_| SubmissionError::StaleAttempt {
                    attempt: report.attempt,
                    current,
                })?;
                self.stats
                    .record_verdict(passed, report.extraction_failures, elapsed_ms);
                info!(
                    attempt = report.attempt,
                    passed,
                    extraction_failures = report.extraction_failures,
                    elapsed_ms,
                    "verdict produced"
                );
                self.state
                    .verdict()
                    .ok_or(SubmissionError::StaleAttempt {
                        attempt: report.attempt,
                        current,
                    })
            }
            Err(err) => {
                error!(attempt = report.attempt, error = %err, "submission failed");
                self.stats.record_submission_error();
                if let Err(rejected) = self.apply(WizardEvent::SubmissionFailed {
                    attempt: report.attempt,
                }) {
                    warn!(%rejected, "could not clear in-flight flag");
                }
                Err(err)
            }
        }
    }

    /// Submits the current attempt and waits for the verdict.
    ///
    /// Extraction failures never make this fail; they only fail stages.
    ///
    /// Dropping the returned future before it resolves clears the in-flight
    /// flag, leaving the session in the profile step ready for a retry.
    pub async fn submit(&mut self) -> Result<&Verdict, SubmissionError> {
        let ticket = self.begin_submission()?;
        let attempt = ticket.attempt();

        let mut guard = InFlightGuard::new(self, attempt);
        let report = ticket.run().await;
        let completed = guard.complete(report);
        drop(guard);
        completed?;

        let current = self.state.attempt();
        self.state
            .verdict()
            .ok_or(SubmissionError::StaleAttempt { attempt, current })
    }

    /// Discards identity, evidence and verdict and returns to the identity step.
    ///
    /// A submission still in flight keeps running; its result is dropped.
    pub fn reset(&mut self) {
        if self.state.is_in_flight() {
            info!(attempt = self.state.attempt(), "reset while a submission is in flight");
        }
        if let Err(rejected) = self.apply(WizardEvent::Reset) {
            warn!(%rejected, "reset rejected");
        }
    }
}

/// Clears the in-flight flag of `attempt` when a submission is abandoned
/// between `begin_submission` and `complete_submission`.
struct InFlightGuard<'a> {
    session: &'a mut VerificationSession,
    attempt: u64,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn new(session: &'a mut VerificationSession, attempt: u64) -> Self {
        Self {
            session,
            attempt,
            armed: true,
        }
    }

    fn complete(&mut self, report: SubmissionReport) -> Result<(), SubmissionError> {
        self.armed = false;
        self.session.complete_submission(report).map(|_| ())
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let state = &self.session.state;
        if state.attempt() != self.attempt || !state.is_in_flight() {
            return;
        }
        warn!(attempt = self.attempt, "submission abandoned before completion");
        self.session.stats.record_discarded();
        if let Err(rejected) = self.session.apply(WizardEvent::SubmissionFailed {
            attempt: self.attempt,
        }) {
            warn!(%rejected, "could not clear in-flight flag");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ExtractionError;
    use crate::domain::ExtractionStatus;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Returns scripted text per filename and records call boundaries.
    #[derive(Default)]
    struct RecordingExtractor {
        texts: HashMap<&'static str, Result<&'static str, &'static str>>,
        calls: Mutex<Vec<String>>,
        panic_on: Option<&'static str>,
        hang_on: Option<&'static str>,
    }

    impl RecordingExtractor {
        fn with(mut self, filename: &'static str, text: Result<&'static str, &'static str>) -> Self {
            self.texts.insert(filename, text);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextExtractor for RecordingExtractor {
        async fn extract_text(
            &self,
            image: &EvidenceImage,
            _language: &str,
        ) -> Result<String, ExtractionError> {
            let name = image.filename().to_string();
            self.calls.lock().unwrap().push(format!("start:{name}"));
            tokio::task::yield_now().await;
            if self.panic_on == Some(image.filename()) {
                panic!("engine exploded");
            }
            if self.hang_on == Some(image.filename()) {
                std::future::pending::<()>().await;
            }
            self.calls.lock().unwrap().push(format!("end:{name}"));
            match self.texts.get(image.filename()) {
                Some(Ok(text)) => Ok(text.to_string()),
                Some(Err(message)) => Err(ExtractionError::engine(*message)),
                None => Ok(String::new()),
            }
        }
    }

    fn evidence(name: &str) -> EvidenceImage {
        EvidenceImage::new(vec![1u8, 2, 3], "image/png", name).unwrap()
    }

    fn ready_session(extractor: Arc<RecordingExtractor>) -> VerificationSession {
        let mut session = VerificationSession::new(extractor, &VerificationConfig::default());
        session.set_identity("Aeris").unwrap();
        session.advance().unwrap();
        session
            .attach_evidence(EvidenceKind::KillCount, evidence("kills.png"))
            .unwrap();
        session.advance().unwrap();
        session
            .attach_evidence(EvidenceKind::Profile, evidence("profile.png"))
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_passing_submission() {
        let extractor = Arc::new(
            RecordingExtractor::default()
                .with("kills.png", Ok("Aeris\nSession 998\nTotal 10306"))
                .with("profile.png", Ok("Profile: AERIS")),
        );
        let mut session = ready_session(extractor);

        let verdict = session.submit().await.unwrap();
        assert!(verdict.is_valid());
        assert_eq!(verdict.kill_count().kill_count(), 10306);
        assert!(verdict.profile().name_match());
        assert_eq!(session.step(), WizardStep::Result);
        assert_eq!(session.stats().passed, 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_still_reaches_result() {
        let extractor = Arc::new(
            RecordingExtractor::default()
                .with("kills.png", Err("engine crashed"))
                .with("profile.png", Ok("")),
        );
        let mut session = ready_session(extractor);

        let verdict = session.submit().await.unwrap();
        assert!(!verdict.is_valid());
        assert_eq!(
            verdict.kill_count().extraction(),
            ExtractionStatus::EngineError
        );
        assert_eq!(verdict.profile().extraction(), ExtractionStatus::Empty);
        assert_eq!(session.step(), WizardStep::Result);
        assert_eq!(session.stats().extraction_failures, 1);
    }

    #[tokio::test]
    async fn test_stages_run_sequentially() {
        let extractor = Arc::new(
            RecordingExtractor::default()
                .with("kills.png", Ok("Aeris 5000"))
                .with("profile.png", Ok("Aeris")),
        );
        let mut session = ready_session(extractor.clone());
        session.submit().await.unwrap();

        assert_eq!(
            extractor.calls(),
            vec![
                "start:kills.png",
                "end:kills.png",
                "start:profile.png",
                "end:profile.png"
            ]
        );
    }

    #[tokio::test]
    async fn test_panic_leaves_profile_step_for_retry() {
        let extractor = Arc::new(RecordingExtractor {
            panic_on: Some("profile.png"),
            ..RecordingExtractor::default()
        });
        let mut session = ready_session(extractor);

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SubmissionError::Panicked { ref message } if message == "engine exploded"));
        assert_eq!(session.step(), WizardStep::ProfileEvidence);
        assert!(!session.state().is_in_flight());
        assert!(session.verdict().is_none());
        assert_eq!(session.stats().submission_errors, 1);
        assert!(session.begin_submission().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_clears_in_flight() {
        let extractor = Arc::new(RecordingExtractor {
            hang_on: Some("profile.png"),
            ..RecordingExtractor::default()
        });
        let mut session = ready_session(extractor);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), session.submit()).await;
        assert!(abandoned.is_err());

        assert_eq!(session.step(), WizardStep::ProfileEvidence);
        assert!(!session.state().is_in_flight());
        assert_eq!(session.state().identity(), "Aeris");
        assert!(session.state().evidence(EvidenceKind::Profile).is_some());
        assert_eq!(session.stats().discarded, 1);
        assert_eq!(session.retreat().unwrap(), WizardStep::KillCountEvidence);
        assert_eq!(session.advance().unwrap(), WizardStep::ProfileEvidence);
        assert!(session.begin_submission().is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_submission_rejected() {
        let mut session = ready_session(Arc::new(RecordingExtractor::default()));
        let _ticket = session.begin_submission().unwrap();
        assert!(matches!(
            session.begin_submission(),
            Err(SubmissionError::AlreadyInFlight)
        ));
    }

    #[tokio::test]
    async fn test_submit_requires_profile_step() {
        let mut session = VerificationSession::new(
            Arc::new(RecordingExtractor::default()),
            &VerificationConfig::default(),
        );
        assert!(matches!(
            session.submit().await,
            Err(SubmissionError::NotReady {
                step: WizardStep::Identity
            })
        ));
    }

    #[tokio::test]
    async fn test_reset_mid_flight_discards_result() {
        let extractor = Arc::new(
            RecordingExtractor::default()
                .with("kills.png", Ok("Aeris 5000"))
                .with("profile.png", Ok("Aeris")),
        );
        let mut session = ready_session(extractor);

        let ticket = session.begin_submission().unwrap();
        session.reset();
        let report = ticket.run().await;
        assert!(report.result.is_ok());

        let err = session.complete_submission(report).unwrap_err();
        assert!(matches!(err, SubmissionError::StaleAttempt { attempt: 0, current: 1 }));
        assert_eq!(session.step(), WizardStep::Identity);
        assert!(session.verdict().is_none());
        assert_eq!(session.stats().discarded, 1);
    }

    #[tokio::test]
    async fn test_reset_after_result() {
        let extractor = Arc::new(
            RecordingExtractor::default()
                .with("kills.png", Ok("Aeris 5000"))
                .with("profile.png", Ok("Aeris")),
        );
        let mut session = ready_session(extractor);
        session.submit().await.unwrap();

        session.reset();
        assert_eq!(session.step(), WizardStep::Identity);
        assert_eq!(session.state().identity(), "");
        assert!(session.state().evidence(EvidenceKind::KillCount).is_none());
        assert!(session.state().evidence(EvidenceKind::Profile).is_none());
        assert!(session.verdict().is_none());
    }

    #[test]
    fn test_ingestion_error_does_not_touch_state() {
        let mut session = VerificationSession::new(
            Arc::new(RecordingExtractor::default()),
            &VerificationConfig::default(),
        );
        session.set_identity("Aeris").unwrap();
        session.advance().unwrap();
        let before = session.state().clone();

        let err = session
            .ingest(
                EvidenceKind::KillCount,
                IngestionSource::FilePicker(crate::ingestion::SelectedFile::new(
                    "notes.txt",
                    "text/plain",
                    b"hi".to_vec(),
                )),
            )
            .unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(session.state(), &before);
    }
}
