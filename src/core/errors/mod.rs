//! Error types for the verification pipeline.
//!
//! Errors are split along the taxonomy the pipeline exposes to its host:
//!
//! - [`IngestionError`]: surfaced to the user immediately, never mutates the wizard.
//! - [`ExtractionError`]: produced by a text extractor and absorbed by the
//!   extraction service; it never reaches the orchestrator's caller.
//! - [`ExportError`]: produced by individual export strategies; only a final
//!   failure of the whole chain is visible to the user.
//! - [`SubmissionError`]: an unexpected failure of the submit transition.
//! - [`TransitionRejected`]: a guarded transition that was refused (a no-op).
//!
//! [`VerifierError`] wraps all of them for callers that want a single type.
//!
//! # Usage
//!
//! ```rust
//! use evidence_verifier::core::errors::{IngestionError, VerifierError};
//!
//! let error: VerifierError = IngestionError::not_an_image("text/plain").into();
//! assert!(error.is_user_facing());
//! ```

pub mod constructors;

use crate::core::config::ConfigError;
use crate::domain::EvidenceKind;
use crate::pipeline::WizardStep;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Boxed error used to carry engine-specific failures across trait boundaries.
pub type OpaqueError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenient result alias for verification operations.
pub type VerifierResult<T> = Result<T, VerifierError>;

/// Errors raised while turning a user-supplied payload into evidence.
#[derive(Error, Debug)]
pub enum IngestionError {
    /// The payload's MIME type does not start with `image/`.
    #[error("payload is not an image (mime type '{mime_type}')")]
    NotAnImage { mime_type: String },

    /// The clipboard was readable but held no image representation.
    #[error("clipboard does not contain an image")]
    NoImageInClipboard,

    /// The host environment refused clipboard access.
    #[error("clipboard access was denied by the host environment")]
    PermissionDenied,

    /// The payload carried no bytes or no files at all.
    #[error("empty payload: {context}")]
    EmptyPayload { context: String },

    /// Reading an evidence file from disk failed.
    #[error("failed to read evidence file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a text extraction engine.
///
/// These never cross the [`crate::extraction::ExtractionService`] boundary;
/// they are logged and folded into an empty extraction result.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The engine reported a failure.
    #[error("text extraction engine failed: {message}")]
    Engine {
        message: String,
        #[source]
        source: Option<OpaqueError>,
    },

    /// The engine did not answer within the configured timeout.
    #[error("text extraction timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The evidence bytes could not be decoded into pixels.
    #[error("failed to decode evidence image '{filename}'")]
    Decode {
        filename: String,
        #[source]
        source: image::ImageError,
    },
}

/// Errors raised by the export chain.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Rasterizing the verdict view failed.
    #[error("failed to render verdict view: {message}")]
    Render { message: String },

    /// The clipboard is not available in this environment.
    #[error("clipboard is not supported in this environment")]
    ClipboardUnsupported,

    /// The host refused the clipboard write.
    #[error("clipboard write was denied: {message}")]
    ClipboardDenied { message: String },

    /// Encoding the raster image failed.
    #[error("failed to encode verdict image")]
    Encode {
        #[source]
        source: image::ImageError,
    },

    /// Writing the downloaded file failed.
    #[error("failed to save verdict image to {}", path.display())]
    Download {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export settings were rejected before any rendering.
    #[error("invalid export configuration")]
    Config {
        #[from]
        source: ConfigError,
    },

    /// Every configured delivery strategy failed.
    #[error("all export strategies failed (last error: {last})")]
    Exhausted { last: String },
}

/// Unexpected failures of the submit transition.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Submission is only possible from the profile evidence step.
    #[error("cannot submit from step {step}")]
    NotReady { step: WizardStep },

    /// A submission for this attempt is already running.
    #[error("a submission is already in flight")]
    AlreadyInFlight,

    /// Evidence required by a stage was not ingested.
    #[error("missing {kind} evidence")]
    MissingEvidence { kind: EvidenceKind },

    /// The identity was empty when the submission started.
    #[error("claimed identity is empty")]
    MissingIdentity,

    /// A collaborator panicked while the submission was running.
    #[error("submission aborted unexpectedly: {message}")]
    Panicked { message: String },

    /// The result belongs to an attempt that was reset in the meantime.
    #[error("submission for attempt {attempt} was superseded by attempt {current}")]
    StaleAttempt { attempt: u64, current: u64 },
}

/// A guarded wizard transition that was refused.
///
/// Rejections are no-ops: the wizard state is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transition '{event}' rejected in step {step}: {reason}")]
pub struct TransitionRejected {
    /// Name of the rejected event.
    pub event: &'static str,
    /// Step the wizard was in.
    pub step: WizardStep,
    /// Human-readable guard that failed.
    pub reason: String,
}

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Transition(#[from] TransitionRejected),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl VerifierError {
    /// Returns true if this error should be shown to the user as a notice.
    ///
    /// Ingestion and export failures are actionable in the moment; everything
    /// else is either recovered internally or only interesting to operators.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Ingestion(_) | Self::Export(_))
    }
}
