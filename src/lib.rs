//! # Evidence Verifier
//!
//! OCR-backed eligibility verification for a single user. A user claims an
//! identity and supplies two screenshots; text is recognized from each, a
//! small set of rules is applied, and a pass/fail [`domain::Verdict`] with
//! per-stage detail is produced and can be exported as an image.
//!
//! ## Pipeline
//!
//! 1. **Identity**: the claimed identity must be non-empty after trimming.
//! 2. **Kill-count evidence**: the largest number of three or more digits in
//!    the screenshot must reach the threshold (3000 by default) and the
//!    claimed identity must appear in it.
//! 3. **Profile evidence**: the claimed identity must appear in it.
//!
//! OCR failures never abort a submission; they fail the affected stage and
//! are logged with a distinct reason.
//!
//! ## Modules
//!
//! * [`core`] - Configuration, constants, errors and collaborator traits
//! * [`domain`] - Evidence, stage outcomes and the verdict
//! * [`ingestion`] - File picker, drag-and-drop and clipboard payloads to evidence
//! * [`extraction`] - Failure-absorbing wrapper around an OCR engine
//! * [`rules`] - Text normalization, name matching and numeric extraction
//! * [`pipeline`] - Wizard state machine and the verification session
//! * [`export`] - Verdict rendering and clipboard/download delivery
//! * [`utils`] - Logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use async_trait::async_trait;
//! use evidence_verifier::prelude::*;
//! use std::sync::Arc;
//!
//! struct CannedOcr;
//!
//! #[async_trait]
//! impl TextExtractor for CannedOcr {
//!     async fn extract_text(
//!         &self,
//!         image: &EvidenceImage,
//!         _language: &str,
//!     ) -> Result<String, ExtractionError> {
//!         Ok(match image.filename() {
//!             "kills.png" => "Aeris\nSession 998\nTotal 10306".to_string(),
//!             _ => "Profile\nAeris".to_string(),
//!         })
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = VerificationSession::new(Arc::new(CannedOcr), &VerificationConfig::default());
//! session.set_identity("Aeris")?;
//! session.advance()?;
//! session.ingest(
//!     EvidenceKind::KillCount,
//!     IngestionSource::FilePicker(SelectedFile::new("kills.png", "image/png", vec![1u8, 2, 3])),
//! )?;
//! session.advance()?;
//! session.ingest(
//!     EvidenceKind::Profile,
//!     IngestionSource::FilePicker(SelectedFile::new("profile.png", "image/png", vec![4u8, 5, 6])),
//! )?;
//!
//! let verdict = futures::executor::block_on(session.submit())?;
//! assert!(verdict.is_valid());
//! assert_eq!(verdict.kill_count().kill_count(), 10306);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod export;
pub mod extraction;
pub mod ingestion;
pub mod pipeline;
pub mod rules;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use evidence_verifier::prelude::*;
/// ```
///
/// Included items focus on driving a session end to end:
/// - Session and wizard (`VerificationSession`, `WizardStep`)
/// - Evidence and results (`EvidenceImage`, `EvidenceKind`, `Verdict`)
/// - Ingestion payloads (`IngestionSource`, `SelectedFile`, clipboard types)
/// - Export (`ExportService`, `ExportOutcome`, `VerdictView`)
/// - Collaborator traits and essential errors
pub mod prelude {
    pub use crate::core::config::VerificationConfig;
    pub use crate::core::errors::{
        ExportError, ExtractionError, IngestionError, SubmissionError, TransitionRejected,
        VerifierError, VerifierResult,
    };
    pub use crate::core::traits::{ClipboardSink, NoClipboard, TextExtractor, VerdictRenderer};
    pub use crate::domain::{EvidenceImage, EvidenceKind, ExtractionStatus, Verdict};
    pub use crate::export::{ExportOutcome, ExportService, VerdictView};
    pub use crate::ingestion::{
        ClipboardContents, ClipboardItem, ClipboardRepresentation, IngestionSource, SelectedFile,
    };
    pub use crate::pipeline::{VerificationSession, WizardStep};
    pub use crate::utils::init_tracing;
}
