//! The core module of the verification pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Traits for the external collaborators (OCR engine, renderer, clipboard)

pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;

pub use crate::utils::init_tracing;
pub use config::{ConfigError, ConfigValidator, VerificationConfig};
pub use constants::*;
pub use errors::{
    ExportError, ExtractionError, IngestionError, SubmissionError, TransitionRejected,
    VerifierError, VerifierResult,
};
pub use traits::{ClipboardSink, NoClipboard, TextExtractor, VerdictRenderer};
