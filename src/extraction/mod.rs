//! Failure-absorbing text extraction.
//!
//! [`ExtractionService`] is the only way the pipeline talks to an OCR
//! engine. Whatever the engine does (error, timeout, blank output) the
//! service resolves to a string; failures become `""` plus an
//! [`ExtractionReport`] whose status tells operators what happened.
//!
//! ```rust
//! use async_trait::async_trait;
//! use evidence_verifier::core::errors::ExtractionError;
//! use evidence_verifier::core::traits::TextExtractor;
//! use evidence_verifier::domain::{EvidenceImage, ExtractionStatus};
//! use evidence_verifier::extraction::ExtractionService;
//! use evidence_verifier::core::config::ExtractionConfig;
//! use std::sync::Arc;
//!
//! struct Broken;
//!
//! #[async_trait]
//! impl TextExtractor for Broken {
//!     async fn extract_text(&self, _: &EvidenceImage, _: &str) -> Result<String, ExtractionError> {
//!         Err(ExtractionError::engine("model missing"))
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let service = ExtractionService::new(Arc::new(Broken), ExtractionConfig::default());
//! let image = EvidenceImage::new(vec![1u8], "image/png", "a.png").unwrap();
//! let extraction = service.extract(&image).await;
//! assert_eq!(extraction.text, "");
//! assert_eq!(extraction.report.status, ExtractionStatus::EngineError);
//! # });
//! ```

use crate::core::config::ExtractionConfig;
use crate::core::errors::ExtractionError;
use crate::core::traits::TextExtractor;
use crate::domain::{EvidenceImage, ExtractionStatus};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Diagnostics of one extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionReport {
    pub status: ExtractionStatus,
    pub elapsed: Duration,
    /// Number of characters returned, 0 on failure.
    pub char_count: usize,
}

/// Text plus diagnostics. The text is consumed once by the rule engine and
/// never stored in a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub report: ExtractionReport,
}

/// Wraps a [`TextExtractor`] so that it never fails.
#[derive(Clone)]
pub struct ExtractionService {
    extractor: Arc<dyn TextExtractor>,
    config: ExtractionConfig,
}

impl std::fmt::Debug for ExtractionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionService")
            .field("extractor", &self.extractor.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ExtractionService {
    /// Creates a service around `extractor`.
    pub fn new(extractor: Arc<dyn TextExtractor>, config: ExtractionConfig) -> Self {
        Self { extractor, config }
    }

    /// Returns the extraction settings.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts the text of `image`, absorbing every failure.
    ///
    /// When a timeout is configured the call must run inside a Tokio runtime
    /// with the time driver enabled.
    pub async fn extract(&self, image: &EvidenceImage) -> Extraction {
        let start = Instant::now();
        debug!(
            extractor = self.extractor.name(),
            filename = image.filename(),
            bytes = image.len(),
            "starting text extraction"
        );

        let result = self.run_engine(image).await;
        let elapsed = start.elapsed();

        match result {
            Ok(text) => {
                let status = if text.trim().is_empty() {
                    ExtractionStatus::Empty
                } else {
                    ExtractionStatus::Recognized
                };
                if status == ExtractionStatus::Empty {
                    warn!(
                        extractor = self.extractor.name(),
                        filename = image.filename(),
                        reason = "empty_text",
                        "text extraction returned no text"
                    );
                } else {
                    info!(
                        extractor = self.extractor.name(),
                        filename = image.filename(),
                        chars = text.chars().count(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "text extraction finished"
                    );
                }
                let char_count = text.chars().count();
                Extraction {
                    text,
                    report: ExtractionReport {
                        status,
                        elapsed,
                        char_count,
                    },
                }
            }
            Err(error) => {
                warn!(
                    extractor = self.extractor.name(),
                    filename = image.filename(),
                    reason = error.reason(),
                    error = %error,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "text extraction failed, continuing with empty text"
                );
                let status = match error {
                    ExtractionError::Timeout { .. } => ExtractionStatus::TimedOut,
                    _ => ExtractionStatus::EngineError,
                };
                Extraction {
                    text: String::new(),
                    report: ExtractionReport {
                        status,
                        elapsed,
                        char_count: 0,
                    },
                }
            }
        }
    }

    async fn run_engine(&self, image: &EvidenceImage) -> Result<String, ExtractionError> {
        let call = self.extractor.extract_text(image, &self.config.language);
        match self.config.timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ExtractionError::timeout(limit)),
            },
            None => call.await,
        }
    }
}
