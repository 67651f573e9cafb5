//! Error constructor utilities.
//!
//! Helpers for building errors with consistent messages from the places that
//! raise them most often.
//!
//! ```rust
//! use evidence_verifier::core::errors::{ExtractionError, SubmissionError};
//!
//! let error = ExtractionError::engine("model not loaded");
//! assert_eq!(error.reason(), "engine_error");
//!
//! let panic = SubmissionError::from_panic(Box::new("boom"));
//! assert!(panic.to_string().contains("boom"));
//! ```

use super::{ExportError, ExtractionError, IngestionError, SubmissionError};
use std::any::Any;
use std::path::Path;
use std::time::Duration;

impl IngestionError {
    /// Creates a `NotAnImage` error for the given MIME type.
    pub fn not_an_image(mime_type: impl Into<String>) -> Self {
        Self::NotAnImage {
            mime_type: mime_type.into(),
        }
    }

    /// Creates an `EmptyPayload` error with context.
    pub fn empty(context: impl Into<String>) -> Self {
        Self::EmptyPayload {
            context: context.into(),
        }
    }

    /// Creates an `Io` error for a file that could not be read.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ExtractionError {
    /// Creates an engine error without an underlying cause.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(elapsed: Duration) -> Self {
        Self::Timeout { elapsed }
    }

    /// Short machine-readable reason used in log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Engine { .. } => "engine_error",
            Self::Timeout { .. } => "timeout",
            Self::Decode { .. } => "decode_error",
        }
    }
}

impl ExportError {
    /// Creates a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Creates a clipboard denial error.
    pub fn clipboard_denied(message: impl Into<String>) -> Self {
        Self::ClipboardDenied {
            message: message.into(),
        }
    }

    /// Creates a download error for the given target path.
    pub fn download(path: &Path, source: std::io::Error) -> Self {
        Self::Download {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SubmissionError {
    /// Builds a `Panicked` error from a panic payload.
    ///
    /// Panic payloads are usually `&'static str` or `String`; anything else
    /// is reported generically.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_messages() {
        let err = SubmissionError::from_panic(Box::new("static message"));
        assert!(matches!(err, SubmissionError::Panicked { ref message } if message == "static message"));

        let err = SubmissionError::from_panic(Box::new(String::from("owned message")));
        assert!(matches!(err, SubmissionError::Panicked { ref message } if message == "owned message"));

        let err = SubmissionError::from_panic(Box::new(42_u8));
        assert!(matches!(err, SubmissionError::Panicked { ref message } if message == "unknown panic payload"));
    }

    #[test]
    fn test_extraction_reasons_are_distinct() {
        let reasons = [
            ExtractionError::engine("x").reason(),
            ExtractionError::timeout(Duration::from_secs(1)).reason(),
        ];
        assert_ne!(reasons[0], reasons[1]);
    }

    #[test]
    fn test_ingestion_error_display() {
        let err = IngestionError::not_an_image("application/pdf");
        assert_eq!(
            err.to_string(),
            "payload is not an image (mime type 'application/pdf')"
        );
    }
}
