//! Evidence and identity types.

use crate::core::constants::IMAGE_MIME_PREFIX;
use crate::core::errors::{ExtractionError, IngestionError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The identity string a user claims, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimedIdentity(String);

impl ClaimedIdentity {
    /// Parses raw user input into a claimed identity.
    ///
    /// Returns `None` when the input is empty or whitespace only.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClaimedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClaimedIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which evidence-bearing stage an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// Screenshot showing the cumulative kill count.
    KillCount,
    /// Screenshot of the user's profile.
    Profile,
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KillCount => f.write_str("kill-count"),
            Self::Profile => f.write_str("profile"),
        }
    }
}

/// An immutable image blob supplied as evidence.
///
/// The bytes are shared, so cloning an `EvidenceImage` is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceImage {
    bytes: Arc<[u8]>,
    mime_type: String,
    filename: String,
}

impl EvidenceImage {
    /// Creates evidence from raw bytes.
    ///
    /// # Errors
    ///
    /// * `IngestionError::NotAnImage` - the MIME type does not start with `image/`
    /// * `IngestionError::EmptyPayload` - no bytes were supplied
    pub fn new(
        bytes: impl Into<Arc<[u8]>>,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, IngestionError> {
        let mime_type = mime_type.into();
        if !is_image_mime(&mime_type) {
            return Err(IngestionError::not_an_image(mime_type));
        }
        let bytes = bytes.into();
        let filename = filename.into();
        if bytes.is_empty() {
            return Err(IngestionError::empty(format!("'{filename}' has no content")));
        }
        Ok(Self {
            bytes,
            mime_type,
            filename,
        })
    }

    /// The raw encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The MIME type, always starting with `image/`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The original filename, or a synthesized one for clipboard images.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Size of the encoded image in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; empty evidence is rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the evidence into pixels.
    ///
    /// Extraction engines that operate on pixels call this; a decode failure
    /// is an extraction failure, not an ingestion one, because the MIME type
    /// was acceptable.
    pub fn decode(&self) -> Result<DynamicImage, ExtractionError> {
        image::load_from_memory(&self.bytes).map_err(|source| ExtractionError::Decode {
            filename: self.filename.clone(),
            source,
        })
    }
}

/// Returns true if the MIME type designates an image.
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .trim()
        .to_ascii_lowercase()
        .starts_with(IMAGE_MIME_PREFIX)
}
