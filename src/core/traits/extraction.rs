//! Text extraction trait.

use crate::core::errors::ExtractionError;
use crate::domain::EvidenceImage;
use async_trait::async_trait;
use std::sync::Arc;

/// An OCR engine that turns an evidence image into raw text.
///
/// Implementations may fail freely; the pipeline never calls an extractor
/// directly but always through [`crate::extraction::ExtractionService`],
/// which absorbs failures into empty text.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use evidence_verifier::core::errors::ExtractionError;
/// use evidence_verifier::core::traits::TextExtractor;
/// use evidence_verifier::domain::EvidenceImage;
///
/// struct FixedText(&'static str);
///
/// #[async_trait]
/// impl TextExtractor for FixedText {
///     async fn extract_text(
///         &self,
///         _image: &EvidenceImage,
///         _language: &str,
///     ) -> Result<String, ExtractionError> {
///         Ok(self.0.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Name used in log fields.
    fn name(&self) -> &str {
        "text-extractor"
    }

    /// Recognizes the text in `image` using the given language tag.
    async fn extract_text(
        &self,
        image: &EvidenceImage,
        language: &str,
    ) -> Result<String, ExtractionError>;
}

#[async_trait]
impl<T: TextExtractor + ?Sized> TextExtractor for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn extract_text(
        &self,
        image: &EvidenceImage,
        language: &str,
    ) -> Result<String, ExtractionError> {
        (**self).extract_text(image, language).await
    }
}
