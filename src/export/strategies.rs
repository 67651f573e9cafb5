//! Delivery strategies for rendered verdicts.
//!
//! The export service tries its strategies in order and stops at the first
//! success; each strategy is attempted at most once per export.

use super::view::VerdictView;
use crate::core::errors::ExportError;
use crate::core::traits::ClipboardSink;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Result of a successful or failed export.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The image was written to the clipboard.
    Copied,
    /// The image was saved to the given path.
    Downloaded(PathBuf),
    /// Nothing was delivered.
    Failed(ExportError),
}

impl ExportOutcome {
    /// Returns true unless the export failed.
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// One way of delivering a rendered verdict.
#[async_trait]
pub trait ExportStrategy: Send + Sync {
    /// Name used in log fields.
    fn name(&self) -> &'static str;

    /// Delivers `image`, returning `Copied` or `Downloaded` on success.
    async fn deliver(
        &self,
        image: &RgbImage,
        view: &VerdictView,
    ) -> Result<ExportOutcome, ExportError>;
}

/// Writes the image to the clipboard.
pub struct ClipboardStrategy {
    sink: Arc<dyn ClipboardSink>,
}

impl ClipboardStrategy {
    pub fn new(sink: Arc<dyn ClipboardSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ExportStrategy for ClipboardStrategy {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    async fn deliver(
        &self,
        image: &RgbImage,
        _view: &VerdictView,
    ) -> Result<ExportOutcome, ExportError> {
        self.sink.write_image(image).await?;
        Ok(ExportOutcome::Copied)
    }
}

/// Saves the image as a PNG file named after the identity and the date.
#[derive(Debug, Clone)]
pub struct DownloadStrategy {
    dir: PathBuf,
    prefix: String,
}

impl DownloadStrategy {
    /// Creates a strategy saving into `dir` with file names starting with `prefix`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl ExportStrategy for DownloadStrategy {
    fn name(&self) -> &'static str {
        "download"
    }

    async fn deliver(
        &self,
        image: &RgbImage,
        view: &VerdictView,
    ) -> Result<ExportOutcome, ExportError> {
        let png = encode_png(image)?;
        let file_name =
            download_file_name(&self.prefix, &view.claimed_identity, Utc::now().date_naive());
        let path = self.dir.join(file_name);

        tokio::fs::write(&path, &png)
            .await
            .map_err(|e| ExportError::download(&path, e))?;
        debug!(path = %path.display(), bytes = png.len(), "verdict image saved");
        Ok(ExportOutcome::Downloaded(path))
    }
}

/// Encodes an image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|source| ExportError::Encode { source })?;
    Ok(buffer.into_inner())
}

/// Builds `<prefix>_<identity>_<YYYY-MM-DD>.png`.
///
/// Characters that cannot appear in a file name on common platforms, and
/// whitespace, are replaced with `_`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use evidence_verifier::export::download_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// assert_eq!(
///     download_file_name("verification", "Dark Knight", date),
///     "verification_Dark_Knight_2026-10-16.png"
/// );
/// ```
pub fn download_file_name(prefix: &str, identity: &str, date: NaiveDate) -> String {
    let identity: String = identity
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{prefix}_{identity}_{}.png", date.format("%Y-%m-%d"))
}
