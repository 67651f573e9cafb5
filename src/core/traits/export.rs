//! Rendering and clipboard traits used by the export service.

use crate::core::errors::ExportError;
use crate::export::VerdictView;
use async_trait::async_trait;
use image::RgbImage;

/// Rasterizes a verdict view.
///
/// Implementations must paint an opaque background; the exported artifact
/// is shared outside the application and must not inherit any theme.
pub trait VerdictRenderer: Send + Sync {
    /// Renders `view` at `scale` times its logical size.
    fn render(&self, view: &VerdictView, scale: u32) -> Result<RgbImage, ExportError>;
}

/// Destination for writing an image to the system clipboard.
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    /// Writes the image as an image resource.
    ///
    /// Returns `ExportError::ClipboardDenied` or
    /// `ExportError::ClipboardUnsupported` when the host refuses.
    async fn write_image(&self, image: &RgbImage) -> Result<(), ExportError>;
}

/// Clipboard sink for environments without clipboard access.
///
/// Every write reports `ClipboardUnsupported`, so the export chain always
/// falls through to the next strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

#[async_trait]
impl ClipboardSink for NoClipboard {
    async fn write_image(&self, _image: &RgbImage) -> Result<(), ExportError> {
        Err(ExportError::ClipboardUnsupported)
    }
}
