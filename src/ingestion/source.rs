//! Payload types delivered by the host for each ingestion channel.

use crate::core::errors::IngestionError;
use std::path::Path;

/// A file chosen in a file picker or dropped onto the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub filename: String,
    /// Declared MIME type; may be empty when the host could not tell.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Creates a selected file from its parts.
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, declaring the MIME type from its extension.
    ///
    /// Unknown extensions leave the MIME type empty; it is sniffed from the
    /// content during acquisition.
    pub fn from_path(path: &Path) -> Result<Self, IngestionError> {
        let bytes = std::fs::read(path).map_err(|e| IngestionError::io(path, e))?;
        let mime_type = match image::ImageFormat::from_path(path) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(_) => String::new(),
        };
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            filename,
            mime_type,
            bytes,
        })
    }
}

/// One representation of a clipboard item (an item may offer several).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardRepresentation {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ClipboardRepresentation {
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// A clipboard item with its available representations, in host order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardItem {
    pub representations: Vec<ClipboardRepresentation>,
}

impl ClipboardItem {
    pub fn new(representations: Vec<ClipboardRepresentation>) -> Self {
        Self { representations }
    }
}

/// Result of the host's attempt to read the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardContents {
    /// The host refused clipboard access.
    Denied,
    /// The clipboard was read; it may hold no image at all.
    Items(Vec<ClipboardItem>),
}

/// Where a piece of evidence comes from.
///
/// All three channels are equivalent sources of exactly one evidence image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionSource {
    /// A file chosen through a file picker.
    FilePicker(SelectedFile),
    /// Every file of a drop event, in drop order.
    DropEvent(Vec<SelectedFile>),
    /// A clipboard paste or explicit clipboard read.
    ClipboardRead(ClipboardContents),
}
