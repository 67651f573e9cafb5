//! Image ingestion.
//!
//! Normalizes file-picker selections, drag-and-drop payloads and clipboard
//! reads into one [`EvidenceImage`]. Ingestion never touches the wizard; the
//! orchestrator decides what to do with the evidence.
//!
//! ```rust
//! use evidence_verifier::ingestion::{acquire, IngestionSource, SelectedFile};
//!
//! let dropped = vec![
//!     SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec()),
//!     SelectedFile::new("kills.png", "image/png", vec![0x89u8, b'P', b'N', b'G']),
//! ];
//! let evidence = acquire(IngestionSource::DropEvent(dropped)).unwrap();
//! assert_eq!(evidence.filename(), "kills.png");
//! ```

mod source;

pub use source::{
    ClipboardContents, ClipboardItem, ClipboardRepresentation, IngestionSource, SelectedFile,
};

use crate::core::errors::IngestionError;
use crate::domain::EvidenceImage;
use crate::domain::evidence::is_image_mime;
use image::ImageFormat;
use tracing::{debug, info, warn};

/// Turns a host payload into evidence.
///
/// # Errors
///
/// * `NotAnImage` - the picked file, or every dropped file, is not an image
/// * `NoImageInClipboard` - the clipboard holds no image representation
/// * `PermissionDenied` - the host refused clipboard access
/// * `EmptyPayload` - nothing was dropped, or the image has no bytes
pub fn acquire(source: IngestionSource) -> Result<EvidenceImage, IngestionError> {
    let result = match source {
        IngestionSource::FilePicker(file) => from_file(file),
        IngestionSource::DropEvent(files) => from_drop(files),
        IngestionSource::ClipboardRead(contents) => from_clipboard(contents),
    };

    match &result {
        Ok(evidence) => info!(
            filename = evidence.filename(),
            mime_type = evidence.mime_type(),
            bytes = evidence.len(),
            "evidence ingested"
        ),
        Err(error) => warn!(error = %error, "evidence rejected"),
    }
    result
}

fn from_file(file: SelectedFile) -> Result<EvidenceImage, IngestionError> {
    let mime_type = resolve_mime(&file.mime_type, &file.bytes);
    EvidenceImage::new(file.bytes, mime_type, file.filename)
}

fn from_drop(files: Vec<SelectedFile>) -> Result<EvidenceImage, IngestionError> {
    if files.is_empty() {
        return Err(IngestionError::empty("drop event carried no files"));
    }

    let mut rejected = Vec::new();
    let mut empty_images = 0usize;
    for file in files {
        let mime_type = resolve_mime(&file.mime_type, &file.bytes);
        if is_image_mime(&mime_type) {
            if file.bytes.is_empty() {
                debug!(filename = %file.filename, "ignoring empty dropped image");
                empty_images += 1;
                continue;
            }
            return EvidenceImage::new(file.bytes, mime_type, file.filename);
        }
        debug!(filename = %file.filename, mime_type = %mime_type, "ignoring dropped non-image file");
        rejected.push(if mime_type.is_empty() {
            "unknown".to_string()
        } else {
            mime_type
        });
    }
    if empty_images > 0 {
        return Err(IngestionError::empty("every dropped image was empty"));
    }
    Err(IngestionError::not_an_image(rejected.join(", ")))
}

fn from_clipboard(contents: ClipboardContents) -> Result<EvidenceImage, IngestionError> {
    let items = match contents {
        ClipboardContents::Denied => return Err(IngestionError::PermissionDenied),
        ClipboardContents::Items(items) => items,
    };

    let representation = items
        .into_iter()
        .flat_map(|item| item.representations)
        .find(|repr| is_image_mime(&repr.mime_type))
        .ok_or(IngestionError::NoImageInClipboard)?;

    let filename = clipboard_filename(&representation.mime_type);
    EvidenceImage::new(representation.bytes, representation.mime_type, filename)
}

/// Uses the declared MIME type, or sniffs one from the content when the
/// host declared none.
fn resolve_mime(declared: &str, bytes: &[u8]) -> String {
    let declared = declared.trim();
    if !declared.is_empty() {
        return declared.to_string();
    }
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => String::new(),
    }
}

fn clipboard_filename(mime_type: &str) -> String {
    let extension = ImageFormat::from_mime_type(mime_type)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("img");
    format!("clipboard.{extension}")
}
