//! Result export.
//!
//! Renders a [`VerdictView`] into a raster image and delivers it: clipboard
//! first, file download as fallback. The fallback chain is an ordered list
//! of [`ExportStrategy`] values, each attempted once.

mod render;
mod service;
mod strategies;
mod view;

pub use render::RasterVerdictRenderer;
pub use service::ExportService;
pub use strategies::{
    ClipboardStrategy, DownloadStrategy, ExportOutcome, ExportStrategy, download_file_name,
    encode_png,
};
pub use view::{VerdictView, ViewRow};
