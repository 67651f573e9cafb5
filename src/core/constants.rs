//! Constants used throughout the verification pipeline.
//!
//! This module defines the default thresholds, language tags and export
//! settings shared by the rule engine, the extraction service and the
//! export service.

/// The default minimum cumulative kill count.
///
/// A kill-count screenshot is only accepted when the largest qualifying
/// number found in it is at least this value.
pub const DEFAULT_MIN_KILL_COUNT: u64 = 3000;

/// The default minimum length of a digit run.
///
/// Shorter runs are treated as UI chrome (levels, badges, clock digits)
/// and never considered as a kill count.
pub const DEFAULT_MIN_DIGIT_RUN: usize = 3;

/// The default OCR language tag passed to the text extraction service.
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// The default upscaling factor used when rasterizing a verdict view.
pub const DEFAULT_EXPORT_SCALE: u32 = 2;

/// The largest accepted export scale.
pub const MAX_EXPORT_SCALE: u32 = 8;

/// The default prefix of downloaded verdict files.
pub const DEFAULT_EXPORT_PREFIX: &str = "verification";

/// The default font size (in logical pixels) of the verdict card.
pub const DEFAULT_EXPORT_FONT_SIZE: f32 = 16.0;

/// The MIME type prefix every piece of evidence must carry.
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Candidate system fonts probed by the raster renderer when no font
/// path is configured.
pub const SYSTEM_FONT_PATHS: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];
