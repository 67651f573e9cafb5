//! Trait definitions for the collaborators the pipeline consumes.
//!
//! The OCR engine, the clipboard and the verdict renderer are external to
//! the pipeline. Each is reached through one trait so hosts can plug in
//! their own implementation and tests can substitute doubles.

pub mod export;
pub mod extraction;

pub use export::{ClipboardSink, NoClipboard, VerdictRenderer};
pub use extraction::TextExtractor;
