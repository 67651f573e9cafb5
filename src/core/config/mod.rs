//! Configuration management for the verification pipeline.
//!
//! This module provides the configuration types, validation traits, and
//! loading helpers shared by the rule engine, the extraction service and the
//! export service.

pub mod errors;
pub mod verification;

pub use errors::{ConfigError, ConfigValidator};
pub use verification::{ExportConfig, ExtractionConfig, RuleConfig, VerificationConfig};
