//! Verification pipeline configuration.
//!
//! All sections default to the values in [`crate::core::constants`] and can
//! be loaded from JSON:
//!
//! ```rust
//! use evidence_verifier::core::config::{ConfigValidator, VerificationConfig};
//!
//! let config = VerificationConfig::from_json_str(r#"
//! {
//!   "rules": { "min_kill_count": 5000 },
//!   "extraction": { "timeout_ms": 15000 },
//!   "export": { "file_prefix": "eligibility" }
//! }
//! "#).unwrap();
//!
//! assert_eq!(config.rules.min_kill_count, 5000);
//! assert_eq!(config.rules.min_digit_run, 3);
//! assert!(config.validate().is_ok());
//! ```

use super::errors::{ConfigError, ConfigValidator};
use crate::core::constants::{
    DEFAULT_EXPORT_FONT_SIZE, DEFAULT_EXPORT_PREFIX, DEFAULT_EXPORT_SCALE, DEFAULT_MIN_DIGIT_RUN,
    DEFAULT_MIN_KILL_COUNT, DEFAULT_OCR_LANGUAGE, MAX_EXPORT_SCALE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Thresholds applied by the rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Minimum cumulative kill count for the kill-count stage to pass.
    pub min_kill_count: u64,
    /// Minimum length of a digit run to be considered a number.
    pub min_digit_run: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_kill_count: DEFAULT_MIN_KILL_COUNT,
            min_digit_run: DEFAULT_MIN_DIGIT_RUN,
        }
    }
}

impl ConfigValidator for RuleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_digit_run == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "min_digit_run must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings forwarded to the text extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// OCR language tag.
    pub language: String,
    /// Optional upper bound on a single extraction, in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl ExtractionConfig {
    /// Returns the configured timeout as a `Duration`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            timeout_ms: None,
        }
    }
}

impl ConfigValidator for ExtractionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_non_blank("language", &self.language)?;
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::InvalidConfig {
                message: "timeout_ms must be greater than 0 when set".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings for rendering and delivering the verdict image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Upscaling factor applied when rasterizing the verdict view.
    pub scale: u32,
    /// Prefix of downloaded files.
    pub file_prefix: String,
    /// Directory downloads are written to.
    pub download_dir: PathBuf,
    /// Font used for the verdict card. System fonts are probed when unset.
    pub font_path: Option<PathBuf>,
    /// Font size in logical (unscaled) pixels.
    pub font_size: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_EXPORT_SCALE,
            file_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            download_dir: PathBuf::from("."),
            font_path: None,
            font_size: DEFAULT_EXPORT_FONT_SIZE,
        }
    }
}

impl ConfigValidator for ExportConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_range("scale", self.scale, 1, MAX_EXPORT_SCALE)?;
        self.validate_range("font_size", self.font_size, 4.0, 128.0)?;
        self.validate_non_blank("file_prefix", &self.file_prefix)?;
        if let Some(font_path) = &self.font_path {
            self.validate_file(font_path)?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Top-level configuration of a verification session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub rules: RuleConfig,
    pub extraction: ExtractionConfig,
    pub export: ExportConfig,
}

impl VerificationConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse { source })
    }

    /// Reads and parses a JSON configuration file, then validates it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the minimum kill count.
    pub fn with_min_kill_count(mut self, min_kill_count: u64) -> Self {
        self.rules.min_kill_count = min_kill_count;
        self
    }

    /// Sets the minimum digit run length.
    pub fn with_min_digit_run(mut self, min_digit_run: usize) -> Self {
        self.rules.min_digit_run = min_digit_run;
        self
    }

    /// Sets the extraction timeout.
    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Sets the download directory.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export.download_dir = dir.into();
        self
    }

    /// Sets the export scale.
    pub fn with_export_scale(mut self, scale: u32) -> Self {
        self.export.scale = scale;
        self
    }
}

impl ConfigValidator for VerificationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;
        self.extraction.validate()?;
        self.export.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VerificationConfig::get_defaults();
        assert!(config.validate().is_ok());
        assert_eq!(config.rules.min_kill_count, 3000);
        assert_eq!(config.rules.min_digit_run, 3);
        assert_eq!(config.extraction.language, "eng");
        assert_eq!(config.export.scale, 2);
        assert_eq!(config.extraction.timeout(), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = VerificationConfig::from_json_str(r#"{"export": {"scale": 3}}"#).unwrap();
        assert_eq!(config.export.scale, 3);
        assert_eq!(config.export.file_prefix, "verification");
        assert_eq!(config.rules, RuleConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(VerificationConfig::new().with_min_digit_run(0).validate().is_err());
        assert!(VerificationConfig::new().with_export_scale(0).validate().is_err());
        assert!(VerificationConfig::new().with_export_scale(9).validate().is_err());

        let mut config = VerificationConfig::new();
        config.extraction.timeout_ms = Some(0);
        assert!(config.validate().is_err());

        config = VerificationConfig::new();
        config.extraction.language = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = VerificationConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"rules": {"min_kill_count": 1234}}"#).unwrap();

        let config = VerificationConfig::from_file(&path).unwrap();
        assert_eq!(config.rules.min_kill_count, 1234);

        let missing = VerificationConfig::from_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
