//! Configuration error types and validation traits.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that a configured path does not exist.
    #[error("path does not exist: {}", path.display())]
    PathNotFound { path: std::path::PathBuf },

    /// Error indicating that a configuration file could not be read.
    #[error("failed to read configuration file {}", path.display())]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error indicating that the configuration could not be parsed.
    #[error("failed to parse configuration")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

/// A trait for validating configuration parameters.
///
/// Configuration types implement this to reject values the pipeline cannot
/// honour before any evidence is processed.
pub trait ConfigValidator {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// A Result indicating success or a ConfigError if validation fails.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates that a value lies in an inclusive range.
    fn validate_range<T>(&self, name: &str, value: T, min: T, max: T) -> Result<(), ConfigError>
    where
        T: PartialOrd + std::fmt::Display,
    {
        if value < min || value > max {
            Err(ConfigError::InvalidConfig {
                message: format!("{name} must be between {min} and {max}, got {value}"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that a string value is not blank.
    fn validate_non_blank(&self, name: &str, value: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            Err(ConfigError::InvalidConfig {
                message: format!("{name} must not be empty"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that a path exists and is a file.
    fn validate_file(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            })
        } else if !path.is_file() {
            Err(ConfigError::InvalidConfig {
                message: format!("not a file: {}", path.display()),
            })
        } else {
            Ok(())
        }
    }
}
