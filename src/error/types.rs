//! Custom error types with exit codes

use core::fmt;
use thiserror::Error;

/// A required field that could not be resolved from any source
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct MissingField {
    /// Dotted path in the structured layout (e.g. `infrastructure.vpc.id`)
    pub path: &'static str,

    /// Equivalent flat key accepted as a `--context` override
    pub legacy_key: &'static str,
}

impl MissingField {
    #[must_use]
    #[inline]
    pub const fn new(path: &'static str, legacy_key: &'static str) -> Self {
        Self { path, legacy_key }
    }
}

impl fmt::Display for MissingField {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: provide `--context {}=<value>` or set `{}` in the values file",
            self.path, self.legacy_key, self.path
        )
    }
}

/// Main error type for ecsconf operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// Configuration Error - malformed invocation input
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Values File Error - values file exists but cannot be read or parsed
    #[error("Values file error: {message}")]
    ValuesFile { message: String },

    /// Missing Required - one or more required fields resolved to nothing
    #[error("Missing required configuration:\n{}", format_missing(.fields))]
    MissingRequired { fields: Vec<MissingField> },
}

fn format_missing(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConfigError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::ValuesFile { .. } => 2,
            Self::MissingRequired { .. } => 3,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a values file error
    #[inline]
    pub fn values_file<S: Into<String>>(message: S) -> Self {
        Self::ValuesFile {
            message: message.into(),
        }
    }

    /// Create an aggregated missing-field error
    #[inline]
    #[must_use]
    pub const fn missing_required(fields: Vec<MissingField>) -> Self {
        Self::MissingRequired { fields }
    }

    /// Dotted paths of the missing fields, empty for other variants
    #[must_use]
    #[inline]
    pub fn missing_paths(&self) -> Vec<&'static str> {
        match *self {
            Self::MissingRequired { ref fields } => fields.iter().map(|f| f.path).collect(),
            Self::Configuration { .. } | Self::ValuesFile { .. } => Vec::new(),
        }
    }
}
