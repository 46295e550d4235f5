//! Rendering of resolved and legacy configuration

use core::str::FromStr;

use crate::error::ConfigError;
use anyhow::Result;
use serde::Serialize;

/// Output format for configuration documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputFormat {
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::configuration(format!(
                "Invalid format: {s}. Use 'yaml' or 'json'"
            ))),
        }
    }
}

/// Serialize a configuration document in the requested format
///
/// # Errors
///
/// Returns an error if the value cannot be serialized
#[inline]
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| anyhow::anyhow!("Failed to serialize to YAML: {e}")),
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| anyhow::anyhow!("Failed to serialize to JSON: {e}")),
    }
}
