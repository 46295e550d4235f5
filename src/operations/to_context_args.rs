//! Convert a flat configuration back into context arguments
//!
//! The output reproduces the same configuration when passed to `ecsconf`
//! without a values file.

use core::str::FromStr;

use crate::config::legacy::LegacyConfig;
use crate::config::overrides::{ENV_PREFIX, SECRET_PREFIX};
use crate::error::ConfigError;
use anyhow::Result;
use serde_json::Value;

/// Output format for the argument list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArgsFormat {
    /// Shell-escaped command ready to execute
    #[default]
    Shell,
    /// JSON array of arguments
    Json,
}

impl FromStr for ArgsFormat {
    type Err = ConfigError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shell" => Ok(Self::Shell),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::configuration(format!(
                "Invalid format: {s}. Use 'shell' or 'json'"
            ))),
        }
    }
}

/// Convert a flat configuration to an `ecsconf` invocation
///
/// # Errors
///
/// Returns an error if:
/// - The configuration cannot be converted to arguments
/// - The arguments cannot be serialized to the requested format
#[inline]
pub fn generate_context_args(config: &LegacyConfig, format: ArgsFormat) -> Result<String> {
    let args = build_context_args(config)?;

    match format {
        ArgsFormat::Shell => Ok(format_as_shell(&args)),
        ArgsFormat::Json => format_as_json(&args),
    }
}

/// Build argument list from configuration
fn build_context_args(config: &LegacyConfig) -> Result<Vec<String>> {
    let mut args = vec!["ecsconf".to_owned()];

    let Value::Object(fields) = serde_json::to_value(config)? else {
        return Ok(args);
    };

    for (key, value) in &fields {
        match (key.as_str(), value) {
            ("environment", &Value::Object(ref map)) => add_named(&mut args, ENV_PREFIX, map),
            ("secrets", &Value::Object(ref map)) => add_named(&mut args, SECRET_PREFIX, map),
            _ => add_field(&mut args, key, value)?,
        }
    }

    Ok(args)
}

/// Scalars and plain lists go through `--context`, anything nested through `--context-json`
fn add_field(args: &mut Vec<String>, key: &str, value: &Value) -> Result<()> {
    match *value {
        Value::Null => {}
        Value::String(ref text) => push_context(args, key, text),
        Value::Bool(_) | Value::Number(_) => push_context(args, key, &value.to_string()),
        Value::Array(ref items) if items.iter().all(Value::is_string) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(",");
            push_context(args, key, &joined);
        }
        Value::Array(_) | Value::Object(_) => {
            args.push("--context-json".to_owned());
            args.push(format!("{key}={}", serde_json::to_string(value)?));
        }
    }
    Ok(())
}

fn add_named(args: &mut Vec<String>, prefix: &str, map: &serde_json::Map<String, Value>) {
    for (name, value) in map {
        if let Some(text) = value.as_str() {
            push_context(args, &format!("{prefix}{name}"), text);
        }
    }
}

fn push_context(args: &mut Vec<String>, key: &str, value: &str) {
    args.push("--context".to_owned());
    args.push(format!("{key}={value}"));
}

/// Format arguments as a shell command with proper escaping
fn format_as_shell(args: &[String]) -> String {
    let mut output = String::new();

    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            output.push_str(" \\\n  ");
        }
        output.push_str(&shell_escape(arg));
    }

    output
}

/// Format arguments as JSON array
fn format_as_json(args: &[String]) -> Result<String> {
    serde_json::to_string_pretty(args)
        .map_err(|e| anyhow::anyhow!("Failed to serialize to JSON: {e}"))
}

/// Escape a string for shell execution
/// Uses double quotes, escaping special characters inside
fn shell_escape(s: &str) -> String {
    if !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.' | ':' | '=' | ',')
        })
    {
        return s.to_owned();
    }

    let mut result = String::from('"');
    for ch in s.chars() {
        match ch {
            '"' => result.push_str(r#"\""#),
            '\\' => result.push_str(r"\\"),
            '$' => result.push_str(r"\$"),
            '`' => result.push_str(r"\`"),
            '!' => result.push_str(r"\!"),
            _ => result.push(ch),
        }
    }
    result.push('"');
    result
}
