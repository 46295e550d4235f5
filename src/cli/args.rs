use crate::error::ConfigError;
use clap::Parser;
use serde_json::Value;

/// Command-line arguments for ecsconf
#[derive(Parser, Debug, Clone)]
#[command(name = "ecsconf")]
#[command(about = "Resolve container service configuration from a values file and context overrides")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Values file path (YAML, JSON or a static JS module)
    #[arg(long, value_name = "PATH", default_value = "./values.yaml")]
    pub values: String,

    /// Deployment identifier, used when no metadata name is configured
    #[arg(long, value_name = "ID", default_value = "ecs-service")]
    pub name: String,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output the flat legacy projection instead of the resolved configuration
    #[arg(long = "to-legacy", conflicts_with = "to_context_args")]
    pub to_legacy: bool,

    /// Output the equivalent --context invocation instead of the resolved configuration
    #[arg(long = "to-context-args", conflicts_with = "to_legacy")]
    pub to_context_args: bool,

    /// Output format for the resolved or legacy configuration: yaml or json
    #[arg(long = "output-format", value_name = "FORMAT", default_value = "yaml")]
    pub output_format: String,

    /// Output format for to-context-args: shell or json
    #[arg(
        long = "args-format",
        value_name = "FORMAT",
        default_value = "shell",
        requires = "to_context_args"
    )]
    pub args_format: String,

    /// Override values in KEY=VALUE format (can be specified multiple times)
    /// Later values for the same key win
    #[arg(long = "context", value_name = "KEY=VALUE")]
    pub context: Vec<String>,

    /// Override values as JSON in KEY=JSON format (can be specified multiple times)
    /// Use this for whole structured domains such as taskDefinition
    #[arg(long = "context-json", value_name = "KEY=JSON")]
    pub context_json: Vec<String>,
}

impl Args {
    /// Parse context arguments into ordered entries
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is not `KEY=VALUE` or its JSON is invalid
    #[inline]
    pub fn parse_context(&self) -> anyhow::Result<Vec<(String, Value)>> {
        parse_context_args(&self.context, &self.context_json)
    }
}

/// Parse context arguments from CLI into ordered `(key, value)` entries
///
/// `--context` entries come first, then `--context-json`, each in invocation
/// order, so a later entry for the same key overrides an earlier one.
fn parse_context_args(
    context_args: &[String],
    context_json_args: &[String],
) -> anyhow::Result<Vec<(String, Value)>> {
    let mut entries = Vec::with_capacity(context_args.len() + context_json_args.len());

    for arg in context_args {
        let (key, value) = parse_key_value(arg)?;
        entries.push((key, Value::String(value)));
    }

    for arg in context_json_args {
        let (key, json_str) = parse_key_value(arg)?;
        let value: Value = serde_json::from_str(&json_str).map_err(|e| {
            ConfigError::configuration(format!(
                "Invalid JSON in --context-json for key '{key}': {e}\nValue: {json_str}"
            ))
        })?;
        entries.push((key, value));
    }

    Ok(entries)
}

/// Parse KEY=VALUE string
fn parse_key_value(arg: &str) -> anyhow::Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        Some(_) | None => Err(ConfigError::configuration(format!(
            "Invalid context format '{arg}'. Expected KEY=VALUE"
        ))
        .into()),
    }
}
