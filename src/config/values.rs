//! Values file loading and parsing
//!
//! A missing values file is advisory: the caller continues with an empty tree
//! and relies on overrides and defaults. A file that exists but cannot be read
//! or parsed is always fatal.

use crate::error::ConfigError;
use crate::system::System;
use anyhow::{Result, anyhow};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Untyped key/value tree loaded from a values file
pub type RawValues = Map<String, Value>;

static MODULE_EXPORT: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:module\.exports\s*=|export\s+default)\s*(\{.*\})\s*;?\s*$")
});

/// Values file format, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValuesFormat {
    Yaml,
    Json,
    /// JavaScript module exporting a static object literal
    Module,
}

impl ValuesFormat {
    /// Detect format by extension; unknown extensions are read as JSON
    #[must_use]
    #[inline]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Self::Yaml,
            Some("js" | "cjs" | "mjs") => Self::Module,
            _ => Self::Json,
        }
    }
}

/// Load a values file into a raw tree
///
/// # Errors
///
/// Returns an error if:
/// - The path exists but is not a readable file
/// - The file contents cannot be parsed in the detected format
#[inline]
pub fn load_values(system: &dyn System, path: &str) -> Result<RawValues> {
    let path_obj = Path::new(path);

    if !system.exists(path_obj) {
        warn!("Values file not found: {path}. Continuing with overrides and defaults only");
        return Ok(RawValues::new());
    }

    if !system.is_file(path_obj) {
        return Err(ConfigError::values_file(format!("Values path is not a file: {path}")).into());
    }

    let content = system.read_to_string(path_obj).map_err(|e| {
        ConfigError::values_file(format!("Failed to read values file {path}: {e}"))
    })?;

    let format = ValuesFormat::from_path(path_obj);
    debug!("Parsing values file {} as {:?}", path, format);

    parse_values(&content, format)
        .map_err(|e| ConfigError::values_file(format!("Failed to parse values file {path}: {e}")).into())
}

/// Parse values content in the given format
///
/// Blank or comment-only content yields an empty tree.
///
/// # Errors
///
/// Returns an error if the content is malformed or its top level is not a mapping
#[inline]
pub fn parse_values(content: &str, format: ValuesFormat) -> Result<RawValues> {
    if is_blank(content) {
        return Ok(RawValues::new());
    }

    let value = match format {
        ValuesFormat::Yaml => parse_yaml(content)?,
        ValuesFormat::Json => serde_json::from_str::<Value>(content).map_err(|e| {
            anyhow!("invalid JSON at line {}, column {}: {e}", e.line(), e.column())
        })?,
        ValuesFormat::Module => parse_yaml(&extract_module_export(content)?)?,
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(RawValues::new()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            Err(anyhow!("top level must be a mapping of keys to values"))
        }
    }
}

fn is_blank(content: &str) -> bool {
    content.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    })
}

fn parse_yaml(content: &str) -> Result<Value> {
    serde_yaml::from_str::<Value>(content).map_err(|e| {
        if let Some(location) = e.location() {
            anyhow!(
                "invalid YAML at line {}, column {}: {e}",
                location.line(),
                location.column()
            )
        } else {
            anyhow!("invalid YAML: {e}")
        }
    })
}

/// Pull the exported object literal out of a values module
///
/// Modules are never executed. Only `module.exports = { ... }` and
/// `export default { ... }` with a literal object are understood; the literal
/// is then read as a YAML flow mapping, which accepts JSON, single quotes,
/// unquoted keys and trailing commas.
fn extract_module_export(content: &str) -> Result<String> {
    let export = MODULE_EXPORT.as_ref().map_err(Clone::clone)?;
    let body: String = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");

    export
        .captures(&body)
        .and_then(|caps| caps.get(1))
        .map(|literal| literal.as_str().to_owned())
        .ok_or_else(|| {
            anyhow!("module must end with `module.exports = {{ ... }}` or `export default {{ ... }}`")
        })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_from_extension() {
        assert_eq!(ValuesFormat::from_path(Path::new("v.yaml")), ValuesFormat::Yaml);
        assert_eq!(ValuesFormat::from_path(Path::new("v.YML")), ValuesFormat::Yaml);
        assert_eq!(ValuesFormat::from_path(Path::new("v.js")), ValuesFormat::Module);
        assert_eq!(ValuesFormat::from_path(Path::new("v.json")), ValuesFormat::Json);
        assert_eq!(ValuesFormat::from_path(Path::new("values")), ValuesFormat::Json);
    }

    #[test]
    fn blank_content_is_empty() {
        assert!(parse_values("", ValuesFormat::Yaml).unwrap().is_empty());
        assert!(parse_values("# nothing\n\n", ValuesFormat::Yaml).unwrap().is_empty());
        assert!(parse_values("  \n", ValuesFormat::Json).unwrap().is_empty());
    }

    #[test]
    fn yaml_mapping_parses() {
        let values = parse_values("vpcId: vpc-1\ncpu: 512\n", ValuesFormat::Yaml).unwrap();
        assert_eq!(values.get("vpcId"), Some(&json!("vpc-1")));
        assert_eq!(values.get("cpu"), Some(&json!(512)));
    }

    #[test]
    fn top_level_list_is_rejected() {
        let err = parse_values("- a\n- b\n", ValuesFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("top level must be a mapping"));
    }

    #[test]
    fn json_errors_carry_location() {
        let err = parse_values("{\n  \"vpcId\": \n}", ValuesFormat::Json).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn module_export_is_read_without_execution() {
        let module = r"// deployment values
module.exports = {
  vpcId: 'vpc-1',
  cpu: 512,
  subnetIds: ['subnet-a', 'subnet-b'],
};
";
        let values = parse_values(module, ValuesFormat::Module).unwrap();
        assert_eq!(values.get("vpcId"), Some(&json!("vpc-1")));
        assert_eq!(values.get("cpu"), Some(&json!(512)));
        assert_eq!(values.get("subnetIds"), Some(&json!(["subnet-a", "subnet-b"])));
    }

    #[test]
    fn module_export_default() {
        let values = parse_values(
            r#"export default { "cluster": { "name": "c1" } }"#,
            ValuesFormat::Module,
        )
        .unwrap();
        assert_eq!(values.get("cluster"), Some(&json!({ "name": "c1" })));
    }

    #[test]
    fn module_without_export_fails() {
        let err = parse_values("const x = 1;", ValuesFormat::Module).unwrap_err();
        assert!(err.to_string().contains("module must end with"));
    }
}
