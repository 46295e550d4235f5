//! End-to-end resolution pipeline
//!
//! `START → FILE_LOADED → OVERRIDES_APPLIED → DEFAULTS_APPLIED → VALIDATED → DONE`
//!
//! The pipeline fails only after loading (unparseable values file) or at
//! validation (missing required fields).

use crate::cli::Args;
use crate::config::coerce::describe;
use crate::config::legacy::LegacyConfig;
use crate::config::overrides::Overrides;
use crate::config::resolved::ResolvedConfig;
use crate::config::resolver::{ResolveInput, resolve};
use crate::config::shape::ValuesDocument;
use crate::config::values::load_values;
use crate::error::ConfigError;
use crate::system::System;
use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Coordinates one resolution pass
#[non_exhaustive]
pub struct ResolveOperation<'src> {
    values_path: String,
    deployment_name: String,
    overrides: Overrides,
    system: &'src dyn System,
}

impl<'src> ResolveOperation<'src> {
    /// Create a resolve operation from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if a `--context` or `--context-json` argument is malformed
    #[inline]
    pub fn new(args: &Args, system: &'src dyn System) -> Result<Self> {
        let context = args.parse_context()?;
        Ok(Self::from_parts(&args.values, &args.name, context, system))
    }

    /// Create a resolve operation from already parsed inputs
    #[must_use]
    #[inline]
    pub fn from_parts<I>(
        values_path: &str,
        deployment_name: &str,
        context: I,
        system: &'src dyn System,
    ) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self {
            values_path: values_path.to_owned(),
            deployment_name: deployment_name.to_owned(),
            overrides: Overrides::from_context(context),
            system,
        }
    }

    /// Run the whole pipeline
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The values file exists but cannot be read or parsed
    /// - A values branch has the wrong type for its layout
    /// - Required fields are missing after all sources are consulted
    #[inline]
    pub fn execute(&self) -> Result<ResolvedConfig> {
        let values = self.load()?;

        let input = ResolveInput {
            values,
            overrides: self.overrides.clone(),
            deployment_name: self.deployment_name.clone(),
        };
        let resolved = resolve(&input)?;
        debug!("Stage VALIDATED");

        info!(
            "Resolved configuration for '{}' ({} container(s))",
            resolved.metadata.name,
            resolved.task_definition.containers.len()
        );
        debug!("Stage DONE");
        Ok(resolved)
    }

    /// Flat view of the merged input, with legacy and ambient overrides folded in
    ///
    /// No defaults are applied and nothing is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the values file cannot be loaded or an override
    /// produces a value of the wrong type
    #[inline]
    pub fn legacy_view(&self) -> Result<LegacyConfig> {
        let values = self.load()?;
        merge_legacy_overrides(values, &self.overrides)
    }

    /// Load, apply structured overrides and project to the flat layout
    fn load(&self) -> Result<LegacyConfig> {
        let location = self.system.current_dir().map_or_else(
            |_| PathBuf::from(&self.values_path),
            |cwd| cwd.join(&self.values_path),
        );
        debug!("Stage START: values file {}", location.display());
        let raw = load_values(self.system, &location.to_string_lossy())?;
        debug!("Stage FILE_LOADED: {} top-level key(s)", raw.len());

        let document = ValuesDocument::classify(raw)?;
        debug!("Detected {:?} layout", document.shape());
        let mut config = document.into_legacy();
        self.overrides.apply_structured(&mut config)?;
        debug!("Stage OVERRIDES_APPLIED");

        Ok(config)
    }
}

/// Fold legacy and ambient overrides into a flat configuration
///
/// # Errors
///
/// Returns `ConfigError::Configuration` if an override cannot be read as the
/// field it names
#[inline]
pub fn merge_legacy_overrides(config: LegacyConfig, overrides: &Overrides) -> Result<LegacyConfig> {
    let Value::Object(mut tree) = serde_json::to_value(config)? else {
        return Err(ConfigError::configuration("Legacy configuration is not a mapping").into());
    };

    for (key, value) in overrides.legacy_entries() {
        let value = match *value {
            Value::String(ref text) => match serde_json::from_str::<Value>(text) {
                Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
                Ok(Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) | Err(_) => {
                    value.clone()
                }
            },
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
                value.clone()
            }
        };
        debug!("Legacy override {key}={}", describe(&value));
        tree.insert(key.to_owned(), value);
    }

    merge_named(&mut tree, "environment", overrides.environment());
    merge_named(&mut tree, "secrets", overrides.secrets());

    serde_json::from_value(Value::Object(tree))
        .map_err(|e| ConfigError::configuration(format!("Invalid override: {e}")).into())
}

fn merge_named(
    tree: &mut Map<String, Value>,
    field: &str,
    ambient: &BTreeMap<String, String>,
) {
    if ambient.is_empty() {
        return;
    }
    let entry = tree
        .entry(field.to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(ref mut map) = *entry {
        for (name, value) in ambient {
            map.insert(name.clone(), Value::String(value.clone()));
        }
    } else {
        warn!("'{field}' is not a mapping; keeping only the prefixed overrides");
        *entry = Value::Object(
            ambient
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        );
    }
}
