//! Invocation-time overrides
//!
//! Context entries are sorted into tiers by key:
//! - structured domains (`taskDefinition`, `loadBalancer`, ...) replace every
//!   flat field projected from the matching branch
//! - `env:NAME` / `secret:NAME` feed the primary container's environment and
//!   secrets
//! - every other key overrides a single legacy flat field
//!
//! Within a tier the latest entry for a key wins. Null values never clobber.

use crate::config::coerce::{describe, to_text};
use crate::config::legacy::LegacyConfig;
use crate::config::mapper::{replace_domain, structured_to_legacy};
use crate::config::shape::is_structured_domain;
use crate::config::structured::StructuredConfig;
use crate::config::values::RawValues;
use crate::error::ConfigError;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Prefix for container environment variable overrides
pub const ENV_PREFIX: &str = "env:";
/// Prefix for container secret overrides
pub const SECRET_PREFIX: &str = "secret:";

/// Precedence tier of a single override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OverrideTier {
    Structured,
    Legacy,
    Environment,
    Secret,
}

impl OverrideTier {
    /// Classify a context key
    #[must_use]
    #[inline]
    pub fn of(key: &str) -> Self {
        if key.starts_with(ENV_PREFIX) {
            Self::Environment
        } else if key.starts_with(SECRET_PREFIX) {
            Self::Secret
        } else if is_structured_domain(key) {
            Self::Structured
        } else {
            Self::Legacy
        }
    }
}

/// All overrides supplied for one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    structured: BTreeMap<String, RawValues>,
    legacy: HashMap<String, Value>,
    environment: BTreeMap<String, String>,
    secrets: BTreeMap<String, String>,
}

impl Overrides {
    /// Build overrides from ordered `(key, value)` context entries
    #[must_use]
    #[inline]
    pub fn from_context<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut overrides = Self::default();
        for (key, value) in entries {
            overrides.insert(key, value);
        }
        overrides
    }

    /// Record one override, latest wins
    #[inline]
    pub fn insert(&mut self, key: String, value: Value) {
        if value.is_null() {
            debug!("Skipping null override for '{key}'");
            return;
        }

        match OverrideTier::of(&key) {
            OverrideTier::Structured => {
                if let Some(branch) = structured_branch(&key, value) {
                    self.structured.insert(key, branch);
                }
            }
            OverrideTier::Environment => {
                insert_named(&mut self.environment, &key, ENV_PREFIX, &value);
            }
            OverrideTier::Secret => {
                insert_named(&mut self.secrets, &key, SECRET_PREFIX, &value);
            }
            OverrideTier::Legacy => {
                self.legacy.insert(key, value);
            }
        }
    }

    /// Replace the flat fields of every overridden domain
    ///
    /// Each branch is projected on its own, so fields of the file's other
    /// domains survive whichever layout the file used.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a branch does not fit its domain
    #[inline]
    pub fn apply_structured(&self, config: &mut LegacyConfig) -> Result<(), ConfigError> {
        for (key, branch) in &self.structured {
            let mut tree = RawValues::new();
            tree.insert(key.clone(), Value::Object(branch.clone()));
            let partial: StructuredConfig =
                serde_json::from_value(Value::Object(tree)).map_err(|e| {
                    ConfigError::configuration(format!("Invalid override for '{key}': {e}"))
                })?;
            debug!("Structured override replaces '{key}'");
            replace_domain(config, key, structured_to_legacy(&partial));
        }
        Ok(())
    }

    /// Legacy override for a flat key, if one was given
    #[must_use]
    #[inline]
    pub fn legacy(&self, key: &str) -> Option<&Value> {
        self.legacy.get(key)
    }

    /// All legacy overrides, in key order
    #[must_use]
    #[inline]
    pub fn legacy_entries(&self) -> Vec<(&str, &Value)> {
        let mut entries: Vec<(&str, &Value)> =
            self.legacy.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_unstable_by_key(|&(key, _)| key);
        entries
    }

    /// `env:` overrides, by variable name
    #[must_use]
    #[inline]
    pub const fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// `secret:` overrides, by secret name
    #[must_use]
    #[inline]
    pub const fn secrets(&self) -> &BTreeMap<String, String> {
        &self.secrets
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.structured.is_empty()
            && self.legacy.is_empty()
            && self.environment.is_empty()
            && self.secrets.is_empty()
    }
}

/// Structured payloads arrive either as objects or as JSON text
fn structured_branch(key: &str, value: Value) -> Option<RawValues> {
    let parsed = match value {
        Value::String(ref text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Ignoring override '{key}': {} is not valid JSON ({e})", describe(&value));
                return None;
            }
        },
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value
        }
    };

    match parsed {
        Value::Object(map) => Some(map),
        Value::Null => None,
        Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            warn!("Ignoring override '{key}': expected an object, got {}", describe(&parsed));
            None
        }
    }
}

fn insert_named(target: &mut BTreeMap<String, String>, key: &str, prefix: &str, value: &Value) {
    let name = key.trim_start_matches(prefix).trim();
    if name.is_empty() {
        warn!("Ignoring override '{key}': missing name after '{prefix}'");
        return;
    }
    match to_text(value) {
        Some(text) => {
            target.insert(name.to_owned(), text);
        }
        None => warn!("Ignoring override '{key}': {} is not a scalar", describe(value)),
    }
}
