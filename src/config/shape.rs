//! Shape detection for incoming configuration
//!
//! A document is classified once, at the boundary, and converted to the
//! legacy layout straight away. Nothing downstream inspects shape again.

use crate::config::legacy::LegacyConfig;
use crate::config::mapper::structured_to_legacy;
use crate::config::structured::StructuredConfig;
use crate::config::values::RawValues;
use crate::error::ConfigError;
use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

/// Top-level keys whose presence marks a structured document
pub const STRUCTURED_KEYS: [&str; 9] = [
    "infrastructure",
    "cluster",
    "taskDefinition",
    "service",
    "loadBalancer",
    "autoScaling",
    "iam",
    "serviceDiscovery",
    "addons",
];

/// Every top-level key the structured layout owns
pub const STRUCTURED_DOMAINS: [&str; 10] = [
    "metadata",
    "infrastructure",
    "cluster",
    "taskDefinition",
    "service",
    "loadBalancer",
    "autoScaling",
    "iam",
    "serviceDiscovery",
    "addons",
];

/// Detected configuration layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigShape {
    Legacy,
    Structured,
}

/// Check whether any structured top-level key is present
#[must_use]
#[inline]
pub fn is_structured_config(config: &Value) -> bool {
    config
        .as_object()
        .is_some_and(|map| STRUCTURED_KEYS.iter().any(|key| map.contains_key(*key)))
}

/// Check whether a key names a structured domain
#[must_use]
#[inline]
pub fn is_structured_domain(key: &str) -> bool {
    STRUCTURED_DOMAINS.contains(&key)
}

/// A values document, typed according to its detected layout
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValuesDocument {
    Legacy(LegacyConfig),
    Structured(StructuredConfig),
}

impl ValuesDocument {
    /// Classify and deserialize a merged values tree
    ///
    /// # Errors
    ///
    /// Returns an error if a branch has the wrong type for its layout
    /// (e.g. `containers` is not a list)
    #[inline]
    pub fn classify(raw: RawValues) -> Result<Self> {
        let tree = Value::Object(raw);

        if is_structured_config(&tree) {
            warn_ignored_legacy_keys(&tree);
            let config: StructuredConfig = serde_json::from_value(tree).map_err(|e| {
                ConfigError::configuration(format!("Invalid structured configuration: {e}"))
            })?;
            debug!("Detected structured configuration");
            Ok(Self::Structured(config))
        } else {
            let config: LegacyConfig = serde_json::from_value(tree).map_err(|e| {
                ConfigError::configuration(format!("Invalid legacy configuration: {e}"))
            })?;
            debug!("Detected legacy configuration");
            Ok(Self::Legacy(config))
        }
    }

    #[must_use]
    #[inline]
    pub const fn shape(&self) -> ConfigShape {
        match *self {
            Self::Legacy(_) => ConfigShape::Legacy,
            Self::Structured(_) => ConfigShape::Structured,
        }
    }

    /// Convert to the canonical flat layout
    #[must_use]
    #[inline]
    pub fn into_legacy(self) -> LegacyConfig {
        match self {
            Self::Legacy(config) => config,
            Self::Structured(config) => structured_to_legacy(&config),
        }
    }
}

/// Flat keys sitting next to structured domains are not read
fn warn_ignored_legacy_keys(tree: &Value) {
    let Some(map) = tree.as_object() else {
        return;
    };
    let ignored: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|key| !is_structured_domain(key))
        .collect();
    if !ignored.is_empty() {
        warn!(
            "Ignoring flat keys in structured configuration: {}. Move them under their domain or pass them with --context",
            ignored.join(", ")
        );
    }
}
