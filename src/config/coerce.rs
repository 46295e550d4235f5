//! Value coercion rules
//!
//! Overrides arrive as strings from the command line while values files carry
//! native YAML/JSON types. Both funnel through these helpers so a `"512"` and a
//! `512` resolve to the same thing.

use serde_json::Value;

/// Coerce a value to an integer of the requested width
///
/// Numbers must be integral, strings must parse as base-10 integers after
/// trimming. Anything that does not fit `T` yields `None`.
#[must_use]
#[inline]
pub fn to_integer<T: TryFrom<i64>>(value: &Value) -> Option<T> {
    let wide = match *value {
        Value::Number(ref n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(ref s) => s.trim().parse::<i64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }?;
    T::try_from(wide).ok()
}

/// Coerce a value to a boolean
///
/// Strings equal to `true` or `false` (any case) are recognized. Other strings
/// return `None`; callers treat that as `false` after warning. Non-string
/// values follow truthiness.
#[must_use]
#[inline]
pub fn to_bool(value: &Value) -> Option<bool> {
    match *value {
        Value::Bool(b) => Some(b),
        Value::String(ref s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Some(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        Value::Number(ref n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::Null => Some(false),
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

/// Coerce a scalar to a non-empty string
#[must_use]
#[inline]
pub fn to_text(value: &Value) -> Option<String> {
    match *value {
        Value::String(ref s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(ref n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Normalize a list-or-comma-separated-string into a list of strings
///
/// Blank entries are dropped. Values that are neither a list nor a string
/// produce an empty list.
#[must_use]
#[inline]
pub fn to_string_list(value: &Value) -> Vec<String> {
    match *value {
        Value::Array(ref items) => items.iter().filter_map(to_text).collect(),
        Value::String(ref s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Object(_) => Vec::new(),
    }
}

/// Short human-readable rendering of a raw value for warnings
#[must_use]
#[inline]
pub fn describe(value: &Value) -> String {
    match *value {
        Value::String(ref s) => format!("'{s}'"),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string()
        }
    }
}

/// Lenient `deserialize_with` helpers for values-file models
///
/// Values files written by hand often quote numbers or spell lists as a
/// comma-separated string. These accept either form and drop what they cannot
/// interpret rather than failing the whole document.
pub mod lenient {
    use super::{describe, to_bool, to_integer, to_string_list, to_text};
    use serde::{Deserialize as _, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;
    use tracing::warn;

    /// `Option<integer>` from a number or numeric string
    ///
    /// # Errors
    ///
    /// Only fails when the underlying deserializer fails
    #[inline]
    pub fn integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let parsed = to_integer(&raw);
                if parsed.is_none() {
                    warn!("Ignoring non-numeric value {} in values file", describe(&raw));
                }
                parsed
            }
        })
    }

    /// `Option<bool>` from a boolean or `"true"`/`"false"` string
    ///
    /// # Errors
    ///
    /// Only fails when the underlying deserializer fails
    #[inline]
    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(raw) => Some(to_bool(&raw).unwrap_or_else(|| {
                warn!("Treating non-boolean value {} in values file as false", describe(&raw));
                false
            })),
        })
    }

    /// `Option<String>` from any scalar; blank strings become `None`
    ///
    /// # Errors
    ///
    /// Only fails when the underlying deserializer fails
    #[inline]
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(to_text))
    }

    /// `Option<Vec<String>>` from a list or comma-separated string
    ///
    /// # Errors
    ///
    /// Only fails when the underlying deserializer fails
    #[inline]
    pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(raw) => Some(to_string_list(&raw)),
        })
    }

    /// Like [`string_list`], for fields that default to an empty list
    ///
    /// # Errors
    ///
    /// Only fails when the underlying deserializer fails
    #[inline]
    pub fn string_list_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(string_list(deserializer)?.unwrap_or_default())
    }

    /// `Option<BTreeMap<String, String>>` from a mapping of scalars
    ///
    /// # Errors
    ///
    /// Only fails when the underlying deserializer fails
    #[inline]
    pub fn string_map<'de, D>(
        deserializer: D,
    ) -> Result<Option<BTreeMap<String, String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
        Ok(value.map(|map| {
            map.into_iter()
                .filter_map(|(key, raw)| to_text(&raw).map(|text| (key, text)))
                .collect()
        }))
    }
}

/// Serde adapter storing `Option<Duration>` as whole seconds
pub mod seconds {
    use serde::{Deserializer, Serializer};
    use std::time::Duration;

    /// # Errors
    ///
    /// Only fails when the underlying serializer fails
    #[inline]
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match *value {
            Some(duration) => serializer.serialize_u64(duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    /// # Errors
    ///
    /// Only fails when the underlying deserializer fails
    #[inline]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let secs: Option<u64> = super::lenient::integer(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_from_string_and_number() {
        assert_eq!(to_integer::<u32>(&json!("512")), Some(512));
        assert_eq!(to_integer::<u32>(&json!(512)), Some(512));
        assert_eq!(to_integer::<u32>(&json!(" 42 ")), Some(42));
        assert_eq!(to_integer::<u32>(&json!(80.0)), Some(80));
    }

    #[test]
    fn integer_rejects_garbage_and_overflow() {
        assert_eq!(to_integer::<u32>(&json!("notanumber")), None);
        assert_eq!(to_integer::<u32>(&json!(1.5)), None);
        assert_eq!(to_integer::<u16>(&json!(70_000)), None);
        assert_eq!(to_integer::<u32>(&json!(-1)), None);
        assert_eq!(to_integer::<u32>(&json!(true)), None);
    }

    #[test]
    fn bool_coercion() {
        assert_eq!(to_bool(&json!("TRUE")), Some(true));
        assert_eq!(to_bool(&json!("false")), Some(false));
        assert_eq!(to_bool(&json!("yes")), None);
        assert_eq!(to_bool(&json!(0)), Some(false));
        assert_eq!(to_bool(&json!(3)), Some(true));
        assert_eq!(to_bool(&json!({})), Some(true));
    }

    #[test]
    fn string_list_normalization() {
        assert_eq!(
            to_string_list(&json!("subnet-a,subnet-b")),
            vec!["subnet-a".to_owned(), "subnet-b".to_owned()]
        );
        assert_eq!(
            to_string_list(&json!(["subnet-a", "subnet-b"])),
            vec!["subnet-a".to_owned(), "subnet-b".to_owned()]
        );
        assert_eq!(to_string_list(&json!(" a , ,b ")), vec!["a".to_owned(), "b".to_owned()]);
        assert!(to_string_list(&json!(5)).is_empty());
    }

    #[test]
    fn text_drops_blank() {
        assert_eq!(to_text(&json!("  ")), None);
        assert_eq!(to_text(&json!(8080)), Some("8080".to_owned()));
        assert_eq!(to_text(&json!(null)), None);
    }
}
