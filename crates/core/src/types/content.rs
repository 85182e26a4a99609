//! Typed profile content stored as JSON blobs.
//!
//! Blobs are written by the editor and may be partial or stale, so every
//! field has a default and [`decode_or_default`] never fails.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A labelled outbound link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Home page content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePage {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub links: Vec<Link>,
}

/// About page content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutPage {
    pub heading: Option<String>,
    pub body: Option<String>,
    pub skills: Vec<String>,
}

/// Flat theme settings, e.g. `{"primary": "#0f766e", "font": "Inter"}`.
///
/// Strings are kept as-is, numbers and booleans are stringified, and nested
/// values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct Theme(BTreeMap<String, String>);

impl Theme {
    /// Look up a theme value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the theme has no settings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for Theme {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        Value::Null | Value::Array(_) | Value::Object(_) => return None,
                    };
                    Some((key, value))
                })
                .collect(),
        )
    }
}

/// Decode a stored blob, falling back to the default on absence or shape
/// mismatch.
///
/// Returns the decoded value and, when decoding failed, the error so the
/// caller can log it.
#[must_use]
pub fn decode_or_default<T>(value: Option<Value>) -> (T, Option<serde_json::Error>)
where
    T: DeserializeOwned + Default,
{
    match value {
        None | Some(Value::Null) => (T::default(), None),
        Some(value) => match serde_json::from_value(value) {
            Ok(decoded) => (decoded, None),
            Err(err) => (T::default(), Some(err)),
        },
    }
}
