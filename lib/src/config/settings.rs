//! String key/value settings store.
//!
//! Settings arrive from the front end as a flat map of string values keyed by
//! setting name. A store can inherit from a parent (mesh settings fall back
//! to the global ones), and values are parsed on lookup into whatever type
//! the caller asks for.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

/// A layered key/value settings store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    values: BTreeMap<String, String>,
    #[serde(skip)]
    parent: Option<Arc<Settings>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose lookups fall back to `parent` for missing keys.
    pub fn with_parent(parent: Arc<Settings>) -> Self {
        Self {
            values: BTreeMap::new(),
            parent: Some(parent),
        }
    }

    /// Parse a JSON object of settings. String, number and boolean values are
    /// accepted; numbers and booleans are stored in their JSON text form.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut settings = Self::new();
        for (key, value) in raw {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(Error::InvalidSetting {
                        key,
                        value: other.to_string(),
                        reason: "expected a string, number or boolean".into(),
                    })
                }
            };
            settings.values.insert(key, text);
        }
        Ok(settings)
    }

    /// Set a value, replacing any previous one at this level.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`Settings::add`].
    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.add(key, value.to_string());
        self
    }

    /// Whether the key is set here or in any ancestor.
    pub fn has(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }

    /// Raw string value, searching ancestors.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(v) => Some(v.as_str()),
            None => self.parent.as_deref().and_then(|p| p.get_raw(key)),
        }
    }

    /// Typed lookup. Missing keys and unparsable values are errors.
    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self
            .get_raw(key)
            .ok_or_else(|| Error::MissingSetting(key.to_string()))?;
        parse_value(key, raw)
    }

    /// Typed lookup with a default for missing keys. Unparsable values are
    /// still errors.
    pub fn get_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_raw(key) {
            Some(raw) => parse_value(key, raw),
            None => Ok(default),
        }
    }

    /// Keys set at this level (ancestors excluded).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| Error::InvalidSetting {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
