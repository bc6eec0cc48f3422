// src/core/dictionary.rs
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Reserved key in dictionary JSON carrying the provenance string.
pub const URL_VERSION_KEY: &str = "url_version";

/// Normalization applied at every read and write boundary of a dictionary.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Normalized source phrase -> translated phrase, plus optional provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationDictionary {
    entries: HashMap<String, String>,
    url_version: Option<String>,
}

impl TranslationDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the flat wire format: `{"source": "translation", ..., "url_version": "..."}`.
    /// Non-string values are stringified; keys colliding after normalization
    /// keep the last value.
    pub fn from_json_str(body: &str) -> Result<Self> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body)?;
        let mut dict = Self::new();
        for (key, value) in raw {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => continue,
                other => other.to_string(),
            };
            if key == URL_VERSION_KEY {
                dict.url_version = Some(value);
            } else if dict.insert(&key, value).is_some() {
                warn!(%key, "duplicate dictionary key after normalization, later value wins");
            }
        }
        Ok(dict)
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        let mut map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        if let Some(version) = &self.url_version {
            map.insert(URL_VERSION_KEY.to_string(), serde_json::Value::String(version.clone()));
        }
        serde_json::Value::Object(map)
    }

    /// Inserts under the normalized key, returning the value it replaced.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.entries.insert(normalize_key(key), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    pub fn url_version(&self) -> Option<&str> {
        self.url_version.as_deref()
    }

    pub fn set_url_version(&mut self, version: impl Into<String>) {
        self.url_version = Some(version.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds `other` into `self`, later values winning. Each overwritten key is
    /// reported through the log with `origin` for context.
    pub fn merge_from(&mut self, other: TranslationDictionary, origin: &str) {
        for (key, value) in other.entries {
            if self.entries.contains_key(&key) {
                warn!(%key, origin, "duplicate dictionary key, later value wins");
            }
            self.entries.insert(key, value);
        }
        if other.url_version.is_some() {
            self.url_version = other.url_version;
        }
    }
}
