// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target script variant. Doubles as the dictionary file stem on the asset host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Simplified,
    #[default]
    Traditional,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Simplified, Language::Traditional];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Simplified => "simplified",
            Language::Traditional => "traditional",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simplified" | "sc" | "zh_cn" => Ok(Language::Simplified),
            "traditional" | "tc" | "zh_tw" => Ok(Language::Traditional),
            other => Err(format!("unknown language variant '{other}'")),
        }
    }
}

/// Result of running a raw string through the pattern codec.
///
/// `processed_text` is the dictionary lookup key: lower-cased, special suffix
/// removed, numeric runs replaced by `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub processed_text: String,
    /// Numeric literals in encounter order.
    pub numbers: Vec<String>,
    /// Suffix removed before lookup, verbatim. Empty if none matched.
    pub special_pattern: String,
}

/// Outcome of resolving one piece of page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Translated(String),
    /// No dictionary had the key. `key` is the worklist form of the text.
    Unmatched { key: String },
}
