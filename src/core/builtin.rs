// src/core/builtin.rs
use crate::core::dictionary::TranslationDictionary;
use crate::core::types::Language;
use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, error, warn};

const SIMPLIFIED_JSON: &str = include_str!("../../assets/builtin/simplified.json");
const TRADITIONAL_JSON: &str = include_str!("../../assets/builtin/traditional.json");

/// Dictionaries shipped inside the binary. Only consulted after the cached one.
#[derive(Debug, Clone, Default)]
pub struct BuiltinDictionaries {
    simplified: TranslationDictionary,
    traditional: TranslationDictionary,
}

impl BuiltinDictionaries {
    pub fn bundled() -> Self {
        Self {
            simplified: parse_bundled(Language::Simplified, SIMPLIFIED_JSON),
            traditional: parse_bundled(Language::Traditional, TRADITIONAL_JSON),
        }
    }

    pub fn from_parts(simplified: TranslationDictionary, traditional: TranslationDictionary) -> Self {
        Self { simplified, traditional }
    }

    pub fn get(&self, lang: Language) -> &TranslationDictionary {
        match lang {
            Language::Simplified => &self.simplified,
            Language::Traditional => &self.traditional,
        }
    }
}

fn parse_bundled(lang: Language, body: &str) -> TranslationDictionary {
    TranslationDictionary::from_json_str(body).unwrap_or_else(|e| {
        error!(%lang, error = %e, "bundled dictionary is corrupt, continuing without it");
        TranslationDictionary::new()
    })
}

/// Merges every `.json` file in `dir` (sorted by name) into one dictionary.
/// Keys are normalized on the way in; duplicates are logged and the later file
/// wins. Files that fail to parse are logged and skipped.
pub fn merge_dictionary_dir(dir: &Path) -> Result<TranslationDictionary> {
    let mut merged = TranslationDictionary::new();
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "dictionary directory does not exist");
        return Ok(merged);
    }

    let mut files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    for path in files {
        let origin = path.display().to_string();
        let body = fs::read_to_string(&path)?;
        match TranslationDictionary::from_json_str(&body) {
            Ok(dict) => {
                debug!(file = %origin, entries = dict.len(), "merged dictionary file");
                merged.merge_from(dict, &origin);
            }
            Err(e) => error!(file = %origin, error = %e, "failed to parse dictionary file"),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn bundled_dictionaries_parse() {
        let builtin = BuiltinDictionaries::bundled();
        for lang in Language::ALL {
            assert!(!builtin.get(lang).is_empty(), "{lang} builtin is empty");
            assert!(builtin.get(lang).get("Deals # Damage").is_some());
        }
    }

    #[test]
    fn merge_lowercases_and_later_file_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"Chaos Orb": "混沌", "Divine Orb": "神圣石"}"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{"chaos orb": "混沌石"}"#).unwrap();
        fs::write(dir.path().join("c.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let merged = merge_dictionary_dir(dir.path()).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("chaos orb"), Some("混沌石"));
        assert_eq!(merged.get("divine orb"), Some("神圣石"));
    }

    #[test]
    fn merge_of_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let merged = merge_dictionary_dir(&dir.path().join("nope")).unwrap();
        assert!(merged.is_empty());
    }
}
