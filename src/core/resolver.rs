// src/core/resolver.rs
use crate::core::codec::PatternCodec;
use crate::core::dictionary::TranslationDictionary;
use crate::core::types::Resolution;

/// Two-tier lookup: the fetched/cached dictionary first, the built-in one second.
pub struct DictionaryResolver<'a> {
    cached: Option<&'a TranslationDictionary>,
    builtin: &'a TranslationDictionary,
    codec: PatternCodec,
}

impl<'a> DictionaryResolver<'a> {
    pub fn new(cached: Option<&'a TranslationDictionary>, builtin: &'a TranslationDictionary) -> Self {
        Self { cached, builtin, codec: PatternCodec::new() }
    }

    /// Resolves one piece of page text. Surrounding whitespace is ignored here;
    /// the walker reattaches it.
    ///
    /// Text carrying a special suffix is tried twice: first without the suffix,
    /// then under the full hashed key that a miss would be recorded as.
    pub fn resolve(&self, raw: &str) -> Resolution {
        let trimmed = raw.trim();
        let encoded = self.codec.encode(trimmed);

        if let Some(template) = self.lookup(&encoded.processed_text) {
            return Resolution::Translated(self.codec.decode(&encoded, template));
        }

        let (full_key, full_numbers) = self.codec.replace_numbers_with_hashes(&trimmed.to_lowercase());
        if !encoded.special_pattern.is_empty() {
            if let Some(template) = self.lookup(&full_key) {
                return Resolution::Translated(self.codec.restore_numbers(template, &full_numbers));
            }
        }
        Resolution::Unmatched { key: full_key }
    }

    fn lookup(&self, key: &str) -> Option<&'a str> {
        self.cached.and_then(|dict| dict.get(key)).or_else(|| self.builtin.get(key))
    }
}
