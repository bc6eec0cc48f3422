// src/core/codec.rs
use crate::core::types::EncodedText;
use once_cell::sync::Lazy;
use regex::Regex;

pub const NUMBER_PLACEHOLDER: char = '#';

/// Trailing suffixes kept out of the lookup key, in priority order:
/// level (" 12L"), page ("- 3p"), seconds (" - 30s").
static SPECIAL_SUFFIXES: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?i) [0-9]+L$").expect("level suffix pattern"),
        Regex::new(r"(?i)- [0-9]+p$").expect("page suffix pattern"),
        Regex::new(r"(?i) - [0-9]+s$").expect("seconds suffix pattern"),
    ]
});

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+(\.[0-9]+)?").expect("number pattern"));

/// Stateless, reversible transforms that make numbers and a few positional
/// suffixes transparent to dictionary lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternCodec;

impl PatternCodec {
    pub fn new() -> Self {
        Self
    }

    /// Removes at most one trailing special suffix. Returns the remaining text
    /// and the suffix exactly as it appeared (empty when nothing matched).
    /// Text that is nothing but a suffix is left whole.
    pub fn extract_special_patterns(&self, text: &str) -> (String, String) {
        for pattern in SPECIAL_SUFFIXES.iter() {
            if let Some(m) = pattern.find(text) {
                let head = &text[..m.start()];
                if head.trim().is_empty() {
                    continue;
                }
                return (head.to_string(), m.as_str().to_string());
            }
        }
        (text.to_string(), String::new())
    }

    /// Replaces every integer or decimal run with `#`, left to right.
    pub fn replace_numbers_with_hashes(&self, text: &str) -> (String, Vec<String>) {
        let mut numbers = Vec::new();
        let processed = NUMBER.replace_all(text, |caps: &regex::Captures<'_>| {
            numbers.push(caps[0].to_string());
            NUMBER_PLACEHOLDER.to_string()
        });
        (processed.into_owned(), numbers)
    }

    /// Puts numbers back one placeholder at a time. Surplus placeholders stay,
    /// surplus numbers are dropped.
    pub fn restore_numbers(&self, text: &str, numbers: &[String]) -> String {
        let mut result = text.to_string();
        for number in numbers {
            match result.find(NUMBER_PLACEHOLDER) {
                Some(pos) => result.replace_range(pos..pos + NUMBER_PLACEHOLDER.len_utf8(), number),
                None => break,
            }
        }
        result
    }

    /// Full lookup encoding of already-trimmed text: suffix extraction on the
    /// original casing, then lower-casing, then number placeholders.
    pub fn encode(&self, trimmed: &str) -> EncodedText {
        let (modified, special_pattern) = self.extract_special_patterns(trimmed);
        let (processed_text, numbers) = self.replace_numbers_with_hashes(&modified.to_lowercase());
        EncodedText { processed_text, numbers, special_pattern }
    }

    /// Inverse of [`encode`](Self::encode) applied to a translated value.
    pub fn decode(&self, encoded: &EncodedText, translated: &str) -> String {
        let mut out = self.restore_numbers(translated, &encoded.numbers);
        out.push_str(&encoded.special_pattern);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_each_suffix_kind() {
        let codec = PatternCodec::new();
        assert_eq!(
            codec.extract_special_patterns("Ancient Orb 5L"),
            ("Ancient Orb".to_string(), " 5L".to_string())
        );
        assert_eq!(
            codec.extract_special_patterns("Results- 3p"),
            ("Results".to_string(), "- 3p".to_string())
        );
        assert_eq!(
            codec.extract_special_patterns("fire resistance - 7s"),
            ("fire resistance".to_string(), " - 7s".to_string())
        );
    }

    #[test]
    fn suffix_only_matches_at_end() {
        let codec = PatternCodec::new();
        let (text, special) = codec.extract_special_patterns("5L links here");
        assert_eq!(text, "5L links here");
        assert!(special.is_empty());
    }

    #[test]
    fn bare_suffix_is_not_extracted() {
        let codec = PatternCodec::new();
        assert_eq!(codec.extract_special_patterns("- 3p"), ("- 3p".to_string(), String::new()));
        let encoded = codec.encode("- 3p");
        assert_eq!(encoded.processed_text, "- #p");
        assert!(encoded.special_pattern.is_empty());
    }

    #[test]
    fn only_one_suffix_is_extracted() {
        let codec = PatternCodec::new();
        let (text, special) = codec.extract_special_patterns("gem 6L 6L");
        assert_eq!(text, "gem 6L");
        assert_eq!(special, " 6L");
    }

    #[test]
    fn replaces_integers_and_decimals_in_order() {
        let codec = PatternCodec::new();
        let (text, numbers) = codec.replace_numbers_with_hashes("deals 12 to 3.5 damage");
        assert_eq!(text, "deals # to # damage");
        assert_eq!(numbers, vec!["12", "3.5"]);
    }

    #[test]
    fn restore_tolerates_count_mismatch() {
        let codec = PatternCodec::new();
        let two = vec!["1".to_string(), "2".to_string()];
        assert_eq!(codec.restore_numbers("# and # and #", &two), "1 and 2 and #");
        assert_eq!(codec.restore_numbers("only #", &two), "only 1");
    }

    #[test]
    fn encode_lowercases_but_keeps_suffix_verbatim() {
        let codec = PatternCodec::new();
        let encoded = codec.encode("Chaos Orb x10 5L");
        assert_eq!(encoded.processed_text, "chaos orb x#");
        assert_eq!(encoded.numbers, vec!["10"]);
        assert_eq!(encoded.special_pattern, " 5L");
        assert_eq!(codec.decode(&encoded, "混沌石 x#"), "混沌石 x10 5L");
    }

    proptest! {
        #[test]
        fn numbers_round_trip(s in "[a-zA-Z0-9 ]{0,40}") {
            let codec = PatternCodec::new();
            let (processed, numbers) = codec.replace_numbers_with_hashes(&s);
            prop_assert_eq!(codec.restore_numbers(&processed, &numbers), s);
        }

        #[test]
        fn suffix_split_reconstructs_original(
            head in "[a-z]{1,8}( [a-z]{1,8}){0,3}",
            n in 0u32..1000,
            kind in 0usize..3,
        ) {
            let suffix = match kind {
                0 => format!(" {n}L"),
                1 => format!("- {n}p"),
                _ => format!(" - {n}s"),
            };
            let original = format!("{head}{suffix}");
            let codec = PatternCodec::new();
            let (modified, special) = codec.extract_special_patterns(&original);
            prop_assert_eq!(&special, &suffix);
            prop_assert_eq!(format!("{modified}{special}"), original);
        }
    }
}
