// File: src/loader.rs
use crate::config::join_url;
use crate::core::dictionary::TranslationDictionary;
use crate::core::types::Language;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::persistence::{CacheRecord, LocalStore};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Fetches remote dictionaries behind the store's freshness cache.
#[derive(Debug, Clone)]
pub struct DictionaryLoader {
    default_base_url: String,
    freshness_window: Duration,
}

impl DictionaryLoader {
    pub fn new(default_base_url: impl Into<String>, freshness_window: Duration) -> Self {
        Self { default_base_url: default_base_url.into(), freshness_window }
    }

    /// `{prefix}{language}.json`, where the store's override beats the default.
    pub fn dictionary_url(&self, store: &LocalStore, lang: Language) -> String {
        let prefix = store
            .state()
            .translation_url_prefix
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(&self.default_base_url);
        join_url(prefix, &format!("{}.json", lang.as_str()))
    }

    pub fn load(&self, fetcher: &dyn Fetcher, store: &mut LocalStore, lang: Language) -> Result<TranslationDictionary> {
        self.load_at(fetcher, store, lang, now_ms())
    }

    /// Returns the cached snapshot if it is younger than the freshness window,
    /// otherwise fetches, replaces the snapshot wholesale and returns it.
    pub fn load_at(
        &self,
        fetcher: &dyn Fetcher,
        store: &mut LocalStore,
        lang: Language,
        now_ms: u64,
    ) -> Result<TranslationDictionary> {
        let window_ms = self.freshness_window.as_millis() as u64;
        if let Some(record) = store.state().translations.get(&lang) {
            if record.is_fresh(now_ms, window_ms) {
                debug!(%lang, version = ?record.dictionary.url_version(), "using cached dictionary");
                return Ok(record.dictionary.clone());
            }
            debug!(%lang, age_ms = now_ms.saturating_sub(record.fetched_at_ms), "cached dictionary expired");
        }

        let url = self.dictionary_url(store, lang);
        let body = fetcher.get_text(&url)?;
        let dictionary = TranslationDictionary::from_json_str(&body)?;
        info!(%lang, entries = dictionary.len(), version = ?dictionary.url_version(), "fetched dictionary");

        let record = CacheRecord { dictionary: dictionary.clone(), fetched_at_ms: now_ms };
        store.update(|state| {
            state.translations.insert(lang, record);
        });
        Ok(dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OverlayError;
    use std::cell::RefCell;

    struct Canned {
        body: std::result::Result<&'static str, u16>,
        calls: RefCell<Vec<String>>,
    }

    impl Fetcher for Canned {
        fn get_text(&self, url: &str) -> Result<String> {
            self.calls.borrow_mut().push(url.to_string());
            self.body
                .map(str::to_string)
                .map_err(|status| OverlayError::Status { status, url: url.to_string() })
        }
    }

    fn loader() -> DictionaryLoader {
        DictionaryLoader::new("https://assets.test/t/", Duration::from_secs(30 * 60))
    }

    #[test]
    fn fetches_then_serves_from_cache_within_window() {
        let fetcher = Canned { body: Ok(r#"{"Chaos Orb": "混沌石", "url_version": "v7"}"#), calls: RefCell::new(vec![]) };
        let mut store = LocalStore::in_memory();

        let first = loader().load_at(&fetcher, &mut store, Language::Simplified, 1_000).unwrap();
        let second = loader().load_at(&fetcher, &mut store, Language::Simplified, 1_000 + 29 * 60_000).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.url_version(), Some("v7"));
        assert_eq!(*fetcher.calls.borrow(), vec!["https://assets.test/t/simplified.json"]);
    }

    #[test]
    fn expired_cache_is_refetched_and_overwritten() {
        let fetcher = Canned { body: Ok(r#"{"divine orb": "神圣石"}"#), calls: RefCell::new(vec![]) };
        let mut store = LocalStore::in_memory();
        let mut stale = TranslationDictionary::new();
        stale.insert("chaos orb", "旧");
        store.update(|s| {
            s.translations.insert(Language::Traditional, CacheRecord { dictionary: stale, fetched_at_ms: 0 });
        });

        let now = 31 * 60_000;
        let dict = loader().load_at(&fetcher, &mut store, Language::Traditional, now).unwrap();

        assert!(!dict.contains_key("chaos orb"), "records are replaced, not merged");
        let record = &store.state().translations[&Language::Traditional];
        assert_eq!(record.fetched_at_ms, now);
        assert_eq!(record.dictionary.get("divine orb"), Some("神圣石"));
    }

    #[test]
    fn url_prefix_override_is_used() {
        let fetcher = Canned { body: Ok("{}"), calls: RefCell::new(vec![]) };
        let mut store = LocalStore::in_memory();
        store.update(|s| s.translation_url_prefix = Some("http://mirror.local/dict".into()));

        loader().load_at(&fetcher, &mut store, Language::Traditional, 0).unwrap();
        assert_eq!(*fetcher.calls.borrow(), vec!["http://mirror.local/dict/traditional.json"]);
    }

    #[test]
    fn failures_propagate_and_leave_cache_alone() {
        let mut store = LocalStore::in_memory();

        let not_found = Canned { body: Err(404), calls: RefCell::new(vec![]) };
        let err = loader().load_at(&not_found, &mut store, Language::Simplified, 0).unwrap_err();
        assert!(matches!(err, OverlayError::Status { status: 404, .. }));

        let garbage = Canned { body: Ok("<!doctype html>"), calls: RefCell::new(vec![]) };
        let err = loader().load_at(&garbage, &mut store, Language::Simplified, 0).unwrap_err();
        assert!(matches!(err, OverlayError::Parse(_)));

        assert!(store.state().translations.is_empty());
    }
}
