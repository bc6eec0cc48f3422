use crate::config::OverlayConfig;
use crate::core::builtin::BuiltinDictionaries;
use crate::core::dictionary::TranslationDictionary;
use crate::core::dom;
use crate::core::resolver::DictionaryResolver;
use crate::core::types::Language;
use crate::core::walker::{mark_document, DomWalker, WalkReport};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::loader::DictionaryLoader;
use crate::observer::RetranslateScheduler;
use crate::persistence::LocalStore;
use crate::recorder::{self, site_domain, UnmatchedRecorder};
use crate::version::{VersionCheckResult, VersionChecker};
use markup5ever_rcdom::RcDom;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

// The overlay's state for one page session: created when a document is
// opened, dropped when it is done. Everything that used to be module-level
// (active dictionary version, caches) hangs off this.
pub struct Session<F: Fetcher> {
    store: LocalStore,
    fetcher: F,
    loader: DictionaryLoader,
    builtin: BuiltinDictionaries,
    recorder: UnmatchedRecorder,
    version_checker: VersionChecker,
    translation_version: Option<String>,
}

impl<F: Fetcher> Session<F> {
    /// Starts a session for `page_url`: wipes last session's worklists and
    /// makes sure a language preference exists.
    pub fn start(config: &OverlayConfig, mut store: LocalStore, fetcher: F, page_url: &str) -> Self {
        recorder::clear_all(&mut store);
        let mut session = Self {
            store,
            fetcher,
            loader: DictionaryLoader::new(config.base_url.clone(), config.freshness_window),
            builtin: BuiltinDictionaries::bundled(),
            recorder: UnmatchedRecorder::new(site_domain(page_url)),
            version_checker: VersionChecker::new(config.version_url(), config.version_cache_ttl),
            translation_version: None,
        };
        session.ensure_default_language();
        session
    }

    pub fn with_builtin(mut self, builtin: BuiltinDictionaries) -> Self {
        self.builtin = builtin;
        self
    }

    pub fn ensure_default_language(&mut self) {
        if self.store.state().language.is_none() {
            info!(language = %Language::default(), "initializing default language setting");
            self.store.update(|state| state.language = Some(Language::default()));
        }
    }

    pub fn language(&self) -> Language {
        self.store.state().language()
    }

    pub fn is_enabled(&self) -> bool {
        self.store.state().is_enabled()
    }

    pub fn domain(&self) -> &str {
        self.recorder.domain()
    }

    /// `url_version` of the dictionary used by the last successful pass.
    pub fn translation_version(&self) -> Option<&str> {
        self.translation_version.as_deref()
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn load_dictionary(&mut self, lang: Language) -> Result<TranslationDictionary> {
        self.loader.load(&self.fetcher, &mut self.store, lang)
    }

    /// Loads the preferred dictionary (falling back to the default language)
    /// and translates the document. `None` when disabled or when no dictionary
    /// could be loaded; neither case is an error for the page.
    pub fn init_translation(&mut self, document: &RcDom) -> Option<WalkReport> {
        if !self.is_enabled() {
            debug!("translation disabled, leaving page as is");
            return None;
        }

        let preferred = self.language();
        let (lang, dictionary) = match self.load_dictionary(preferred) {
            Ok(dictionary) => (preferred, dictionary),
            Err(e) => {
                warn!(lang = %preferred, error = %e, "failed to load dictionary");
                let fallback = Language::default();
                if fallback == preferred {
                    return None;
                }
                match self.load_dictionary(fallback) {
                    Ok(dictionary) => (fallback, dictionary),
                    Err(e) => {
                        debug!(lang = %fallback, error = %e, "default dictionary failed too, giving up");
                        return None;
                    }
                }
            }
        };

        self.translation_version = dictionary.url_version().map(str::to_owned);
        Some(self.translate_page(document, lang, &dictionary))
    }

    /// One walker pass over `<body>` with `cached` in front of the built-in
    /// dictionary, then records the misses.
    pub fn translate_page(&mut self, document: &RcDom, lang: Language, cached: &TranslationDictionary) -> WalkReport {
        mark_document(document);
        let resolver = DictionaryResolver::new(Some(cached), self.builtin.get(lang));
        let report = DomWalker::new(&resolver).walk(&dom::document_body(document));

        let recorded = self.recorder.record_all(&mut self.store, report.misses.iter().map(String::as_str));
        info!(
            %lang,
            visited = report.visited,
            replaced = report.replaced(),
            misses = report.misses.len(),
            recorded,
            "translation pass done"
        );
        report
    }

    /// Translates once, then keeps re-translating whenever the scheduler
    /// fires, until its observers are dropped. Returns the number of passes.
    pub async fn run_live(&mut self, document: &RcDom, scheduler: RetranslateScheduler) -> usize {
        self.init_translation(document);
        let retriggered = scheduler
            .run(|| {
                self.init_translation(document);
            })
            .await;
        retriggered + 1
    }

    pub fn export_untranslated(&self) -> BTreeMap<String, String> {
        self.recorder.export(&self.store)
    }

    pub fn check_version(&mut self) -> VersionCheckResult {
        self.version_checker.check(&self.fetcher)
    }

    /// Picks up settings changed elsewhere (language, toggles, URL prefix).
    pub fn reload_settings(&mut self) {
        self.store.reload();
    }
}
