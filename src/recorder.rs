// File: src/recorder.rs
use crate::persistence::LocalStore;
use std::collections::BTreeMap;
use tracing::{debug, trace};
use url::Url;

/// CJK Unified Ideographs. Text containing any of these is taken to be
/// translated already.
fn is_target_script(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Whether a lookup miss is worth putting on the translation worklist.
pub fn should_save_text(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if text.chars().any(is_target_script) {
        return false;
    }
    // At least one letter also rules out symbol-only strings.
    text.chars().any(|c| c.is_ascii_alphabetic())
}

/// Site key for worklists: the host without a leading `www.`. Accepts full
/// URLs or bare host names.
pub fn site_domain(page: &str) -> String {
    let host = Url::parse(page)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .unwrap_or_else(|| page.trim().trim_end_matches('/').to_ascii_lowercase());
    host.strip_prefix("www.").map(str::to_owned).unwrap_or(host)
}

/// Captures dictionary misses per site domain in the local store.
pub struct UnmatchedRecorder {
    domain: String,
}

impl UnmatchedRecorder {
    pub fn new(domain: impl Into<String>) -> Self {
        Self { domain: domain.into() }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Records the keys that pass the filter and are not already present.
    /// Returns how many were new. The store is written once, and only if
    /// something changed.
    pub fn record_all<'k>(&self, store: &mut LocalStore, keys: impl IntoIterator<Item = &'k str>) -> usize {
        let existing = store.state().unmatched.get(&self.domain);
        let mut fresh: Vec<&str> = Vec::new();
        for key in keys {
            if !should_save_text(key) {
                trace!(key, "miss filtered out");
                continue;
            }
            let known = existing.is_some_and(|record| record.contains_key(key));
            if !known && !fresh.contains(&key) {
                fresh.push(key);
            }
        }
        if fresh.is_empty() {
            return 0;
        }

        let added = fresh.len();
        store.update(|state| {
            let record = state.unmatched.entry(self.domain.clone()).or_default();
            for key in fresh {
                record.insert(key.to_string(), String::new());
            }
        });
        debug!(domain = %self.domain, added, "recorded untranslated text");
        added
    }

    pub fn record(&self, store: &mut LocalStore, key: &str) -> bool {
        self.record_all(store, [key]) == 1
    }

    /// Flat key -> "" mapping for this domain; empty if nothing was recorded.
    pub fn export(&self, store: &LocalStore) -> BTreeMap<String, String> {
        export_domain(store, &self.domain)
    }
}

pub fn export_domain(store: &LocalStore, domain: &str) -> BTreeMap<String, String> {
    store.state().unmatched.get(domain).cloned().unwrap_or_default()
}

/// Wipes every domain's worklist. Runs at session start.
pub fn clear_all(store: &mut LocalStore) {
    if store.state().unmatched.is_empty() {
        return;
    }
    store.update(|state| state.unmatched.clear());
}
