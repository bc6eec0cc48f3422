// File: src/version.rs
use crate::error::Result;
use crate::fetch::Fetcher;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const BUNDLED_VERSION_JSON: &str = include_str!("../assets/version.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    pub version: String,
}

impl VersionDescriptor {
    pub fn from_json_str(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_VERSION_JSON)
    }
}

/// Dotted-integer comparison. Missing components count as 0; a component that
/// is not a number also counts as 0.
pub fn compare_versions(local: &str, remote: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .trim_start_matches(['v', 'V'])
            .split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    let (a, b) = (parse(local), parse(remote));
    for i in 0..a.len().max(b.len()) {
        let (x, y) = (a.get(i).copied().unwrap_or(0), b.get(i).copied().unwrap_or(0));
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

pub fn has_update(local: &str, remote: &str) -> bool {
    compare_versions(local, remote) == Ordering::Less
}

/// Reply to a `checkVersion` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCheckResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl VersionCheckResult {
    fn ok(version: String, source: Option<&str>) -> Self {
        Self { success: true, version: Some(version), error: None, source: source.map(str::to_owned) }
    }

    fn failed(error: String) -> Self {
        Self { success: false, version: None, error: Some(error), source: None }
    }
}

/// Remote version lookups with a short in-memory cache.
pub struct VersionChecker {
    url: String,
    ttl: Duration,
    latest: Option<(String, Instant)>,
}

impl VersionChecker {
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self { url: url.into(), ttl, latest: None }
    }

    pub fn check(&mut self, fetcher: &dyn Fetcher) -> VersionCheckResult {
        self.check_at(fetcher, Instant::now())
    }

    pub fn check_at(&mut self, fetcher: &dyn Fetcher, now: Instant) -> VersionCheckResult {
        if let Some((version, at)) = &self.latest {
            if now.saturating_duration_since(*at) < self.ttl {
                debug!(%version, "using cached version info");
                return VersionCheckResult::ok(version.clone(), Some("cache"));
            }
        }

        let fetched = fetcher
            .get_text(&self.url)
            .and_then(|body| VersionDescriptor::from_json_str(&body));
        match fetched {
            Ok(descriptor) => {
                info!(version = %descriptor.version, "remote version fetched");
                self.latest = Some((descriptor.version.clone(), now));
                VersionCheckResult::ok(descriptor.version, None)
            }
            Err(e) => {
                warn!(error = %e, "version check failed");
                VersionCheckResult::failed(e.to_string())
            }
        }
    }
}
