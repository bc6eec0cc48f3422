// File: src/fetch.rs
use crate::error::{OverlayError, Result};
use std::time::Duration;
use tracing::debug;

/// Plain-text HTTP GET. Non-2xx answers are errors.
pub trait Fetcher {
    fn get_text(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        match self.agent.get(url).call() {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| OverlayError::network(format!("reading body of {url}: {e}"))),
            Err(ureq::Error::Status(status, _)) => {
                Err(OverlayError::Status { status, url: url.to_string() })
            }
            Err(ureq::Error::Transport(t)) => Err(OverlayError::network(t.to_string())),
        }
    }
}
