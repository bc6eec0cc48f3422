use overlay_core::error::{OverlayError, Result};
use overlay_core::fetch::Fetcher;
use std::cell::RefCell;
use std::collections::HashMap;

pub const BASE: &str = "https://assets.test/poe/translations/";

/// Serves canned bodies by URL; anything else is a 404. Records every request.
#[derive(Default)]
pub struct MapFetcher {
    bodies: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl MapFetcher {
    pub fn with(mut self, file: &str, body: &str) -> Self {
        self.bodies.insert(format!("{BASE}{file}"), body.to_string());
        self
    }
}

impl Fetcher for MapFetcher {
    fn get_text(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| OverlayError::Status { status: 404, url: url.to_string() })
    }
}
