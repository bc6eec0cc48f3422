// File: src/messages.rs
use crate::core::engine::Session;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::version::VersionCheckResult;
use markup5ever_rcdom::RcDom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Requests exchanged between the popup/background side and a page session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    CheckVersion,
    RefreshTranslation,
    GetVersion,
    DownloadUntranslated,
    ExtensionStatusChanged,
}

/// Exactly one per request. `Ack` serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    VersionCheck(VersionCheckResult),
    Version { version: Option<String> },
    Untranslated { data: BTreeMap<String, String> },
    Ack,
}

impl<F: Fetcher> Session<F> {
    pub fn handle(&mut self, request: Request, document: &RcDom) -> Response {
        debug!(?request, "message received");
        match request {
            Request::CheckVersion => Response::VersionCheck(self.check_version()),
            Request::RefreshTranslation => {
                self.init_translation(document);
                Response::Ack
            }
            Request::GetVersion => Response::Version { version: self.translation_version().map(str::to_owned) },
            Request::DownloadUntranslated => Response::Untranslated { data: self.export_untranslated() },
            Request::ExtensionStatusChanged => {
                self.reload_settings();
                self.init_translation(document);
                Response::Ack
            }
        }
    }

    /// JSON in, JSON out. Only a malformed request is an error.
    pub fn handle_json(&mut self, raw: &str, document: &RcDom) -> Result<String> {
        let request: Request = serde_json::from_str(raw)?;
        let response = self.handle(request, document);
        Ok(serde_json::to_string(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_use_action_tag() {
        let req: Request = serde_json::from_value(json!({"action": "downloadUntranslated"})).unwrap();
        assert_eq!(req, Request::DownloadUntranslated);
        assert_eq!(serde_json::to_value(Request::ExtensionStatusChanged).unwrap(), json!({"action": "extensionStatusChanged"}));
        assert!(serde_json::from_value::<Request>(json!({"action": "selfDestruct"})).is_err());
    }

    #[test]
    fn responses_have_flat_shapes() {
        assert_eq!(serde_json::to_value(Response::Ack).unwrap(), serde_json::Value::Null);
        assert_eq!(
            serde_json::to_value(Response::Version { version: None }).unwrap(),
            json!({"version": null})
        );
        let data: BTreeMap<String, String> = [("orb of #".to_string(), String::new())].into_iter().collect();
        assert_eq!(
            serde_json::to_value(Response::Untranslated { data }).unwrap(),
            json!({"data": {"orb of #": ""}})
        );
    }
}
