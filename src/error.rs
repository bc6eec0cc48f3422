// File: src/error.rs
pub type Result<T, E = OverlayError> = core::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("network: {0}")]
    Network(String),
    /// The server answered, but not with a 2xx.
    #[error("http status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("persistence: {0}")]
    Persistence(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(String),
}

impl OverlayError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
