// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod messages;
pub mod observer;
pub mod persistence;
pub mod recorder;
pub mod version;

pub use crate::core::engine::Session;
pub use crate::core::types::{Language, Resolution};
pub use crate::error::{OverlayError, Result};
