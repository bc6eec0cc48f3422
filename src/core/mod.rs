// src/core/mod.rs
pub mod builtin;
pub mod codec;
pub mod dictionary;
pub mod dom;
pub mod engine;
pub mod resolver;
pub mod types;
pub mod walker;
