//! Remote model connection.
//!
//! This module provides the client handle and its configuration. It wraps
//! the `reqwest` crate for calls to the model-serving sidecar.

mod client;
mod config;

pub(crate) use client::ensure_success;
pub use client::{RemoteModel, TRACING_TARGET};
pub use config::RemoteModelConfig;
