//! Response types for HTTP handlers.
//!
//! Labeling and health payloads are the core types themselves
//! ([`Prediction`], [`ServiceHealth`]); only the server-specific bodies
//! live here.
//!
//! [`Prediction`]: slotfill_core::Prediction
//! [`ServiceHealth`]: slotfill_core::ServiceHealth

mod errors;
mod root;

pub use errors::*;
pub use root::*;
