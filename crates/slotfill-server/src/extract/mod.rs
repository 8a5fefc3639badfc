//! Enhanced HTTP request extractors with improved error handling and validation.
//!
//! - [`Json`] - JSON deserialization with descriptive rejections
//! - [`ValidateJson`] - JSON extraction followed by `validator` checks

pub mod reject;

pub use reject::{Json, ValidateJson};
