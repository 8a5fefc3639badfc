//! Request extractors that reject with the server's error document.
//!
//! These are drop-in replacements for their axum counterparts: rejections
//! carry a descriptive message and the same JSON shape as handler errors.

pub mod enhanced_json;
pub mod validated_json;

pub use self::enhanced_json::Json;
pub use self::validated_json::ValidateJson;
