use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fixed acknowledgement returned by the root endpoint.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RootResponse {
    /// Always `"World"`.
    #[serde(rename = "Hello")]
    pub hello: String,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            hello: "World".to_owned(),
        }
    }
}
