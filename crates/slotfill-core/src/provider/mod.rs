//! Model provider abstraction and the service that drives it.
//!
//! A provider wraps one loaded slot-filling model. It labels a piece of text
//! against a list of candidate type descriptions and reports the raw,
//! sentinel-wrapped token output; [`SlotFillingService`] turns that output
//! into whole words and entity spans.
//!
//! # Example
//!
//! ```rust,ignore
//! use slotfill_core::{Query, SlotFillingService};
//!
//! let service = SlotFillingService::from_provider(my_provider);
//! let query = Query::new("book a flight to Boston")
//!     .with_candidates(["LOC"], ["a city or place name"]);
//!
//! let prediction = service.predict(&query).await?;
//! ```

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;
mod service;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mock::{MockConfig, MockProvider};
pub use service::{DEFAULT_MODEL_CONCURRENCY, SlotFillingService};

use crate::label::{LabelSet, ModelOutput, TokenLabels, TypeDescription};
use crate::types::ServiceHealth;
pub use crate::{Error, Result};

/// Tracing target for provider operations.
pub const TRACING_TARGET: &str = "slotfill_core::provider";

/// A loaded zero-shot slot-filling model.
///
/// Implementations must be shareable across request tasks. A provider whose
/// backend cannot serve concurrent calls is still safe to share: the service
/// limits in-flight calls, see [`SlotFillingService::with_concurrency`].
#[async_trait::async_trait]
pub trait SlotFillingProvider: Send + Sync {
    /// Labels `text` against the candidate types.
    ///
    /// Returns tokens, primary classes and IOB tags, each wrapped with one
    /// leading and one trailing sentinel. Classes index into
    /// `type_descriptions`.
    async fn label(
        &self,
        text: &str,
        type_descriptions: &[TypeDescription],
    ) -> Result<ModelOutput>;

    /// Merges sub-word tokens back into the words of `text`.
    ///
    /// The default implementation understands WordPiece `##` continuations
    /// and returns each word as it is spelled in `text`.
    fn merge_subwords(&self, text: &str, labels: TokenLabels) -> Result<TokenLabels> {
        Ok(labels.merge_wordpiece().restore_surface(text))
    }

    /// Candidate types used when a request supplies none.
    fn default_label_set(&self) -> &LabelSet;

    /// Perform a health check on the model backend.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
