//! Commonly used items from slotfill-core.
//!
//! ```rust,ignore
//! use slotfill_core::prelude::*;
//! ```

pub use crate::label::{
    EntitiesDict, EntitySpan, IobTag, LabelEntry, LabelSet, ModelOutput, TokenLabels,
    TypeDescription, decode_spans,
};
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use crate::provider::{MockConfig, MockProvider};
pub use crate::provider::{SlotFillingProvider, SlotFillingService};
pub use crate::types::{Prediction, Query, ServiceHealth, ServiceStatus};
pub use crate::{BoxedError, Error, ErrorKind, Result};
