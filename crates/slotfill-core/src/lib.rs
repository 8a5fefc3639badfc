#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
pub mod label;
#[doc(hidden)]
pub mod prelude;
pub mod provider;
mod types;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use label::{EntitiesDict, EntitySpan, LabelEntry, LabelSet, TypeDescription};
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use provider::{MockConfig, MockProvider};
pub use provider::{SlotFillingProvider, SlotFillingService};
pub use types::{Prediction, Query, ServiceHealth, ServiceStatus};
