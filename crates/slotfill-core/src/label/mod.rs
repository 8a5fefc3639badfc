//! Label handling: candidate tables, model output and span decoding.
//!
//! The flow for one request is
//! [`ModelOutput`] → [`ModelOutput::strip_sentinels`] → sub-word merge
//! ([`TokenLabels::merge_wordpiece`] by default) → [`decode_spans`].

mod label_set;
mod span;
mod tokens;

pub use label_set::{LabelEntry, LabelSet, TYPE_DESCRIPTION_DELIMITER, TypeDescription};
pub use span::{EntitiesDict, EntitySpan, decode_spans};
pub use tokens::{InvalidIobTag, IobTag, ModelOutput, SUBWORD_PREFIX, TokenLabels};
