//! Reqwest-based remote model provider for the slot-filling service.
//!
//! This crate provides [`RemoteModel`], a [`SlotFillingProvider`] that forwards
//! labeling requests to a model-serving sidecar over HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use slotfill_reqwest::{RemoteModel, RemoteModelConfig};
//!
//! let config = RemoteModelConfig::new("http://127.0.0.1:8000".parse()?);
//! let service = RemoteModel::load(config).await?.into_service();
//!
//! let prediction = service.predict(&query).await?;
//! ```
//!
//! [`SlotFillingProvider`]: slotfill_core::SlotFillingProvider

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod connect;
mod error;
mod service;

pub use crate::connect::{RemoteModel, RemoteModelConfig, TRACING_TARGET};
pub use crate::error::{Error, Result};
