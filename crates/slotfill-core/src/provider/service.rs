//! Slot-filling service with observability.
//!
//! This module provides [`SlotFillingService`] which wraps a provider, turns
//! its raw token output into a [`Prediction`] and adds structured logging.

use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::Semaphore;

use super::{Error, Result, SlotFillingProvider, TRACING_TARGET};
use crate::label::{LabelSet, decode_spans};
use crate::types::{Prediction, Query, ServiceHealth};

/// Default number of model calls allowed in flight at once.
pub const DEFAULT_MODEL_CONCURRENCY: usize = 8;

/// Slot-filling service shared by all request handlers.
///
/// Cloning is cheap: clones share the provider and the concurrency limit.
#[derive(Clone)]
pub struct SlotFillingService {
    provider: Arc<dyn SlotFillingProvider>,
    permits: Arc<Semaphore>,
    concurrency: usize,
}

impl fmt::Debug for SlotFillingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotFillingService")
            .field("concurrency", &self.concurrency)
            .field("default_labels", &self.provider.default_label_set().len())
            .finish_non_exhaustive()
    }
}

impl SlotFillingService {
    /// Create a new service from a provider.
    pub fn from_provider<P>(provider: P) -> Self
    where
        P: SlotFillingProvider + 'static,
    {
        Self::from_shared(Arc::new(provider))
    }

    /// Create a new service from an already shared provider.
    pub fn from_shared(provider: Arc<dyn SlotFillingProvider>) -> Self {
        Self {
            provider,
            permits: Arc::new(Semaphore::new(DEFAULT_MODEL_CONCURRENCY)),
            concurrency: DEFAULT_MODEL_CONCURRENCY,
        }
    }

    /// Limits how many model calls may run at the same time.
    ///
    /// `1` serializes all calls. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        self.permits = Arc::new(Semaphore::new(concurrency));
        self.concurrency = concurrency;
        self
    }

    /// Returns the configured concurrency limit.
    #[inline]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the provider's default candidate types.
    pub fn default_label_set(&self) -> &LabelSet {
        self.provider.default_label_set()
    }

    /// Labels the query text and groups the result into entity spans.
    ///
    /// Falls back to the provider's default label set when the query carries
    /// no candidates.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error for blank text or mismatched candidate
    /// lists, and an inference error when the model fails or its output
    /// cannot be decoded.
    pub async fn predict(&self, query: &Query) -> Result<Prediction> {
        let started_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET,
            text_len = query.text.len(),
            default_labels = query.uses_default_labels(),
            "Processing labeling request"
        );

        let result = self.run_prediction(query).await;
        let elapsed = Timestamp::now().duration_since(started_at);

        match &result {
            Ok(prediction) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    entities_dict = ?prediction.entities_dict,
                    words = prediction.utterance_tokens.len(),
                    slot_types = prediction.slot_types.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Labeling completed"
                );
            }
            Err(error) if error.is_client_error() => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Labeling request rejected"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Labeling failed"
                );
            }
        }

        result
    }

    async fn run_prediction(&self, query: &Query) -> Result<Prediction> {
        if query.text.trim().is_empty() {
            return Err(Error::invalid_input().with_message("text must not be empty"));
        }

        let supplied = query.candidates()?;
        let labels = supplied
            .as_ref()
            .unwrap_or_else(|| self.provider.default_label_set());
        let type_descriptions = labels.type_descriptions();

        let output = {
            let _permit = self.permits.acquire().await.map_err(|err| {
                Error::inference()
                    .with_message("model is shutting down")
                    .with_source(err)
            })?;
            self.provider.label(&query.text, &type_descriptions).await?
        };

        let subwords = output.strip_sentinels()?;
        let words = self.provider.merge_subwords(&query.text, subwords)?;
        let entities_dict = decode_spans(&words, labels.len())?;

        Ok(Prediction {
            utterance_tokens: words.into_tokens(),
            entities_dict,
            slot_types: labels.types(),
        })
    }

    /// Perform a health check on the model backend.
    ///
    /// A failing check is reported as an unhealthy status, not an error.
    pub async fn health_check(&self) -> ServiceHealth {
        let started_at = Timestamp::now();
        let health = match self.provider.health_check().await {
            Ok(health) => health,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Model health check failed"
                );
                ServiceHealth::unhealthy(error.to_string())
            }
        };

        match health.response_ms {
            Some(_) => health,
            None => {
                let elapsed = Timestamp::now().duration_since(started_at);
                health.with_response_time(elapsed.unsigned_abs())
            }
        }
    }

    /// Create a mock slot-filling service for testing.
    #[cfg(feature = "test-utils")]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
    pub fn mock() -> Self {
        Self::from_provider(super::MockProvider::default())
    }

    /// Create a mock slot-filling service with custom configuration.
    #[cfg(feature = "test-utils")]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
    pub fn mock_with_config(config: super::MockConfig) -> Self {
        Self::from_provider(super::MockProvider::new(config))
    }
}
