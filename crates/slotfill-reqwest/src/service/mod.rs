//! Slot-filling provider implementation.
//!
//! This module implements the [`SlotFillingProvider`] trait for [`RemoteModel`].

mod wire;

use jiff::Timestamp;
use slotfill_core::label::ModelOutput;
use slotfill_core::{LabelSet, ServiceHealth, SlotFillingProvider, TypeDescription};

use self::wire::{PredictRequest, PredictResponse};
use crate::connect::{RemoteModel, TRACING_TARGET, ensure_success};
use crate::error::Error;

#[async_trait::async_trait]
impl SlotFillingProvider for RemoteModel {
    async fn label(
        &self,
        text: &str,
        type_descriptions: &[TypeDescription],
    ) -> slotfill_core::Result<ModelOutput> {
        let started_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET,
            url = %self.predict_url(),
            candidates = type_descriptions.len(),
            "Calling model"
        );

        let body = PredictRequest {
            query: text,
            types_descriptions: type_descriptions,
        };

        let response = self
            .http()
            .post(self.predict_url().clone())
            .json(&body)
            .send()
            .await
            .map_err(Error::from)?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(Error::from)?;
        let output = serde_json::from_slice::<PredictResponse>(&bytes)
            .map_err(|e| Error::Malformed(e.to_string()))?
            .into_output()?;

        tracing::debug!(
            target: TRACING_TARGET,
            tokens = output.tokens.len(),
            elapsed_ms = Timestamp::now().duration_since(started_at).as_millis(),
            "Model call completed"
        );

        Ok(output)
    }

    fn default_label_set(&self) -> &LabelSet {
        self.labels()
    }

    async fn health_check(&self) -> slotfill_core::Result<ServiceHealth> {
        let started_at = Timestamp::now();
        let response = self
            .http()
            .get(self.health_url().clone())
            .send()
            .await
            .map_err(Error::from)?;

        let elapsed = Timestamp::now().duration_since(started_at).unsigned_abs();
        let status = response.status();
        let health = if status.is_success() {
            ServiceHealth::healthy()
        } else {
            ServiceHealth::unhealthy(format!("model server returned {status}"))
        };

        Ok(health.with_response_time(elapsed))
    }
}
