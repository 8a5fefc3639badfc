//! Model configuration and loading.

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use slotfill_core::SlotFillingService;
use slotfill_core::provider::DEFAULT_MODEL_CONCURRENCY;
use slotfill_reqwest::{RemoteModel, RemoteModelConfig};

use crate::TRACING_TARGET_CONFIG;

/// Where the model lives and how hard it may be driven.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model-serving sidecar connection.
    #[clap(flatten)]
    pub remote: RemoteModelConfig,

    /// Maximum number of model calls in flight at once.
    #[arg(long, env = "MODEL_CONCURRENCY", default_value_t = DEFAULT_MODEL_CONCURRENCY)]
    pub model_concurrency: usize,

    /// Serve the gazetteer mock instead of the sidecar.
    #[cfg(feature = "mock")]
    #[arg(long, env = "MOCK_MODEL")]
    #[serde(default)]
    pub mock_model: bool,

    /// Mock model settings.
    #[cfg(feature = "mock")]
    #[clap(flatten)]
    pub mock: slotfill_core::MockConfig,
}

impl ModelConfig {
    /// Validates the model settings without contacting the model.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model_concurrency == 0 {
            anyhow::bail!("Model concurrency must be at least 1");
        }

        self.remote
            .validate()
            .context("invalid model configuration")?;

        Ok(())
    }

    /// Loads the model and wraps it in a [`SlotFillingService`].
    ///
    /// # Errors
    ///
    /// Fails when the sidecar is unreachable or the default label table
    /// cannot be read; the server must not start without a model.
    pub async fn load_service(&self) -> anyhow::Result<SlotFillingService> {
        #[cfg(feature = "mock")]
        {
            if self.mock_model {
                tracing::warn!(
                    target: TRACING_TARGET_CONFIG,
                    "Serving the mock model, predictions are not real"
                );

                let service = SlotFillingService::mock_with_config(self.mock.clone());
                return Ok(service.with_concurrency(self.model_concurrency));
            }
        }

        let model = RemoteModel::load(self.remote.clone())
            .await
            .context("failed to load the slot-filling model")?;

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            default_labels = ?model.labels().types(),
            concurrency = self.model_concurrency,
            "Model ready"
        );

        Ok(model.into_service().with_concurrency(self.model_concurrency))
    }

    /// Logs model configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            model_url = %self.remote.model_url,
            model_timeout_secs = self.remote.timeout().as_secs(),
            slot_descriptions_path = ?self.remote.slot_descriptions_path,
            concurrency = self.model_concurrency,
            "Model configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig {
            remote: RemoteModelConfig::default(),
            model_concurrency: DEFAULT_MODEL_CONCURRENCY,
            #[cfg(feature = "mock")]
            mock_model: false,
            #[cfg(feature = "mock")]
            mock: slotfill_core::MockConfig::default(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let config = ModelConfig {
            model_concurrency: 0,
            ..config()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn missing_label_table_fails_to_load() {
        let dir = std::env::temp_dir().join("slotfill-cli-missing-table");
        let config = ModelConfig {
            remote: RemoteModelConfig::default()
                .with_slot_descriptions_path(dir.join("slot_descriptions.tsv")),
            ..config()
        };

        assert!(config.load_service().await.is_err());
    }
}
