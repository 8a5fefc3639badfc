//! Reqwest-based client for a model-serving sidecar.

use std::sync::Arc;

use reqwest::{Client, Response};
use slotfill_core::{LabelSet, SlotFillingService};
use url::Url;

use super::RemoteModelConfig;
use crate::error::{Error, Result};

/// Tracing target for remote model operations.
pub const TRACING_TARGET: &str = "slotfill_reqwest::client";

/// Path of the labeling endpoint.
const PREDICT_PATH: &str = "predict";
/// Path of the default label table endpoint.
const SLOT_DESCRIPTIONS_PATH: &str = "slot_descriptions";
/// Path of the readiness endpoint.
const HEALTH_PATH: &str = "health";

/// Inner client that holds the HTTP client, configuration and label table.
struct RemoteModelInner {
    http: Client,
    config: RemoteModelConfig,
    predict_url: Url,
    health_url: Url,
    labels: LabelSet,
}

/// Handle to a slot-filling model served by a sidecar process.
///
/// Created once at startup with [`RemoteModel::load`], which also fetches the
/// model's default label table. Cloning shares the connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// use slotfill_reqwest::{RemoteModel, RemoteModelConfig};
///
/// let config = RemoteModelConfig::new("http://127.0.0.1:8000".parse()?)
///     .with_slot_descriptions_path("slot_descriptions.tsv");
/// let model = RemoteModel::load(config).await?;
/// let service = model.into_service();
/// ```
#[derive(Clone)]
pub struct RemoteModel {
    inner: Arc<RemoteModelInner>,
}

impl std::fmt::Debug for RemoteModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteModel")
            .field("config", &self.inner.config)
            .field("labels", &self.inner.labels.len())
            .finish_non_exhaustive()
    }
}

impl RemoteModel {
    /// Connects to the sidecar and loads the default label table.
    ///
    /// The table comes from `slot_descriptions_path` when set, otherwise from
    /// the sidecar itself.
    ///
    /// # Errors
    ///
    /// Any failure is a startup error: the service must not serve requests
    /// without a model.
    pub async fn load(config: RemoteModelConfig) -> slotfill_core::Result<Self> {
        let startup = |err: slotfill_core::Error| {
            let message = format!("failed to load model from {}: {}", config.model_url, err);
            slotfill_core::Error::startup()
                .with_message(message)
                .with_source(err)
        };

        tracing::debug!(
            target: TRACING_TARGET,
            model_url = %config.model_url,
            timeout_ms = config.timeout().as_millis(),
            "Loading remote model"
        );

        config.validate().map_err(|e| startup(e.into()))?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| startup(Error::from(e).into()))?;

        let labels = match &config.slot_descriptions_path {
            Some(path) => LabelSet::from_path(path).await.map_err(startup)?,
            None => Self::fetch_label_set(&http, &config)
                .await
                .map_err(|e| startup(e.into()))?,
        };

        if labels.is_empty() {
            return Err(startup(
                slotfill_core::Error::configuration().with_message("default label table is empty"),
            ));
        }

        let predict_url = config.endpoint(PREDICT_PATH).map_err(|e| startup(e.into()))?;
        let health_url = config.endpoint(HEALTH_PATH).map_err(|e| startup(e.into()))?;

        tracing::info!(
            target: TRACING_TARGET,
            model_url = %config.model_url,
            default_labels = labels.len(),
            "Remote model loaded"
        );

        let inner = RemoteModelInner {
            http,
            config,
            predict_url,
            health_url,
            labels,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    async fn fetch_label_set(http: &Client, config: &RemoteModelConfig) -> Result<LabelSet> {
        let url = config.endpoint(SLOT_DESCRIPTIONS_PATH)?;
        let response = ensure_success(http.get(url).send().await?).await?;
        let body = response.text().await?;

        LabelSet::parse_tsv(&body).map_err(|e| Error::Malformed(e.to_string()))
    }

    /// Gets the underlying HTTP client.
    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    pub(crate) fn predict_url(&self) -> &Url {
        &self.inner.predict_url
    }

    pub(crate) fn health_url(&self) -> &Url {
        &self.inner.health_url
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &RemoteModelConfig {
        &self.inner.config
    }

    /// Returns the default label table loaded at startup.
    pub fn labels(&self) -> &LabelSet {
        &self.inner.labels
    }

    /// Converts this model into a [`SlotFillingService`] for use with dependency injection.
    pub fn into_service(self) -> SlotFillingService {
        SlotFillingService::from_provider(self)
    }
}

/// Turns a non-success response into [`Error::Status`], keeping a short body excerpt.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    const MAX_BODY_EXCERPT: usize = 512;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_BODY_EXCERPT {
        let cut = (0..=MAX_BODY_EXCERPT)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }

    Err(Error::Status { status, body })
}
