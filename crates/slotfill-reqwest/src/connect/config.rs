//! Configuration for the remote model client.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default timeout for model calls: 25 seconds.
///
/// Stays below the server's default 30 second request timeout, so a hung
/// model surfaces as an inference error rather than a gateway timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Default address of the model-serving sidecar.
const DEFAULT_MODEL_URL: &str = "http://127.0.0.1:8000/";

/// Configuration for connecting to a model-serving sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RemoteModelConfig {
    /// Base URL of the model-serving sidecar
    #[cfg_attr(
        feature = "config",
        arg(long = "model-url", env = "MODEL_URL", default_value = DEFAULT_MODEL_URL)
    )]
    pub model_url: Url,

    /// Timeout for a single model call in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "model-timeout", env = "MODEL_TIMEOUT_SECS", default_value = "25")
    )]
    pub model_timeout: u64,

    /// Local `type<TAB>description` table used instead of the sidecar's
    #[cfg_attr(
        feature = "config",
        arg(long = "slot-descriptions-path", env = "SLOT_DESCRIPTIONS_PATH")
    )]
    pub slot_descriptions_path: Option<PathBuf>,

    /// User-Agent header sent with every call
    #[cfg_attr(feature = "config", arg(skip))]
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for RemoteModelConfig {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_MODEL_URL).expect("default model url is valid"))
    }
}

impl RemoteModelConfig {
    /// Creates a configuration for the sidecar at `model_url`.
    pub fn new(model_url: Url) -> Self {
        Self {
            model_url,
            model_timeout: DEFAULT_TIMEOUT.as_secs(),
            slot_descriptions_path: None,
            user_agent: None,
        }
    }

    /// Set the model call timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.model_timeout = secs;
        self
    }

    /// Read the default label table from a local file.
    #[must_use]
    pub fn with_slot_descriptions_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.slot_descriptions_path = Some(path.into());
        self
    }

    /// Set the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the timeout, using the default if zero.
    pub fn timeout(&self) -> Duration {
        match self.model_timeout {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }

    /// Returns the user agent, using the crate name and version if unset.
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("slotfill/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.model_url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "model url must use http or https, got `{}`",
                self.model_url.scheme()
            )));
        }

        if self.model_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!(
                "model url `{}` cannot be used as a base",
                self.model_url
            )));
        }

        Ok(())
    }

    /// Resolves an endpoint below the base URL, keeping any path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.model_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidUrl(format!(
                    "model url `{}` cannot be used as a base",
                    self.model_url
                ))
            })?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RemoteModelConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(25));
        assert!(config.user_agent().starts_with("slotfill/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_uses_default() {
        let config = RemoteModelConfig::default().with_timeout_secs(0);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let config = RemoteModelConfig::new("http://models.internal/slots".parse().unwrap());
        assert_eq!(
            config.endpoint("predict").unwrap().as_str(),
            "http://models.internal/slots/predict"
        );

        let config = RemoteModelConfig::new("http://localhost:8000/".parse().unwrap());
        assert_eq!(
            config.endpoint("health").unwrap().as_str(),
            "http://localhost:8000/health"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        let config = RemoteModelConfig::new("ftp://models.internal".parse().unwrap());
        assert!(config.validate().is_err());
    }
}
