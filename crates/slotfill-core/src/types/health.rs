//! Health reporting for model providers.
//!
//! A provider reports its operational state through [`ServiceHealth`]; the
//! server exposes it on the health endpoint so load balancers can take an
//! instance out of rotation when the model backend goes away.

use std::time::Duration;

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Represents the operational status of a provider.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Provider is operating normally
    #[default]
    Healthy,
    /// Provider answers but with issues
    Degraded,
    /// Provider is not operational
    Unhealthy,
}

/// Health information for a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ServiceHealth {
    /// Current status.
    pub status: ServiceStatus,
    /// Round trip of the health check in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_ms: Option<u64>,
    /// Optional message describing the current state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the check was performed.
    pub checked_at: Timestamp,
}

impl ServiceHealth {
    /// Creates a new healthy report.
    pub fn healthy() -> Self {
        Self::with_status(ServiceStatus::Healthy, None)
    }

    /// Creates a new degraded report.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ServiceStatus::Degraded, Some(message.into()))
    }

    /// Creates a new unhealthy report.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(ServiceStatus::Unhealthy, Some(message.into()))
    }

    fn with_status(status: ServiceStatus, message: Option<String>) -> Self {
        Self {
            status,
            response_ms: None,
            message,
            checked_at: Timestamp::now(),
        }
    }

    /// Sets the response time for this health check.
    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response_ms = Some(u64::try_from(response_time.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Returns true unless the provider is unhealthy.
    pub fn is_available(&self) -> bool {
        !matches!(self.status, ServiceStatus::Unhealthy)
    }
}

impl Default for ServiceHealth {
    fn default() -> Self {
        Self::healthy()
    }
}
