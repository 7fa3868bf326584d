//! # glowminder-adapter-device-http
//!
//! [`DeviceClient`] over HTTP.
//!
//! Each glow is one `POST {base_url}/glow_reminder` with a JSON body carrying
//! the numeric colour and mode codes:
//!
//! ```json
//! {"colour": 1, "mode": 2}
//! ```
//!
//! Any 2xx answer counts as delivered. Other statuses, timeouts and
//! connection failures become [`GlowError::DeliveryFailed`].
//!
//! ## Dependency rule
//! Depends on `glowminder-app` (port traits) and `glowminder-domain` only.

use std::time::Duration;

use serde::Serialize;

use glowminder_app::ports::DeviceClient;
use glowminder_domain::error::{DeliveryError, GlowError};
use glowminder_domain::glow::GlowCommand;

/// Connection settings for [`HttpDeviceClient`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the lamp controller, e.g. `http://lamp.local:8080`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceHttpError {
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),

    #[error("request to device failed")]
    Request(#[from] reqwest::Error),

    #[error("device answered with status {0}")]
    Status(reqwest::StatusCode),
}

impl From<DeviceHttpError> for GlowError {
    fn from(err: DeviceHttpError) -> Self {
        match err {
            DeviceHttpError::Status(status) => DeliveryError::Rejected {
                status: status.as_u16(),
            }
            .into(),
            other => DeliveryError::Transport(Box::new(other)).into(),
        }
    }
}

/// Wire body of a glow request.
#[derive(Debug, Serialize)]
struct GlowRequest {
    colour: i64,
    mode: i64,
}

impl From<GlowCommand> for GlowRequest {
    fn from(command: GlowCommand) -> Self {
        Self {
            colour: command.colour().code(),
            mode: command.mode().code(),
        }
    }
}

/// Sends glow commands to a remote lamp controller.
pub struct HttpDeviceClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDeviceClient {
    /// Build a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHttpError::Client`] if the HTTP client cannot be
    /// constructed (e.g. TLS backend initialisation fails).
    pub fn new(config: &Config) -> Result<Self, DeviceHttpError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DeviceHttpError::Client)?;
        Ok(Self {
            client,
            endpoint: format!("{}/glow_reminder", config.base_url.trim_end_matches('/')),
        })
    }

    /// Full URL glow commands are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DeviceClient for HttpDeviceClient {
    async fn glow(&self, command: GlowCommand) -> Result<(), GlowError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GlowRequest::from(command))
            .send()
            .await
            .map_err(DeviceHttpError::from)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, endpoint = %self.endpoint, "device rejected glow command");
            return Err(DeviceHttpError::Status(status).into());
        }

        tracing::debug!(colour = %command.colour(), mode = %command.mode(), "glow command delivered");
        Ok(())
    }
}
