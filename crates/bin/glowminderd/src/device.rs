//! Device selection — the HTTP lamp controller when an endpoint is
//! configured, the virtual lamp otherwise.

use glowminder_adapter_device_http::{DeviceHttpError, HttpDeviceClient};
use glowminder_adapter_virtual::VirtualLamp;
use glowminder_app::ports::DeviceClient;
use glowminder_domain::error::GlowError;
use glowminder_domain::glow::GlowCommand;

/// The device the scheduler delivers glow commands to.
pub enum Lamp {
    Http(HttpDeviceClient),
    Virtual(VirtualLamp),
}

impl Lamp {
    /// Pick a lamp from the optional device configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHttpError::Client`] if the HTTP client cannot be built.
    pub fn from_config(
        config: Option<&glowminder_adapter_device_http::Config>,
    ) -> Result<Self, DeviceHttpError> {
        match config {
            Some(config) => HttpDeviceClient::new(config).map(Self::Http),
            None => Ok(Self::Virtual(VirtualLamp::default())),
        }
    }

    /// Short description for the startup log.
    #[must_use]
    pub fn describe(&self) -> &str {
        match self {
            Self::Http(client) => client.endpoint(),
            Self::Virtual(_) => "virtual lamp",
        }
    }
}

impl DeviceClient for Lamp {
    async fn glow(&self, command: GlowCommand) -> Result<(), GlowError> {
        match self {
            Self::Http(client) => client.glow(command).await,
            Self::Virtual(lamp) => lamp.glow(command).await,
        }
    }
}
