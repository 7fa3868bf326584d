//! Device client port — the lamp that glows when a reminder fires.

use std::future::Future;
use std::sync::Arc;

use glowminder_domain::error::GlowError;
use glowminder_domain::glow::GlowCommand;

/// Sends glow commands to a physical or simulated device.
pub trait DeviceClient: Send + Sync {
    /// Make the device glow with the given colour and mode.
    ///
    /// Failures are reported as [`GlowError::DeliveryFailed`].
    fn glow(&self, command: GlowCommand) -> impl Future<Output = Result<(), GlowError>> + Send;
}

impl<T: DeviceClient> DeviceClient for Arc<T> {
    fn glow(&self, command: GlowCommand) -> impl Future<Output = Result<(), GlowError>> + Send {
        (**self).glow(command)
    }
}
