//! # glowminder-adapter-virtual
//!
//! A simulated lamp implementing [`DeviceClient`], used when no physical
//! device endpoint is configured.
//!
//! ## Dependency rule
//!
//! Depends on `glowminder-app` (port traits) and `glowminder-domain` only.

use std::sync::{Mutex, MutexGuard, PoisonError};

use glowminder_app::ports::DeviceClient;
use glowminder_domain::error::{DeliveryError, GlowError};
use glowminder_domain::glow::{Colour, GlowCommand, Mode};

/// Snapshot of what the lamp is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampState {
    pub colour: Colour,
    pub mode: Mode,
    /// Number of glow commands received.
    pub glows: u64,
    pub online: bool,
}

impl Default for LampState {
    fn default() -> Self {
        Self {
            colour: Colour::Unset,
            mode: Mode::Unset,
            glows: 0,
            online: true,
        }
    }
}

/// An in-process lamp that records the last command it received.
#[derive(Debug, Default)]
pub struct VirtualLamp {
    state: Mutex<LampState>,
}

impl VirtualLamp {
    /// Current lamp state.
    #[must_use]
    pub fn state(&self) -> LampState {
        *self.lock_state()
    }

    /// Simulate the lamp dropping off (or coming back to) the network.
    pub fn set_online(&self, online: bool) {
        self.lock_state().online = online;
    }

    fn lock_state(&self) -> MutexGuard<'_, LampState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceClient for VirtualLamp {
    async fn glow(&self, command: GlowCommand) -> Result<(), GlowError> {
        let glows = {
            let mut state = self.lock_state();
            if !state.online {
                return Err(DeliveryError::Offline.into());
            }
            state.colour = command.colour();
            state.mode = command.mode();
            state.glows += 1;
            state.glows
        };
        tracing::info!(colour = %command.colour(), mode = %command.mode(), glows, "virtual lamp glowing");
        Ok(())
    }
}
