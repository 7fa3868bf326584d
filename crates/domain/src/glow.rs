//! Glow parameters — the colour and mode a lamp shows when a reminder fires.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lamp colour. [`Unset`](Self::Unset) is only valid while a draft is being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    #[default]
    Unset,
    Red,
    Green,
    Blue,
}

impl Colour {
    /// Numeric code used on the device wire and in storage.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Unset => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Blue => 3,
        }
    }

    /// Inverse of [`code`](Self::code).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownColour`] for codes outside `0..=3`.
    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(Self::Unset),
            1 => Ok(Self::Red),
            2 => Ok(Self::Green),
            3 => Ok(Self::Blue),
            other => Err(ValidationError::UnknownColour(other.to_string())),
        }
    }

    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Colour {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            other => Err(ValidationError::UnknownColour(other.to_string())),
        }
    }
}

/// Lamp effect. [`Unset`](Self::Unset) is only valid while a draft is being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Unset,
    Static,
    Blinking,
}

impl Mode {
    /// Numeric code used on the device wire and in storage.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Unset => 0,
            Self::Static => 1,
            Self::Blinking => 2,
        }
    }

    /// Inverse of [`code`](Self::code).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownMode`] for codes outside `0..=2`.
    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(Self::Unset),
            1 => Ok(Self::Static),
            2 => Ok(Self::Blinking),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }

    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Static => "static",
            Self::Blinking => "blinking",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Self::Static),
            "blinking" => Ok(Self::Blinking),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// An actionable colour + mode pair. Neither half can be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GlowCommand {
    colour: Colour,
    mode: Mode,
}

impl GlowCommand {
    /// Build a command, rejecting unset halves.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsetColour`] or [`ValidationError::UnsetMode`].
    pub fn new(colour: Colour, mode: Mode) -> Result<Self, ValidationError> {
        if !colour.is_set() {
            return Err(ValidationError::UnsetColour);
        }
        if !mode.is_set() {
            return Err(ValidationError::UnsetMode);
        }
        Ok(Self { colour, mode })
    }

    #[must_use]
    pub const fn colour(self) -> Colour {
        self.colour
    }

    #[must_use]
    pub const fn mode(self) -> Mode {
        self.mode
    }
}
