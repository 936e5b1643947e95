//! Entity state as seen by the host.

use serde::{Deserialize, Serialize};

/// Discrete state of an entity.
///
/// Sensors and numbers report [`On`](Self::On) while they hold a value and
/// [`Unknown`](Self::Unknown) while the device did not report one; the value
/// itself lives in the entity's `value` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
}

impl EntityState {
    /// Anything but [`Unavailable`](Self::Unavailable).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// `On`/`Off` from an optional switch position.
    #[must_use]
    pub fn from_switch(is_on: Option<bool>) -> Self {
        match is_on {
            Some(true) => Self::On,
            Some(false) => Self::Off,
            None => Self::Unknown,
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unknown => f.write_str("unknown"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}
