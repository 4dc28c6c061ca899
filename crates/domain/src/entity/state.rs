//! Entity state — the current operational state of a fan entity.

use serde::{Deserialize, Serialize};

/// Discrete operational state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
}

impl EntityState {
    /// Derive the reported state from availability and the on/off flag.
    ///
    /// An unavailable device is reported as such regardless of the last
    /// known power state.
    #[must_use]
    pub fn from_power(available: bool, is_on: Option<bool>) -> Self {
        match (available, is_on) {
            (false, _) => Self::Unavailable,
            (true, Some(true)) => Self::On,
            (true, Some(false)) => Self::Off,
            (true, None) => Self::Unknown,
        }
    }

    /// Whether the entity is reachable (anything but [`Unavailable`](Self::Unavailable)).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
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
