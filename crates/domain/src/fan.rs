//! Fan snapshot — the outbound view of one managed device.

use serde::{Deserialize, Serialize};

use crate::entity::{AttributeMap, EntityState};
use crate::id::EntityId;
use crate::time::Timestamp;
use crate::variant::Variant;

/// Point-in-time state of a fan entity, as published and served over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanState {
    pub entity_id: EntityId,
    pub name: String,
    pub model: String,
    pub variant: Variant,
    pub state: EntityState,
    /// Current speed name, only reported while the fan is on.
    pub speed: Option<String>,
    pub speed_list: Vec<String>,
    pub capabilities: Vec<String>,
    pub attributes: AttributeMap,
    pub last_updated: Timestamp,
}

impl FanState {
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state == EntityState::On
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }
}
