//! Managed-device registry — every fan set up in this process, by host.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use airhub_domain::error::ValidationError;
use airhub_domain::id::EntityId;

use crate::services::fan_device::FanDevice;

/// Devices keyed by connection address.
///
/// Shared explicitly (usually behind an `Arc`) between the setup path, the
/// poll loop and the broadcast handler.
pub struct ManagedDevices<V> {
    devices: RwLock<HashMap<String, Arc<FanDevice<V>>>>,
}

impl<V> Default for ManagedDevices<V> {
    fn default() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> ManagedDevices<V> {
    /// Register a device, replacing any previous device at the same host.
    ///
    /// Returns the replaced device, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateEntityId`] when another host
    /// already carries the device's entity id. Nothing is registered then.
    pub fn insert(
        &self,
        device: Arc<FanDevice<V>>,
    ) -> Result<Option<Arc<FanDevice<V>>>, ValidationError> {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(owner) = devices
            .values()
            .find(|other| other.entity_id() == device.entity_id() && other.host() != device.host())
        {
            return Err(ValidationError::DuplicateEntityId {
                entity_id: device.entity_id().to_string(),
                host: owner.host().to_string(),
            });
        }
        Ok(devices.insert(device.host().to_string(), device))
    }

    /// Remove the device at `host`.
    pub fn remove(&self, host: &str) -> Option<Arc<FanDevice<V>>> {
        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(host)
    }

    #[must_use]
    pub fn get(&self, host: &str) -> Option<Arc<FanDevice<V>>> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(host)
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registered device, ordered by entity id.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<FanDevice<V>>> {
        let mut devices: Vec<_> = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        devices.sort_by(|a, b| a.entity_id().cmp(b.entity_id()));
        devices
    }

    /// Look a device up by its entity id.
    #[must_use]
    pub fn find(&self, entity_id: &EntityId) -> Option<Arc<FanDevice<V>>> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|device| device.entity_id() == entity_id)
            .cloned()
    }

    /// Devices whose entity id is listed in `entity_ids`.
    ///
    /// Ids without a registered device are ignored.
    #[must_use]
    pub fn select(&self, entity_ids: &[EntityId]) -> Vec<Arc<FanDevice<V>>> {
        self.all()
            .into_iter()
            .filter(|device| entity_ids.contains(device.entity_id()))
            .collect()
    }
}
