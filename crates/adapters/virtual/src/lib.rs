//! # airhub-adapter-virtual
//!
//! Virtual/demo adapter that stands in for the vendor device-control
//! library with simulated appliances, for testing and demonstration.
//!
//! ## Behaviour
//!
//! | Aspect | Simulation |
//! |--------|------------|
//! | Identity | Reports the model it was connected as (or the connector's default) |
//! | Status | Raw fields of the model's variant, mode and led brightness as enum members |
//! | Commands | Applied to in-memory state; settings the variant lacks raise a fault |
//! | Faults | Per host: healthy, offline, or rejecting commands with an error reply |
//!
//! ## Dependency rule
//!
//! Depends on `airhub-app` (port traits) and `airhub-domain` only.

mod device;
mod error;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use airhub_app::ports::{DeviceConnector, Endpoint};
use airhub_domain::error::DeviceFault;

pub use device::{FaultMode, SimulatedDevice};
pub use error::SimulatedFault;

/// Model assumed for devices connected without one.
pub const DEFAULT_MODEL: &str = airhub_domain::model::MODEL_AIRPURIFIER_3;

/// Connector handing out [`SimulatedDevice`]s, one per host.
///
/// Connecting twice to the same host returns the same device, so state
/// survives a re-setup.
pub struct VirtualConnector {
    default_model: String,
    faults: HashMap<String, FaultMode>,
    devices: Mutex<HashMap<String, Arc<SimulatedDevice>>>,
}

impl Default for VirtualConnector {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl VirtualConnector {
    /// Create a connector whose devices report `default_model` when no
    /// model is given at connection time.
    #[must_use]
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
            faults: HashMap::new(),
            devices: Mutex::new(HashMap::new()),
        }
    }

    /// Make the device at `host` misbehave from its first call on.
    #[must_use]
    pub fn with_fault(mut self, host: impl Into<String>, fault: FaultMode) -> Self {
        self.faults.insert(host.into(), fault);
        self
    }

    /// The simulated device connected at `host`, if any.
    #[must_use]
    pub fn device(&self, host: &str) -> Option<Arc<SimulatedDevice>> {
        self.devices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(host)
            .cloned()
    }

    fn open(&self, endpoint: &Endpoint, model: Option<&str>) -> Result<Arc<SimulatedDevice>, SimulatedFault> {
        if !endpoint.has_well_formed_token() {
            return Err(SimulatedFault::Handshake {
                host: endpoint.host.clone(),
            });
        }
        let mut devices = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = devices.get(&endpoint.host) {
            return Ok(Arc::clone(existing));
        }

        let model = model.unwrap_or(&self.default_model);
        let device = SimulatedDevice::new(&endpoint.host, model).map_err(|err| {
            SimulatedFault::Unknown {
                host: endpoint.host.clone(),
                model: err.model,
            }
        })?;
        if let Some(fault) = self.faults.get(&endpoint.host) {
            device.set_fault(*fault);
        }
        tracing::info!(host = %endpoint.host, model, "simulated device connected");

        let device = Arc::new(device);
        devices.insert(endpoint.host.clone(), Arc::clone(&device));
        Ok(device)
    }
}

impl DeviceConnector for VirtualConnector {
    type Device = Arc<SimulatedDevice>;

    async fn connect(
        &self,
        endpoint: &Endpoint,
        model: Option<&str>,
    ) -> Result<Self::Device, DeviceFault> {
        self.open(endpoint, model).map_err(SimulatedFault::into_domain)
    }
}
