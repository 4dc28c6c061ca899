//! Simulated device error types.

use airhub_app::ports::VendorCall;
use airhub_domain::error::DeviceFault;

/// Errors raised by simulated devices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulatedFault {
    /// The device does not answer at all.
    #[error("no response from {host}")]
    Offline { host: String },

    /// The token does not complete the handshake.
    #[error("handshake with {host} failed: invalid token")]
    Handshake { host: String },

    /// The device reports a model no variant covers.
    #[error("device at {host} reports unsupported model {model:?}")]
    Unknown { host: String, model: String },

    /// The device has no such setting.
    #[error("{call:?} is not supported by {model}")]
    Unsupported { call: VendorCall, model: String },
}

impl SimulatedFault {
    /// Convert into a [`DeviceFault`] for propagation across the port
    /// boundary.
    #[must_use]
    pub fn into_domain(self) -> DeviceFault {
        DeviceFault::new(self.to_string())
    }
}
