//! Device connector port — opens vendor handles for configured devices.

use std::future::Future;

use airhub_domain::error::{DeviceFault, ValidationError};

use crate::ports::vendor::VendorDevice;

/// Address and credentials of one device.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub token: String,
}

/// Length of a device token, in hexadecimal characters.
pub const TOKEN_LEN: usize = 32;

impl Endpoint {
    /// Build an endpoint, checking the host is set and the token is
    /// [`TOKEN_LEN`] hexadecimal characters.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyHost`] or
    /// [`ValidationError::InvalidToken`].
    pub fn new(
        host: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let endpoint = Self {
            host: host.into(),
            token: token.into(),
        };
        if endpoint.host.trim().is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        if !endpoint.has_well_formed_token() {
            return Err(ValidationError::InvalidToken);
        }
        Ok(endpoint)
    }

    #[must_use]
    pub fn has_well_formed_token(&self) -> bool {
        self.token.len() == TOKEN_LEN && self.token.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Token prefix that is safe to log.
    #[must_use]
    pub fn token_hint(&self) -> &str {
        self.token.get(..5).unwrap_or(&self.token)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("token", &format_args!("{}...", self.token_hint()))
            .finish()
    }
}

/// Creates vendor handles.
///
/// `model` is the already known (configured or detected) model string, so
/// connectors that pick a protocol flavour per model can do so.
pub trait DeviceConnector: Send + Sync {
    type Device: VendorDevice;

    /// Open a handle to the device at `endpoint`.
    fn connect(
        &self,
        endpoint: &Endpoint,
        model: Option<&str>,
    ) -> impl Future<Output = Result<Self::Device, DeviceFault>> + Send;
}

impl<T: DeviceConnector> DeviceConnector for std::sync::Arc<T> {
    type Device = T::Device;

    fn connect(
        &self,
        endpoint: &Endpoint,
        model: Option<&str>,
    ) -> impl Future<Output = Result<Self::Device, DeviceFault>> + Send {
        (**self).connect(endpoint, model)
    }
}
