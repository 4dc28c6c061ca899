//! Vendor device port — the synchronous device-control library.
//!
//! Every method blocks on network IO. Callers in the async layer run them on
//! the blocking pool (`tokio::task::spawn_blocking`), never on the executor.

use std::collections::HashMap;

use airhub_domain::entity::AttributeValue;
use airhub_domain::error::DeviceFault;
use airhub_domain::variant::RawMode;

/// Reply token the vendor library returns for an accepted command.
pub const SUCCESS: &str = "ok";

/// Whether a command reply is exactly `["ok"]`.
#[must_use]
pub fn is_success(reply: &serde_json::Value) -> bool {
    reply
        .as_array()
        .is_some_and(|items| items.len() == 1 && items[0].as_str() == Some(SUCCESS))
}

/// A single call into the vendor library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorCall {
    On,
    Off,
    SetMode(RawMode),
    SetBuzzer(bool),
    SetLed(bool),
    SetChildLock(bool),
    SetLedBrightness(i64),
    SetFavoriteLevel(i64),
    SetFanLevel(i64),
    SetAutoDetect(bool),
    SetLearnMode(bool),
    SetVolume(i64),
    SetExtraFeatures(i64),
    SetTargetHumidity(i64),
    SetDry(bool),
    SetMotorSpeed(i64),
    ResetFilter,
}

/// Underlying value of a vendor enumeration member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolValue {
    Int(i64),
    Text(String),
}

/// A field of a raw status, as the vendor library types it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Enumeration member, e.g. `OperationMode.Auto` with value `"auto"`.
    Symbol { name: String, value: SymbolValue },
}

impl RawValue {
    /// Reduce to a plain scalar; symbols become their underlying value.
    #[must_use]
    pub fn into_attribute(self) -> AttributeValue {
        match self {
            Self::Null => AttributeValue::Null,
            Self::Bool(v) => AttributeValue::Bool(v),
            Self::Int(v) | Self::Symbol { value: SymbolValue::Int(v), .. } => {
                AttributeValue::Int(v)
            }
            Self::Float(v) => AttributeValue::Float(v),
            Self::Text(v) | Self::Symbol { value: SymbolValue::Text(v), .. } => {
                AttributeValue::String(v)
            }
        }
    }
}

/// Status snapshot read from a device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatus {
    pub is_on: bool,
    pub fields: HashMap<String, RawValue>,
}

impl RawStatus {
    #[must_use]
    pub fn new(is_on: bool) -> Self {
        Self {
            is_on,
            fields: HashMap::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: RawValue) -> Self {
        self.fields.insert(field.into(), value);
        self
    }
}

/// Identity a device reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub model: String,
    pub firmware_version: String,
    pub hardware_version: String,
}

/// Blocking handle to one physical device.
pub trait VendorDevice: Send + Sync + 'static {
    /// Read the device identity.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceFault`] when the device does not answer.
    fn info(&self) -> Result<DeviceInfo, DeviceFault>;

    /// Read the current status.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceFault`] when the device does not answer.
    fn status(&self) -> Result<RawStatus, DeviceFault>;

    /// Send one command and return the raw reply.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceFault`] when the device does not answer or rejects
    /// the request at the protocol level.
    fn send(&self, call: VendorCall) -> Result<serde_json::Value, DeviceFault>;
}

impl<T: VendorDevice> VendorDevice for std::sync::Arc<T> {
    fn info(&self) -> Result<DeviceInfo, DeviceFault> {
        (**self).info()
    }

    fn status(&self) -> Result<RawStatus, DeviceFault> {
        (**self).status()
    }

    fn send(&self, call: VendorCall) -> Result<serde_json::Value, DeviceFault> {
        (**self).send(call)
    }
}
