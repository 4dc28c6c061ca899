//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`AirHubError`]
//! via `#[from]` at the port boundary.

/// Top-level error for airhub operations.
#[derive(Debug, thiserror::Error)]
pub enum AirHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("unsupported model")]
    UnsupportedModel(#[from] UnsupportedModelError),

    #[error("invalid argument")]
    InvalidArgument(#[from] InvalidArgumentError),

    #[error("device communication failure")]
    Device(#[from] DeviceFault),
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("host must not be empty")]
    EmptyHost,

    #[error("entity id {0:?} is not of the form `fan.<object_id>`")]
    MalformedEntityId(String),

    #[error("device token must be 32 hexadecimal characters")]
    InvalidToken,

    #[error("entity id {entity_id} is already used by the device at {host}")]
    DuplicateEntityId { entity_id: String, host: String },

    #[error("speed {speed:?} of {variant} has no raw mode mapping")]
    UnmappedSpeed {
        variant: &'static str,
        speed: &'static str,
    },
}

/// A looked-up resource does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of resource (e.g. `"Fan"`, `"Service"`).
    pub entity: &'static str,
    pub id: String,
}

/// The model string matches neither a known model nor a family prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported device model {model:?}")]
pub struct UnsupportedModelError {
    pub model: String,
}

/// A command argument is missing, malformed, or outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgumentError {
    #[error("missing argument `{0}`")]
    Missing(&'static str),

    #[error("argument `{name}` must be an integer")]
    NotAnInteger { name: &'static str },

    #[error("argument `{name}` must be a string")]
    NotAString { name: &'static str },

    #[error("argument `{name}` = {value} is outside {domain}")]
    OutOfDomain {
        name: &'static str,
        value: i64,
        domain: String,
    },

    #[error("speed {0:?} is not supported by this device")]
    UnknownSpeed(String),
}

/// The vendor library could not talk to the device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct DeviceFault {
    pub reason: String,
}

impl DeviceFault {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_airhub_error() {
        let err: AirHubError = ValidationError::EmptyName.into();
        assert!(matches!(err, AirHubError::Validation(ValidationError::EmptyName)));
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Fan",
            id: "fan.kitchen".to_string(),
        };
        assert_eq!(err.to_string(), "Fan fan.kitchen not found");
    }

    #[test]
    fn should_display_unsupported_model() {
        let err = UnsupportedModelError {
            model: "acme.toaster.v1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported device model \"acme.toaster.v1\""
        );
    }

    #[test]
    fn should_display_out_of_domain_argument() {
        let err = InvalidArgumentError::OutOfDomain {
            name: "brightness",
            value: 5,
            domain: "{0, 1, 2}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "argument `brightness` = 5 is outside {0, 1, 2}"
        );
    }

    #[test]
    fn should_display_device_fault_reason() {
        let fault = DeviceFault::new("no response from 10.0.0.3");
        assert_eq!(fault.to_string(), "no response from 10.0.0.3");
    }
}
