//! Commands — the named actions a fan entity accepts.
//!
//! A [`Command`] is parsed from a service name plus its JSON data. Parsing
//! only checks the shape of the arguments; range checks live in
//! [`Command::validate`] and speed names are checked against the device's
//! variant by the dispatcher.

use std::fmt;

use serde_json::Value;

use crate::capability::Capabilities;
use crate::error::{AirHubError, InvalidArgumentError, NotFoundError};

/// Accepted values of an integer argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentDomain {
    /// Inclusive range.
    Range(i64, i64),
    OneOf(&'static [i64]),
}

impl ArgumentDomain {
    #[must_use]
    pub fn contains(self, value: i64) -> bool {
        match self {
            Self::Range(min, max) => (min..=max).contains(&value),
            Self::OneOf(values) => values.contains(&value),
        }
    }
}

impl fmt::Display for ArgumentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(min, max) => write!(f, "[{min}, {max}]"),
            Self::OneOf(values) => {
                f.write_str("{")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

pub const LED_BRIGHTNESS_DOMAIN: ArgumentDomain = ArgumentDomain::OneOf(&[0, 1, 2]);
pub const FAVORITE_LEVEL_DOMAIN: ArgumentDomain = ArgumentDomain::Range(0, 17);
pub const FAN_LEVEL_DOMAIN: ArgumentDomain = ArgumentDomain::Range(1, 3);
pub const VOLUME_DOMAIN: ArgumentDomain = ArgumentDomain::Range(0, 100);
pub const EXTRA_FEATURES_DOMAIN: ArgumentDomain = ArgumentDomain::Range(0, 4_294_967_295);
pub const TARGET_HUMIDITY_DOMAIN: ArgumentDomain =
    ArgumentDomain::OneOf(&[30, 40, 50, 60, 70, 80]);
pub const MOTOR_SPEED_DOMAIN: ArgumentDomain = ArgumentDomain::Range(200, 2000);

/// Every service name [`Command::parse`] understands.
pub const SERVICE_NAMES: &[&str] = &[
    "turn_on",
    "turn_off",
    "set_speed",
    "set_buzzer_on",
    "set_buzzer_off",
    "set_led_on",
    "set_led_off",
    "set_child_lock_on",
    "set_child_lock_off",
    "set_led_brightness",
    "set_favorite_level",
    "set_fan_level",
    "set_auto_detect_on",
    "set_auto_detect_off",
    "set_learn_mode_on",
    "set_learn_mode_off",
    "set_volume",
    "set_extra_features",
    "set_target_humidity",
    "set_dry_on",
    "set_dry_off",
    "set_motor_speed",
    "reset_filter",
];

/// A request for a single device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TurnOn { speed: Option<String> },
    TurnOff,
    SetSpeed { speed: String },
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

impl Command {
    /// Build a command from a service name and its data object.
    ///
    /// Keys the command does not use (such as `entity_id`) are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AirHubError::NotFound`] for an unknown service name and
    /// [`AirHubError::InvalidArgument`] for a missing or mistyped argument.
    pub fn parse(service: &str, data: &Value) -> Result<Self, AirHubError> {
        let command = match service {
            "turn_on" => Self::TurnOn {
                speed: optional_string(data, "speed")?,
            },
            "turn_off" => Self::TurnOff,
            "set_speed" => Self::SetSpeed {
                speed: optional_string(data, "speed")?
                    .ok_or(InvalidArgumentError::Missing("speed"))?,
            },
            "set_buzzer_on" => Self::SetBuzzer(true),
            "set_buzzer_off" => Self::SetBuzzer(false),
            "set_led_on" => Self::SetLed(true),
            "set_led_off" => Self::SetLed(false),
            "set_child_lock_on" => Self::SetChildLock(true),
            "set_child_lock_off" => Self::SetChildLock(false),
            "set_led_brightness" => Self::SetLedBrightness(integer(data, "brightness")?),
            "set_favorite_level" => Self::SetFavoriteLevel(integer(data, "level")?),
            "set_fan_level" => Self::SetFanLevel(integer(data, "level")?),
            "set_auto_detect_on" => Self::SetAutoDetect(true),
            "set_auto_detect_off" => Self::SetAutoDetect(false),
            "set_learn_mode_on" => Self::SetLearnMode(true),
            "set_learn_mode_off" => Self::SetLearnMode(false),
            "set_volume" => Self::SetVolume(integer(data, "volume")?),
            "set_extra_features" => Self::SetExtraFeatures(integer(data, "features")?),
            "set_target_humidity" => Self::SetTargetHumidity(integer(data, "humidity")?),
            "set_dry_on" => Self::SetDry(true),
            "set_dry_off" => Self::SetDry(false),
            "set_motor_speed" => Self::SetMotorSpeed(integer(data, "motor_speed")?),
            "reset_filter" => Self::ResetFilter,
            other => {
                return Err(NotFoundError {
                    entity: "Service",
                    id: other.to_string(),
                }
                .into());
            }
        };
        Ok(command)
    }

    /// Service name this command was (or would be) parsed from.
    #[must_use]
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::TurnOn { .. } => "turn_on",
            Self::TurnOff => "turn_off",
            Self::SetSpeed { .. } => "set_speed",
            Self::SetBuzzer(true) => "set_buzzer_on",
            Self::SetBuzzer(false) => "set_buzzer_off",
            Self::SetLed(true) => "set_led_on",
            Self::SetLed(false) => "set_led_off",
            Self::SetChildLock(true) => "set_child_lock_on",
            Self::SetChildLock(false) => "set_child_lock_off",
            Self::SetLedBrightness(_) => "set_led_brightness",
            Self::SetFavoriteLevel(_) => "set_favorite_level",
            Self::SetFanLevel(_) => "set_fan_level",
            Self::SetAutoDetect(true) => "set_auto_detect_on",
            Self::SetAutoDetect(false) => "set_auto_detect_off",
            Self::SetLearnMode(true) => "set_learn_mode_on",
            Self::SetLearnMode(false) => "set_learn_mode_off",
            Self::SetVolume(_) => "set_volume",
            Self::SetExtraFeatures(_) => "set_extra_features",
            Self::SetTargetHumidity(_) => "set_target_humidity",
            Self::SetDry(true) => "set_dry_on",
            Self::SetDry(false) => "set_dry_off",
            Self::SetMotorSpeed(_) => "set_motor_speed",
            Self::ResetFilter => "reset_filter",
        }
    }

    /// Capability a variant needs for this command, if any.
    ///
    /// Power and speed commands are available on every variant.
    #[must_use]
    pub fn required_capability(&self) -> Option<Capabilities> {
        let capability = match self {
            Self::TurnOn { .. } | Self::TurnOff | Self::SetSpeed { .. } => return None,
            Self::SetBuzzer(_) => Capabilities::BUZZER,
            Self::SetLed(_) => Capabilities::LED,
            Self::SetChildLock(_) => Capabilities::CHILD_LOCK,
            Self::SetLedBrightness(_) => Capabilities::LED_BRIGHTNESS,
            Self::SetFavoriteLevel(_) => Capabilities::FAVORITE_LEVEL,
            Self::SetFanLevel(_) => Capabilities::FAN_LEVEL,
            Self::SetAutoDetect(_) => Capabilities::AUTO_DETECT,
            Self::SetLearnMode(_) => Capabilities::LEARN_MODE,
            Self::SetVolume(_) => Capabilities::VOLUME,
            Self::SetExtraFeatures(_) => Capabilities::EXTRA_FEATURES,
            Self::SetTargetHumidity(_) => Capabilities::TARGET_HUMIDITY,
            Self::SetDry(_) => Capabilities::DRY,
            Self::SetMotorSpeed(_) => Capabilities::MOTOR_SPEED,
            Self::ResetFilter => Capabilities::RESET_FILTER,
        };
        Some(capability)
    }

    /// Name and domain of the integer argument, if the command has one.
    #[must_use]
    pub fn integer_argument(&self) -> Option<(&'static str, i64, ArgumentDomain)> {
        match *self {
            Self::SetLedBrightness(v) => Some(("brightness", v, LED_BRIGHTNESS_DOMAIN)),
            Self::SetFavoriteLevel(v) => Some(("level", v, FAVORITE_LEVEL_DOMAIN)),
            Self::SetFanLevel(v) => Some(("level", v, FAN_LEVEL_DOMAIN)),
            Self::SetVolume(v) => Some(("volume", v, VOLUME_DOMAIN)),
            Self::SetExtraFeatures(v) => Some(("features", v, EXTRA_FEATURES_DOMAIN)),
            Self::SetTargetHumidity(v) => Some(("humidity", v, TARGET_HUMIDITY_DOMAIN)),
            Self::SetMotorSpeed(v) => Some(("motor_speed", v, MOTOR_SPEED_DOMAIN)),
            _ => None,
        }
    }

    /// Check the integer argument against its domain.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError::OutOfDomain`] when the value lies
    /// outside the command's declared domain.
    pub fn validate(&self) -> Result<(), InvalidArgumentError> {
        match self.integer_argument() {
            Some((name, value, domain)) if !domain.contains(value) => {
                Err(InvalidArgumentError::OutOfDomain {
                    name,
                    value,
                    domain: domain.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether success changes the locally tracked power or speed state.
    #[must_use]
    pub fn changes_local_state(&self) -> bool {
        matches!(
            self,
            Self::TurnOn { .. } | Self::TurnOff | Self::SetSpeed { .. }
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.integer_argument() {
            Some((name, value, _)) => write!(f, "{}({name}={value})", self.service_name()),
            None => match self {
                Self::TurnOn { speed: Some(speed) } | Self::SetSpeed { speed } => {
                    write!(f, "{}(speed={speed})", self.service_name())
                }
                _ => f.write_str(self.service_name()),
            },
        }
    }
}

fn integer(data: &Value, name: &'static str) -> Result<i64, InvalidArgumentError> {
    match data.get(name) {
        None | Some(Value::Null) => Err(InvalidArgumentError::Missing(name)),
        Some(Value::Number(number)) => number
            .as_i64()
            .ok_or(InvalidArgumentError::NotAnInteger { name }),
        Some(Value::String(text)) => text
            .trim()
            .parse()
            .map_err(|_| InvalidArgumentError::NotAnInteger { name }),
        Some(_) => Err(InvalidArgumentError::NotAnInteger { name }),
    }
}

fn optional_string(
    data: &Value,
    name: &'static str,
) -> Result<Option<String>, InvalidArgumentError> {
    match data.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(InvalidArgumentError::NotAString { name }),
    }
}
