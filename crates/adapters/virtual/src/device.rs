//! Simulated appliance — answers vendor calls from in-memory state.
//!
//! The device behaves like the model it is created for: it only accepts
//! settings its variant supports, reports the raw fields of that variant
//! (including the 3C field renames) and encodes its operation mode and led
//! brightness as enumeration members.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use airhub_app::ports::{DeviceInfo, RawStatus, RawValue, SymbolValue, VendorCall, VendorDevice};
use airhub_domain::capability::Capabilities;
use airhub_domain::error::{DeviceFault, UnsupportedModelError};
use airhub_domain::model::resolve;
use airhub_domain::variant::{ModeEntry, RawMode, Variant};

use crate::error::SimulatedFault;

const LED_BRIGHTNESS_NAMES: [&str; 3] = ["Bright", "Dim", "Off"];

/// How a simulated device misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultMode {
    #[default]
    Healthy,
    /// Every call fails as if the device dropped off the network.
    Offline,
    /// Commands are answered with an error reply, status reads still work.
    Rejecting,
}

#[derive(Debug)]
struct SimState {
    is_on: bool,
    mode: ModeEntry,
    led_brightness: i64,
    values: HashMap<&'static str, RawValue>,
    fault: FaultMode,
    commands: usize,
}

/// An in-memory stand-in for one appliance.
#[derive(Debug)]
pub struct SimulatedDevice {
    host: String,
    model: String,
    variant: Variant,
    state: Mutex<SimState>,
}

impl SimulatedDevice {
    /// Create a powered-on device of the given model.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedModelError`] when the model maps to no variant.
    pub fn new(host: &str, model: &str) -> Result<Self, UnsupportedModelError> {
        let variant = resolve(model)?.variant;
        let spec = variant.spec();
        let mode = spec
            .modes
            .first()
            .copied()
            .unwrap_or(ModeEntry {
                name: "Auto",
                raw: RawMode::Text("auto"),
            });
        Ok(Self {
            host: host.to_string(),
            model: model.to_string(),
            variant,
            state: Mutex::new(SimState {
                is_on: true,
                mode,
                led_brightness: 0,
                values: default_values(),
                fault: FaultMode::Healthy,
                commands: 0,
            }),
        })
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Change how the device misbehaves from now on.
    pub fn set_fault(&self, fault: FaultMode) {
        tracing::debug!(host = %self.host, ?fault, "simulated fault mode changed");
        self.lock_state().fault = fault;
    }

    /// Number of commands the device has received, accepted or not.
    #[must_use]
    pub fn commands_received(&self) -> usize {
        self.lock_state().commands
    }

    fn apply(&self, state: &mut SimState, call: VendorCall) -> Result<(), SimulatedFault> {
        if let Some(capability) = required_capability(call)
            && !self.variant.has(capability)
        {
            return Err(SimulatedFault::Unsupported {
                call,
                model: self.model.clone(),
            });
        }
        let (field, value) = match call {
            VendorCall::On => {
                state.is_on = true;
                return Ok(());
            }
            VendorCall::Off => {
                state.is_on = false;
                return Ok(());
            }
            VendorCall::SetMode(raw) => {
                let entry = self
                    .variant
                    .spec()
                    .modes
                    .iter()
                    .find(|m| m.raw == raw)
                    .copied()
                    .ok_or_else(|| SimulatedFault::Unsupported {
                        call,
                        model: self.model.clone(),
                    })?;
                state.mode = entry;
                state.is_on = true;
                return Ok(());
            }
            VendorCall::SetLedBrightness(level) => {
                state.led_brightness = level;
                return Ok(());
            }
            VendorCall::ResetFilter => {
                state.values.insert("filter_hours_used", RawValue::Int(0));
                state.values.insert("filter_life_remaining", RawValue::Int(100));
                return Ok(());
            }
            VendorCall::SetBuzzer(on) => ("buzzer", RawValue::Bool(on)),
            VendorCall::SetLed(on) => ("led", RawValue::Bool(on)),
            VendorCall::SetChildLock(on) => ("child_lock", RawValue::Bool(on)),
            VendorCall::SetFavoriteLevel(level) => ("favorite_level", RawValue::Int(level)),
            VendorCall::SetFanLevel(level) => ("fan_level", RawValue::Int(level)),
            VendorCall::SetAutoDetect(on) => ("auto_detect", RawValue::Bool(on)),
            VendorCall::SetLearnMode(on) => ("learn_mode", RawValue::Bool(on)),
            VendorCall::SetVolume(volume) => ("volume", RawValue::Int(volume)),
            VendorCall::SetExtraFeatures(mask) => ("extra_features", RawValue::Int(mask)),
            VendorCall::SetTargetHumidity(humidity) => {
                ("target_humidity", RawValue::Int(humidity))
            }
            VendorCall::SetDry(on) => ("dry", RawValue::Bool(on)),
            VendorCall::SetMotorSpeed(rpm) => ("motor_speed", RawValue::Int(rpm)),
        };
        state.values.insert(field, value);
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VendorDevice for SimulatedDevice {
    fn info(&self) -> Result<DeviceInfo, DeviceFault> {
        if self.lock_state().fault == FaultMode::Offline {
            return Err(self.offline());
        }
        Ok(DeviceInfo {
            model: self.model.clone(),
            firmware_version: "1.4.3_9000".to_string(),
            hardware_version: "MW300".to_string(),
        })
    }

    fn status(&self) -> Result<RawStatus, DeviceFault> {
        let state = self.lock_state();
        if state.fault == FaultMode::Offline {
            return Err(self.offline());
        }
        let mut status = RawStatus::new(state.is_on);
        for &(_, field) in self.variant.spec().attributes {
            let value = match field {
                "mode" => Some(symbol(state.mode.name, state.mode.raw)),
                "led_brightness" | "led_brightness_level" => Some(led_brightness(state.led_brightness)),
                other => state.values.get(other).cloned(),
            };
            if let Some(value) = value {
                status.fields.insert(field.to_string(), value);
            }
        }
        Ok(status)
    }

    fn send(&self, call: VendorCall) -> Result<serde_json::Value, DeviceFault> {
        let mut state = self.lock_state();
        state.commands += 1;
        match state.fault {
            FaultMode::Offline => return Err(self.offline()),
            FaultMode::Rejecting => return Ok(serde_json::json!(["error"])),
            FaultMode::Healthy => {}
        }
        self.apply(&mut state, call)
            .map_err(SimulatedFault::into_domain)?;
        tracing::trace!(host = %self.host, ?call, "simulated command applied");
        Ok(serde_json::json!(["ok"]))
    }
}

impl SimulatedDevice {
    fn offline(&self) -> DeviceFault {
        SimulatedFault::Offline {
            host: self.host.clone(),
        }
        .into_domain()
    }
}

fn required_capability(call: VendorCall) -> Option<Capabilities> {
    let capability = match call {
        VendorCall::On | VendorCall::Off | VendorCall::SetMode(_) => return None,
        VendorCall::SetBuzzer(_) => Capabilities::BUZZER,
        VendorCall::SetLed(_) => Capabilities::LED,
        VendorCall::SetChildLock(_) => Capabilities::CHILD_LOCK,
        VendorCall::SetLedBrightness(_) => Capabilities::LED_BRIGHTNESS,
        VendorCall::SetFavoriteLevel(_) => Capabilities::FAVORITE_LEVEL,
        VendorCall::SetFanLevel(_) => Capabilities::FAN_LEVEL,
        VendorCall::SetAutoDetect(_) => Capabilities::AUTO_DETECT,
        VendorCall::SetLearnMode(_) => Capabilities::LEARN_MODE,
        VendorCall::SetVolume(_) => Capabilities::VOLUME,
        VendorCall::SetExtraFeatures(_) => Capabilities::EXTRA_FEATURES,
        VendorCall::SetTargetHumidity(_) => Capabilities::TARGET_HUMIDITY,
        VendorCall::SetDry(_) => Capabilities::DRY,
        VendorCall::SetMotorSpeed(_) => Capabilities::MOTOR_SPEED,
        VendorCall::ResetFilter => Capabilities::RESET_FILTER,
    };
    Some(capability)
}

fn symbol(name: &str, raw: RawMode) -> RawValue {
    let value = match raw {
        RawMode::Text(text) => SymbolValue::Text(text.to_string()),
        RawMode::Ordinal(n) => SymbolValue::Int(n),
    };
    RawValue::Symbol {
        name: name.to_string(),
        value,
    }
}

fn led_brightness(level: i64) -> RawValue {
    let name = usize::try_from(level)
        .ok()
        .and_then(|idx| LED_BRIGHTNESS_NAMES.get(idx))
        .copied()
        .unwrap_or("Unknown");
    RawValue::Symbol {
        name: name.to_string(),
        value: SymbolValue::Int(level),
    }
}

/// Plausible readings for every raw field a simulated device reports.
///
/// Fields missing here (e.g. `button_pressed`) are absent from the status,
/// as on real hardware that has not reported them yet.
fn default_values() -> HashMap<&'static str, RawValue> {
    [
        ("temperature", RawValue::Float(22.4)),
        ("humidity", RawValue::Int(41)),
        ("aqi", RawValue::Int(9)),
        ("average_aqi", RawValue::Int(11)),
        ("co2", RawValue::Int(520)),
        ("filter_hours_used", RawValue::Int(412)),
        ("filter_life_remaining", RawValue::Int(81)),
        ("favorite_level", RawValue::Int(10)),
        ("favorite_rpm", RawValue::Int(1200)),
        ("fan_level", RawValue::Int(2)),
        ("child_lock", RawValue::Bool(false)),
        ("led", RawValue::Bool(true)),
        ("buzzer", RawValue::Bool(true)),
        ("motor_speed", RawValue::Int(760)),
        ("motor2_speed", RawValue::Int(0)),
        ("learn_mode", RawValue::Bool(false)),
        ("auto_detect", RawValue::Bool(false)),
        ("extra_features", RawValue::Int(0)),
        ("turbo_mode_supported", RawValue::Bool(true)),
        ("volume", RawValue::Int(50)),
        ("use_time", RawValue::Int(2_419_200)),
        ("purify_volume", RawValue::Int(27_431)),
        ("sleep_time", RawValue::Int(83_890)),
        ("sleep_mode_learn_count", RawValue::Int(0)),
        ("target_humidity", RawValue::Int(50)),
        ("dry", RawValue::Bool(false)),
        ("depth", RawValue::Int(60)),
        ("actual_speed", RawValue::Int(0)),
        ("fahrenheit", RawValue::Float(72.3)),
        ("trans_level", RawValue::Int(85)),
        ("illuminance", RawValue::Int(120)),
        ("filter_type", RawValue::Text("regular".to_string())),
        ("filter_rfid_tag", RawValue::Text("80:66:58:da:a3:74:d4".to_string())),
        ("filter_rfid_product_id", RawValue::Text("0:0:31:31".to_string())),
        ("hardware_version", RawValue::Text("0001".to_string())),
    ]
    .into_iter()
    .collect()
}
