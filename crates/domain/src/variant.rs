//! Device variants and their static capability, attribute and mode tables.
//!
//! Every supported sub-model is a case of [`Variant`]. What a variant can do
//! and what it reports lives in a [`VariantSpec`] table literal, so adding a
//! model is a data change only.

use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;
use crate::entity::AttributeValue;
use crate::error::ValidationError;

/// Appliance family a variant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Purifier,
    Humidifier,
    AirFresh,
}

/// Raw operation-mode value as the vendor library encodes it.
///
/// Classic devices use lowercase strings, `MiOT` devices use ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMode {
    Text(&'static str),
    Ordinal(i64),
}

impl RawMode {
    /// The plain scalar this mode is reported as.
    #[must_use]
    pub fn to_attribute(self) -> AttributeValue {
        match self {
            Self::Text(s) => AttributeValue::String(s.to_string()),
            Self::Ordinal(n) => AttributeValue::Int(n),
        }
    }

    #[must_use]
    pub fn matches(self, value: &AttributeValue) -> bool {
        match (self, value) {
            (Self::Text(s), AttributeValue::String(v)) => s == v,
            (Self::Ordinal(n), AttributeValue::Int(v)) => n == *v,
            _ => false,
        }
    }
}

/// One row of a mode table: canonical speed name ↔ raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeEntry {
    pub name: &'static str,
    pub raw: RawMode,
}

/// Static description of a variant.
#[derive(Debug)]
pub struct VariantSpec {
    /// Stable snake-case label, used in logs and API output.
    pub label: &'static str,
    pub family: Family,
    pub capabilities: Capabilities,
    /// `(public attribute name, raw status field)` pairs.
    pub attributes: &'static [(&'static str, &'static str)],
    /// Every mode the device may report.
    pub modes: &'static [ModeEntry],
    /// Speeds a user may select, a subset of [`modes`](Self::modes) by name.
    pub speeds: &'static [&'static str],
}

impl VariantSpec {
    /// Check that every selectable speed maps to a raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnmappedSpeed`] for the first speed that
    /// has no entry in the mode table.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for &speed in self.speeds {
            if !self.modes.iter().any(|m| m.name == speed) {
                return Err(ValidationError::UnmappedSpeed {
                    variant: self.label,
                    speed,
                });
            }
        }
        Ok(())
    }

    /// Look up a selectable speed, ignoring case.
    #[must_use]
    pub fn selectable_mode(&self, speed: &str) -> Option<ModeEntry> {
        let name = self
            .speeds
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(speed))?;
        self.modes.iter().find(|m| m.name == *name).copied()
    }

    /// Canonical speed name for a reported raw mode value.
    #[must_use]
    pub fn speed_for(&self, raw: &AttributeValue) -> Option<&'static str> {
        self.modes
            .iter()
            .find(|m| m.raw.matches(raw))
            .map(|m| m.name)
    }
}

/// A supported device sub-model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    #[serde(rename = "purifier")]
    PurifierGeneric,
    #[serde(rename = "purifier_pro")]
    PurifierPro,
    #[serde(rename = "purifier_pro_v7")]
    PurifierProV7,
    #[serde(rename = "purifier_2s")]
    Purifier2S,
    #[serde(rename = "purifier_3")]
    Purifier3,
    #[serde(rename = "purifier_3c")]
    Purifier3C,
    #[serde(rename = "purifier_v3")]
    PurifierV3,
    #[serde(rename = "humidifier")]
    HumidifierGeneric,
    #[serde(rename = "humidifier_ca_cb")]
    HumidifierCaCb,
    #[serde(rename = "humidifier_ca4")]
    HumidifierCa4,
    #[serde(rename = "air_fresh")]
    AirFresh,
}

impl Variant {
    pub const ALL: [Self; 11] = [
        Self::PurifierGeneric,
        Self::PurifierPro,
        Self::PurifierProV7,
        Self::Purifier2S,
        Self::Purifier3,
        Self::Purifier3C,
        Self::PurifierV3,
        Self::HumidifierGeneric,
        Self::HumidifierCaCb,
        Self::HumidifierCa4,
        Self::AirFresh,
    ];

    #[must_use]
    pub fn spec(self) -> &'static VariantSpec {
        match self {
            Self::PurifierGeneric => &PURIFIER_GENERIC,
            Self::PurifierPro => &PURIFIER_PRO,
            Self::PurifierProV7 => &PURIFIER_PRO_V7,
            Self::Purifier2S => &PURIFIER_2S,
            Self::Purifier3 => &PURIFIER_3,
            Self::Purifier3C => &PURIFIER_3C,
            Self::PurifierV3 => &PURIFIER_V3,
            Self::HumidifierGeneric => &HUMIDIFIER_GENERIC,
            Self::HumidifierCaCb => &HUMIDIFIER_CA_CB,
            Self::HumidifierCa4 => &HUMIDIFIER_CA4,
            Self::AirFresh => &AIR_FRESH,
        }
    }

    /// Whether this variant supports `capability`.
    #[must_use]
    pub fn has(self, capability: Capabilities) -> bool {
        self.spec().capabilities.contains(capability)
    }

    #[must_use]
    pub fn family(self) -> Family {
        self.spec().family
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.spec().label)
    }
}

macro_rules! projection {
    (@field $name:literal) => { $name };
    (@field $name:literal, $field:literal) => { $field };
    ($($name:literal $(=> $field:literal)?),* $(,)?) => {
        &[$(($name, projection!(@field $name $(, $field)?))),*]
    };
}

macro_rules! caps {
    ($first:ident $(| $rest:ident)*) => {
        Capabilities::$first$(.union(Capabilities::$rest))*
    };
}

const PURIFIER_MODES: &[ModeEntry] = &[
    ModeEntry { name: "Auto", raw: RawMode::Text("auto") },
    ModeEntry { name: "Silent", raw: RawMode::Text("silent") },
    ModeEntry { name: "Favorite", raw: RawMode::Text("favorite") },
    ModeEntry { name: "Idle", raw: RawMode::Text("idle") },
    ModeEntry { name: "Medium", raw: RawMode::Text("medium") },
    ModeEntry { name: "High", raw: RawMode::Text("high") },
    ModeEntry { name: "Strong", raw: RawMode::Text("strong") },
];

const PURIFIER_MIOT_MODES: &[ModeEntry] = &[
    ModeEntry { name: "Auto", raw: RawMode::Ordinal(0) },
    ModeEntry { name: "Silent", raw: RawMode::Ordinal(1) },
    ModeEntry { name: "Favorite", raw: RawMode::Ordinal(2) },
    ModeEntry { name: "Fan", raw: RawMode::Ordinal(3) },
];

const HUMIDIFIER_MODES: &[ModeEntry] = &[
    ModeEntry { name: "Silent", raw: RawMode::Text("silent") },
    ModeEntry { name: "Medium", raw: RawMode::Text("medium") },
    ModeEntry { name: "High", raw: RawMode::Text("high") },
    ModeEntry { name: "Auto", raw: RawMode::Text("auto") },
    ModeEntry { name: "Strong", raw: RawMode::Text("strong") },
];

const HUMIDIFIER_MIOT_MODES: &[ModeEntry] = &[
    ModeEntry { name: "auto", raw: RawMode::Ordinal(0) },
    ModeEntry { name: "low", raw: RawMode::Ordinal(1) },
    ModeEntry { name: "medium", raw: RawMode::Ordinal(2) },
    ModeEntry { name: "high", raw: RawMode::Ordinal(3) },
];

const AIR_FRESH_MODES: &[ModeEntry] = &[
    ModeEntry { name: "Auto", raw: RawMode::Text("auto") },
    ModeEntry { name: "Silent", raw: RawMode::Text("silent") },
    ModeEntry { name: "Interval", raw: RawMode::Text("interval") },
    ModeEntry { name: "Low", raw: RawMode::Text("low") },
    ModeEntry { name: "Middle", raw: RawMode::Text("middle") },
    ModeEntry { name: "Strong", raw: RawMode::Text("strong") },
];

static PURIFIER_GENERIC: VariantSpec = VariantSpec {
    label: "purifier",
    family: Family::Purifier,
    capabilities: caps!(
        BUZZER | CHILD_LOCK | LED | LED_BRIGHTNESS | FAVORITE_LEVEL | LEARN_MODE | RESET_FILTER
            | EXTRA_FEATURES
    ),
    attributes: projection![
        "temperature", "humidity", "aqi", "mode", "filter_hours_used", "filter_life_remaining",
        "favorite_level", "child_lock", "led", "motor_speed", "average_aqi", "learn_mode",
        "extra_features", "turbo_mode_supported", "button_pressed",
        "purify_volume", "sleep_time", "sleep_mode_learn_count", "auto_detect", "use_time",
        "buzzer", "led_brightness", "sleep_mode",
    ],
    modes: PURIFIER_MODES,
    speeds: &["Auto", "Silent", "Favorite", "Idle"],
};

static PURIFIER_PRO: VariantSpec = VariantSpec {
    label: "purifier_pro",
    family: Family::Purifier,
    capabilities: caps!(CHILD_LOCK | LED | FAVORITE_LEVEL | AUTO_DETECT | VOLUME),
    attributes: projection![
        "temperature", "humidity", "aqi", "mode", "filter_hours_used", "filter_life_remaining",
        "favorite_level", "child_lock", "led", "motor_speed", "average_aqi", "learn_mode",
        "extra_features", "turbo_mode_supported", "button_pressed",
        "purify_volume", "use_time", "filter_rfid_product_id", "filter_rfid_tag", "filter_type",
        "illuminance", "motor2_speed", "volume", "auto_detect", "sleep_time",
        "sleep_mode_learn_count",
    ],
    modes: PURIFIER_MODES,
    speeds: &["Auto", "Silent", "Favorite"],
};

static PURIFIER_PRO_V7: VariantSpec = VariantSpec {
    label: "purifier_pro_v7",
    family: Family::Purifier,
    capabilities: caps!(CHILD_LOCK | LED | FAVORITE_LEVEL | VOLUME),
    attributes: projection![
        "temperature", "humidity", "aqi", "mode", "filter_hours_used", "filter_life_remaining",
        "favorite_level", "child_lock", "led", "motor_speed", "average_aqi", "learn_mode",
        "extra_features", "turbo_mode_supported", "button_pressed",
        "filter_rfid_product_id", "filter_rfid_tag", "filter_type", "illuminance",
        "motor2_speed", "volume",
    ],
    modes: PURIFIER_MODES,
    speeds: &["Auto", "Silent", "Favorite"],
};

static PURIFIER_2S: VariantSpec = VariantSpec {
    label: "purifier_2s",
    family: Family::Purifier,
    capabilities: caps!(BUZZER | CHILD_LOCK | LED | FAVORITE_LEVEL),
    attributes: projection![
        "temperature", "humidity", "aqi", "mode", "filter_hours_used", "filter_life_remaining",
        "favorite_level", "child_lock", "led", "motor_speed", "average_aqi", "learn_mode",
        "extra_features", "turbo_mode_supported", "button_pressed",
        "buzzer", "filter_rfid_product_id", "filter_rfid_tag", "filter_type", "illuminance",
    ],
    modes: PURIFIER_MODES,
    speeds: &["Auto", "Silent", "Favorite"],
};

static PURIFIER_3: VariantSpec = VariantSpec {
    label: "purifier_3",
    family: Family::Purifier,
    capabilities: caps!(BUZZER | CHILD_LOCK | LED | FAVORITE_LEVEL | FAN_LEVEL | LED_BRIGHTNESS),
    attributes: projection![
        "temperature", "humidity", "aqi", "mode", "filter_hours_used", "filter_life_remaining",
        "favorite_level", "child_lock", "led", "motor_speed", "average_aqi", "purify_volume",
        "use_time", "buzzer", "led_brightness", "filter_rfid_product_id", "filter_rfid_tag",
        "filter_type", "fan_level",
    ],
    modes: PURIFIER_MIOT_MODES,
    speeds: &["Auto", "Silent", "Favorite", "Fan"],
};

static PURIFIER_3C: VariantSpec = VariantSpec {
    label: "purifier_3c",
    family: Family::Purifier,
    capabilities: caps!(BUZZER | CHILD_LOCK | LED | FAVORITE_LEVEL | FAN_LEVEL | LED_BRIGHTNESS),
    attributes: projection![
        "aqi", "mode", "filter_hours_used", "filter_life_remaining",
        "favorite_level" => "favorite_rpm",
        "child_lock", "motor_speed", "buzzer",
        "led_brightness" => "led_brightness_level",
    ],
    modes: PURIFIER_MIOT_MODES,
    speeds: &["Auto", "Silent", "Favorite"],
};

static PURIFIER_V3: VariantSpec = VariantSpec {
    label: "purifier_v3",
    family: Family::Purifier,
    capabilities: caps!(BUZZER | CHILD_LOCK | LED),
    attributes: projection![
        "aqi", "mode", "led", "buzzer", "child_lock", "illuminance", "filter_hours_used",
        "filter_life_remaining", "motor_speed", "average_aqi", "volume", "motor2_speed",
        "filter_rfid_product_id", "filter_rfid_tag", "filter_type", "purify_volume",
        "learn_mode", "sleep_time", "sleep_mode_learn_count", "extra_features", "auto_detect",
        "use_time", "button_pressed",
    ],
    modes: PURIFIER_MODES,
    speeds: &["Auto", "Silent", "Favorite", "Idle", "Medium", "High", "Strong"],
};

static HUMIDIFIER_GENERIC: VariantSpec = VariantSpec {
    label: "humidifier",
    family: Family::Humidifier,
    capabilities: caps!(BUZZER | CHILD_LOCK | LED | LED_BRIGHTNESS | TARGET_HUMIDITY),
    attributes: projection![
        "temperature", "humidity", "mode", "buzzer", "child_lock", "target_humidity",
        "led_brightness", "use_time",
        "trans_level", "button_pressed", "hardware_version",
    ],
    modes: HUMIDIFIER_MODES,
    speeds: &["Silent", "Medium", "High", "Strong"],
};

static HUMIDIFIER_CA_CB: VariantSpec = VariantSpec {
    label: "humidifier_ca_cb",
    family: Family::Humidifier,
    capabilities: caps!(BUZZER | CHILD_LOCK | LED | LED_BRIGHTNESS | TARGET_HUMIDITY | DRY),
    attributes: projection![
        "temperature", "humidity", "mode", "buzzer", "child_lock", "target_humidity",
        "led_brightness", "use_time",
        "motor_speed", "depth", "dry", "hardware_version",
    ],
    modes: HUMIDIFIER_MODES,
    speeds: &["Silent", "Medium", "High", "Auto"],
};

static HUMIDIFIER_CA4: VariantSpec = VariantSpec {
    label: "humidifier_ca4",
    family: Family::Humidifier,
    capabilities: caps!(BUZZER | CHILD_LOCK | LED_BRIGHTNESS | TARGET_HUMIDITY | DRY | MOTOR_SPEED),
    attributes: projection![
        "temperature", "humidity", "mode", "buzzer", "child_lock", "target_humidity",
        "led_brightness", "use_time",
        "actual_speed", "button_pressed", "dry", "fahrenheit", "motor_speed",
    ],
    modes: HUMIDIFIER_MIOT_MODES,
    speeds: &["low", "medium", "high"],
};

static AIR_FRESH: VariantSpec = VariantSpec {
    label: "air_fresh",
    family: Family::AirFresh,
    capabilities: caps!(BUZZER | CHILD_LOCK | LED | LED_BRIGHTNESS | RESET_FILTER | EXTRA_FEATURES),
    attributes: projection![
        "temperature", "aqi", "average_aqi", "co2", "humidity", "mode", "led", "led_brightness",
        "buzzer", "child_lock", "filter_life_remaining", "filter_hours_used", "use_time",
        "motor_speed", "extra_features",
    ],
    modes: AIR_FRESH_MODES,
    speeds: &["Auto", "Silent", "Interval", "Low", "Middle", "Strong"],
};
