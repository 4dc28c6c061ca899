//! Capabilities — optional features a device variant may or may not support.

use bitflags::bitflags;

bitflags! {
    /// Set of optional commands a variant accepts.
    ///
    /// A command whose capability is missing is skipped silently, never
    /// rejected.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        const BUZZER = 1;
        const LED = 1 << 1;
        const CHILD_LOCK = 1 << 2;
        const LED_BRIGHTNESS = 1 << 3;
        const FAVORITE_LEVEL = 1 << 4;
        const AUTO_DETECT = 1 << 5;
        const LEARN_MODE = 1 << 6;
        const VOLUME = 1 << 7;
        const RESET_FILTER = 1 << 8;
        const EXTRA_FEATURES = 1 << 9;
        const TARGET_HUMIDITY = 1 << 10;
        const DRY = 1 << 11;
        const FAN_LEVEL = 1 << 12;
        const MOTOR_SPEED = 1 << 13;
    }
}

impl Capabilities {
    /// Names of the contained capabilities, for logs and API output.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}
