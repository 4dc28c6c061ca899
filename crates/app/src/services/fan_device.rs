//! Fan device — one managed appliance and its command dispatcher.
//!
//! A [`FanDevice`] owns the vendor handle of one device together with the
//! locally tracked runtime state (availability, power, last attributes).
//! Every command goes through [`FanDevice::execute`], which gates on the
//! variant's capabilities, validates arguments, then issues exactly one
//! vendor call on the blocking pool.
//!
//! Dispatch and poll are serialized per device: a status read never lands
//! on top of a local change made while it was in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airhub_domain::command::Command;
use airhub_domain::entity::{AttributeMap, EntityState};
use airhub_domain::error::{DeviceFault, InvalidArgumentError, ValidationError};
use airhub_domain::fan::FanState;
use airhub_domain::id::EntityId;
use airhub_domain::time::{Timestamp, now};
use airhub_domain::variant::{ModeEntry, Variant, VariantSpec};

use crate::ports::vendor::is_success;
use crate::ports::{RawStatus, VendorCall, VendorDevice};
use crate::services::telemetry::{MODE_ATTRIBUTE, initial_attributes, project};

/// Result of a command or a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The variant lacks the capability, or a poll was deliberately skipped.
    Skipped,
    Failed(DeviceFault),
}

impl Outcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[derive(Debug)]
struct RuntimeState {
    available: bool,
    is_on: Option<bool>,
    attributes: AttributeMap,
    skip_next_poll: bool,
    last_updated: Timestamp,
}

/// A managed fan entity backed by a vendor device handle.
pub struct FanDevice<V> {
    entity_id: EntityId,
    name: String,
    host: String,
    model: String,
    variant: Variant,
    vendor: Arc<V>,
    runtime: Mutex<RuntimeState>,
    // held across every vendor round-trip
    io_lock: tokio::sync::Mutex<()>,
}

impl<V> std::fmt::Debug for FanDevice<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanDevice")
            .field("entity_id", &self.entity_id)
            .field("host", &self.host)
            .field("model", &self.model)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

impl<V> FanDevice<V> {
    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl<V: VendorDevice> FanDevice<V> {
    /// Wrap a vendor handle.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `name` yields no entity id, `host`
    /// is empty, or the variant's speed vocabulary is not fully mapped.
    pub fn new(
        name: &str,
        host: &str,
        model: &str,
        variant: Variant,
        vendor: V,
    ) -> Result<Self, ValidationError> {
        if host.trim().is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        let spec = variant.spec();
        spec.validate()?;
        Ok(Self {
            entity_id: EntityId::from_name(name)?,
            name: name.to_string(),
            host: host.to_string(),
            model: model.to_string(),
            variant,
            vendor: Arc::new(vendor),
            runtime: Mutex::new(RuntimeState {
                available: false,
                is_on: None,
                attributes: initial_attributes(spec, model),
                skip_next_poll: false,
                last_updated: now(),
            }),
            io_lock: tokio::sync::Mutex::new(()),
        })
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.lock_runtime().available
    }

    /// Current outbound snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FanState {
        let spec = self.spec();
        let runtime = self.lock_runtime();
        let speed = if runtime.is_on == Some(true) {
            runtime
                .attributes
                .get(MODE_ATTRIBUTE)
                .and_then(|mode| spec.speed_for(mode))
                .map(str::to_string)
        } else {
            None
        };
        FanState {
            entity_id: self.entity_id.clone(),
            name: self.name.clone(),
            model: self.model.clone(),
            variant: self.variant,
            state: EntityState::from_power(runtime.available, runtime.is_on),
            speed,
            speed_list: spec.speeds.iter().map(|s| (*s).to_string()).collect(),
            capabilities: spec
                .capabilities
                .names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            attributes: runtime.attributes.clone(),
            last_updated: runtime.last_updated,
        }
    }

    /// Turn the device on, optionally selecting a speed instead.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn turn_on(&self, speed: Option<&str>) -> Result<Outcome, InvalidArgumentError> {
        self.execute(&Command::TurnOn {
            speed: speed.map(str::to_string),
        })
        .await
    }

    /// Turn the device off.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn turn_off(&self) -> Result<Outcome, InvalidArgumentError> {
        self.execute(&Command::TurnOff).await
    }

    /// Select an operation mode by its speed name.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn set_speed(&self, speed: &str) -> Result<Outcome, InvalidArgumentError> {
        self.execute(&Command::SetSpeed {
            speed: speed.to_string(),
        })
        .await
    }

    /// Dispatch one command.
    ///
    /// A command whose capability the variant lacks yields
    /// [`Outcome::Skipped`] without touching the device. Otherwise exactly
    /// one vendor call is issued. Device faults are reported as
    /// [`Outcome::Failed`], never as errors.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError`] when an argument is outside its
    /// domain or the speed is not in the variant's vocabulary. No vendor
    /// call is made in that case.
    pub async fn execute(&self, command: &Command) -> Result<Outcome, InvalidArgumentError> {
        if let Some(capability) = command.required_capability()
            && !self.variant.has(capability)
        {
            tracing::debug!(
                entity_id = %self.entity_id,
                variant = %self.variant,
                %command,
                "capability not supported, skipping"
            );
            return Ok(Outcome::Skipped);
        }
        command.validate()?;
        let (call, mode) = self.vendor_call(command)?;

        let _io = self.io_lock.lock().await;
        tracing::debug!(entity_id = %self.entity_id, %command, ?call, "sending command");
        let vendor = Arc::clone(&self.vendor);
        let reply = tokio::task::spawn_blocking(move || vendor.send(call))
            .await
            .unwrap_or_else(|err| Err(DeviceFault::new(format!("vendor call aborted: {err}"))));

        match reply {
            Ok(reply) => {
                tracing::debug!(entity_id = %self.entity_id, %reply, "response received from device");
                if is_success(&reply) {
                    self.apply_local_change(command, mode);
                    Ok(Outcome::Success)
                } else {
                    Ok(Outcome::Failed(DeviceFault::new(format!(
                        "unexpected reply {reply}"
                    ))))
                }
            }
            Err(fault) => {
                self.mark_unavailable(&fault, command.service_name());
                Ok(Outcome::Failed(fault))
            }
        }
    }

    /// Refresh availability, power state and attributes from the device.
    ///
    /// Right after a local power or speed change the poll is skipped once,
    /// since devices report the new state with a lag.
    pub async fn poll(&self) -> Outcome {
        let _io = self.io_lock.lock().await;
        {
            let mut runtime = self.lock_runtime();
            if runtime.skip_next_poll {
                runtime.skip_next_poll = false;
                tracing::debug!(entity_id = %self.entity_id, "skipping poll after local change");
                return Outcome::Skipped;
            }
        }

        let vendor = Arc::clone(&self.vendor);
        let status = tokio::task::spawn_blocking(move || vendor.status())
            .await
            .unwrap_or_else(|err| Err(DeviceFault::new(format!("status read aborted: {err}"))));

        match status {
            Ok(status) => {
                tracing::debug!(entity_id = %self.entity_id, ?status, "got new state");
                self.apply_status(&status);
                Outcome::Success
            }
            Err(fault) => {
                self.mark_unavailable(&fault, "poll");
                Outcome::Failed(fault)
            }
        }
    }

    fn spec(&self) -> &'static VariantSpec {
        self.variant.spec()
    }

    fn selectable_mode(&self, speed: &str) -> Result<ModeEntry, InvalidArgumentError> {
        self.spec()
            .selectable_mode(speed)
            .ok_or_else(|| InvalidArgumentError::UnknownSpeed(speed.to_string()))
    }

    fn vendor_call(
        &self,
        command: &Command,
    ) -> Result<(VendorCall, Option<ModeEntry>), InvalidArgumentError> {
        let call = match command {
            Command::TurnOn { speed: None } => VendorCall::On,
            Command::TurnOn { speed: Some(speed) } | Command::SetSpeed { speed } => {
                let mode = self.selectable_mode(speed)?;
                return Ok((VendorCall::SetMode(mode.raw), Some(mode)));
            }
            Command::TurnOff => VendorCall::Off,
            Command::SetBuzzer(on) => VendorCall::SetBuzzer(*on),
            Command::SetLed(on) => VendorCall::SetLed(*on),
            Command::SetChildLock(on) => VendorCall::SetChildLock(*on),
            Command::SetLedBrightness(level) => VendorCall::SetLedBrightness(*level),
            Command::SetFavoriteLevel(level) => VendorCall::SetFavoriteLevel(*level),
            Command::SetFanLevel(level) => VendorCall::SetFanLevel(*level),
            Command::SetAutoDetect(on) => VendorCall::SetAutoDetect(*on),
            Command::SetLearnMode(on) => VendorCall::SetLearnMode(*on),
            Command::SetVolume(volume) => VendorCall::SetVolume(*volume),
            Command::SetExtraFeatures(mask) => VendorCall::SetExtraFeatures(*mask),
            Command::SetTargetHumidity(humidity) => VendorCall::SetTargetHumidity(*humidity),
            Command::SetDry(on) => VendorCall::SetDry(*on),
            Command::SetMotorSpeed(rpm) => VendorCall::SetMotorSpeed(*rpm),
            Command::ResetFilter => VendorCall::ResetFilter,
        };
        Ok((call, None))
    }

    fn apply_local_change(&self, command: &Command, mode: Option<ModeEntry>) {
        if !command.changes_local_state() {
            return;
        }
        let mut runtime = self.lock_runtime();
        match command {
            Command::TurnOn { .. } => runtime.is_on = Some(true),
            Command::TurnOff => runtime.is_on = Some(false),
            _ => {}
        }
        if let Some(mode) = mode {
            runtime
                .attributes
                .insert(MODE_ATTRIBUTE.to_string(), mode.raw.to_attribute());
        }
        runtime.skip_next_poll = true;
        runtime.last_updated = now();
    }

    fn apply_status(&self, status: &RawStatus) {
        let projected = project(self.spec(), status);
        let mut runtime = self.lock_runtime();
        runtime.available = true;
        runtime.is_on = Some(status.is_on);
        runtime.attributes.extend(projected);
        runtime.last_updated = now();
    }

    fn mark_unavailable(&self, fault: &DeviceFault, action: &str) {
        let was_available = {
            let mut runtime = self.lock_runtime();
            let was_available = runtime.available;
            if was_available {
                runtime.available = false;
                runtime.last_updated = now();
            }
            was_available
        };
        if was_available {
            tracing::error!(
                entity_id = %self.entity_id,
                host = %self.host,
                action,
                error = %fault,
                "device unavailable"
            );
        }
    }

    fn lock_runtime(&self) -> MutexGuard<'_, RuntimeState> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::ports::{DeviceInfo, RawValue, SymbolValue};
    use airhub_domain::entity::AttributeValue;
    use airhub_domain::variant::RawMode;

    /// Scriptable vendor double recording every call it receives.
    #[derive(Default)]
    pub(crate) struct MockVendor {
        pub(crate) calls: Mutex<Vec<VendorCall>>,
        pub(crate) status_reads: Mutex<usize>,
        pub(crate) replies: Mutex<VecDeque<serde_json::Value>>,
        pub(crate) status: Mutex<RawStatus>,
        pub(crate) offline: AtomicBool,
        pub(crate) status_delay: Mutex<Duration>,
    }

    impl MockVendor {
        pub(crate) fn online(status: RawStatus) -> Self {
            Self {
                status: Mutex::new(status),
                ..Self::default()
            }
        }

        pub(crate) fn with_status_delay(self, delay: Duration) -> Self {
            *self.status_delay.lock().unwrap() = delay;
            self
        }

        pub(crate) fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub(crate) fn push_reply(&self, reply: serde_json::Value) {
            self.replies.lock().unwrap().push_back(reply);
        }

        pub(crate) fn calls(&self) -> Vec<VendorCall> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn status_reads(&self) -> usize {
            *self.status_reads.lock().unwrap()
        }
    }

    impl VendorDevice for MockVendor {
        fn info(&self) -> Result<DeviceInfo, DeviceFault> {
            Ok(DeviceInfo {
                model: "zhimi.airpurifier.ma4".to_string(),
                firmware_version: "2.0.0".to_string(),
                hardware_version: "esp32".to_string(),
            })
        }

        fn status(&self) -> Result<RawStatus, DeviceFault> {
            *self.status_reads.lock().unwrap() += 1;
            std::thread::sleep(*self.status_delay.lock().unwrap());
            if self.offline.load(Ordering::SeqCst) {
                return Err(DeviceFault::new("no response"));
            }
            Ok(self.status.lock().unwrap().clone())
        }

        fn send(&self, call: VendorCall) -> Result<serde_json::Value, DeviceFault> {
            self.calls.lock().unwrap().push(call);
            if self.offline.load(Ordering::SeqCst) {
                return Err(DeviceFault::new("no response"));
            }
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| json!(["ok"])))
        }
    }

    pub(crate) fn purifier_status() -> RawStatus {
        RawStatus::new(true)
            .with("aqi", RawValue::Int(17))
            .with("temperature", RawValue::Float(22.5))
            .with(
                "mode",
                RawValue::Symbol {
                    name: "Silent".to_string(),
                    value: SymbolValue::Int(1),
                },
            )
    }

    fn device(variant: Variant) -> FanDevice<Arc<MockVendor>> {
        device_with(variant, &Arc::new(MockVendor::online(purifier_status())))
    }

    fn device_with(variant: Variant, vendor: &Arc<MockVendor>) -> FanDevice<Arc<MockVendor>> {
        FanDevice::new("Bedroom", "10.0.0.2", "zhimi.test", variant, Arc::clone(vendor)).unwrap()
    }

    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        fn count(&self, needle: &str) -> usize {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .matches(needle)
                .count()
        }
    }

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn should_start_unavailable_with_null_attributes() {
        let fan = device(Variant::Purifier3);
        let state = fan.snapshot();
        assert_eq!(state.state, EntityState::Unavailable);
        assert_eq!(state.speed, None);
        assert_eq!(state.attributes["model"], AttributeValue::from("zhimi.test"));
        assert!(state.attributes["aqi"].is_null());
        assert_eq!(state.entity_id.as_str(), "fan.bedroom");
    }

    #[test]
    fn should_reject_empty_host() {
        let result = FanDevice::new("Hall", " ", "m", Variant::AirFresh, MockVendor::default());
        assert!(matches!(result, Err(ValidationError::EmptyHost)));
    }

    #[tokio::test]
    async fn should_skip_without_vendor_call_when_capability_missing() {
        let vendor = Arc::new(MockVendor::default());
        let fan = device_with(Variant::AirFresh, &vendor);

        let outcome = fan.execute(&Command::SetFavoriteLevel(5)).await.unwrap();

        assert_eq!(outcome, Outcome::Skipped);
        assert!(vendor.calls().is_empty());
    }

    #[tokio::test]
    async fn should_skip_every_unsupported_command_on_every_variant() {
        let commands = [
            Command::SetBuzzer(true),
            Command::SetLed(true),
            Command::SetChildLock(true),
            Command::SetLedBrightness(1),
            Command::SetFavoriteLevel(1),
            Command::SetFanLevel(1),
            Command::SetAutoDetect(true),
            Command::SetLearnMode(true),
            Command::SetVolume(10),
            Command::SetExtraFeatures(1),
            Command::SetTargetHumidity(50),
            Command::SetDry(true),
            Command::SetMotorSpeed(500),
            Command::ResetFilter,
        ];
        for variant in Variant::ALL {
            for command in &commands {
                let Some(capability) = command.required_capability() else {
                    continue;
                };
                let vendor = Arc::new(MockVendor::default());
                let fan = device_with(variant, &vendor);
                let outcome = fan.execute(command).await.unwrap();
                if variant.has(capability) {
                    assert_eq!(outcome, Outcome::Success, "{variant} {command}");
                    assert_eq!(vendor.calls().len(), 1, "{variant} {command}");
                } else {
                    assert_eq!(outcome, Outcome::Skipped, "{variant} {command}");
                    assert!(vendor.calls().is_empty(), "{variant} {command}");
                }
            }
        }
    }

    #[tokio::test]
    async fn should_reject_out_of_domain_brightness_without_vendor_call() {
        let vendor = Arc::new(MockVendor::default());
        let fan = device_with(Variant::Purifier3, &vendor);

        let result = fan.execute(&Command::SetLedBrightness(5)).await;
        assert!(matches!(result, Err(InvalidArgumentError::OutOfDomain { .. })));
        assert!(vendor.calls().is_empty());

        let outcome = fan.execute(&Command::SetLedBrightness(1)).await.unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(vendor.calls(), vec![VendorCall::SetLedBrightness(1)]);
    }

    #[tokio::test]
    async fn should_issue_one_call_per_reset_filter() {
        let vendor = Arc::new(MockVendor::default());
        let fan = device_with(Variant::AirFresh, &vendor);

        fan.execute(&Command::ResetFilter).await.unwrap();
        fan.execute(&Command::ResetFilter).await.unwrap();

        assert_eq!(
            vendor.calls(),
            vec![VendorCall::ResetFilter, VendorCall::ResetFilter]
        );
    }

    #[tokio::test]
    async fn should_report_failed_on_unexpected_reply_without_losing_availability() {
        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::Purifier2S, &vendor);
        fan.poll().await;
        vendor.push_reply(json!(["error"]));

        let outcome = fan.execute(&Command::SetBuzzer(true)).await.unwrap();

        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(fan.is_available());
    }

    #[tokio::test]
    async fn should_mark_unavailable_and_log_once_on_repeated_faults() {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::PurifierV3, &vendor);
        assert_eq!(fan.poll().await, Outcome::Success);
        assert!(fan.is_available());

        vendor.set_offline(true);
        let first = fan.execute(&Command::SetBuzzer(true)).await.unwrap();
        let second = fan.execute(&Command::SetBuzzer(false)).await.unwrap();
        let third = fan.poll().await;

        assert!(matches!(first, Outcome::Failed(_)));
        assert!(matches!(second, Outcome::Failed(_)));
        assert!(matches!(third, Outcome::Failed(_)));
        assert!(!fan.is_available());
        assert_eq!(capture.count("device unavailable"), 1);
    }

    #[tokio::test]
    async fn should_restore_availability_on_next_success_and_log_again_after_new_fault() {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::Purifier3, &vendor);
        assert_eq!(fan.poll().await, Outcome::Success);

        vendor.set_offline(true);
        assert!(matches!(fan.poll().await, Outcome::Failed(_)));
        assert!(!fan.is_available());
        assert_eq!(fan.snapshot().state, EntityState::Unavailable);

        vendor.set_offline(false);
        assert_eq!(fan.poll().await, Outcome::Success);
        assert!(fan.is_available());
        assert_eq!(fan.snapshot().state, EntityState::On);
        assert_eq!(capture.count("device unavailable"), 1);

        vendor.set_offline(true);
        let outcome = fan.execute(&Command::SetChildLock(true)).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(!fan.is_available());
        assert_eq!(capture.count("device unavailable"), 2);
    }

    #[tokio::test]
    async fn should_not_log_when_never_available() {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let vendor = Arc::new(MockVendor::default());
        vendor.set_offline(true);
        let fan = device_with(Variant::PurifierV3, &vendor);
        fan.poll().await;

        assert_eq!(capture.count("device unavailable"), 0);
    }

    #[tokio::test]
    async fn should_project_status_on_poll() {
        let fan = device(Variant::Purifier3);

        assert_eq!(fan.poll().await, Outcome::Success);
        let state = fan.snapshot();

        assert_eq!(state.state, EntityState::On);
        assert_eq!(state.attributes["aqi"], AttributeValue::Int(17));
        assert_eq!(state.attributes["mode"], AttributeValue::Int(1));
        assert!(state.attributes["humidity"].is_null());
        assert_eq!(state.speed.as_deref(), Some("Silent"));
    }

    #[tokio::test]
    async fn should_skip_exactly_one_poll_after_turn_off() {
        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::Purifier3, &vendor);

        assert_eq!(fan.turn_off().await.unwrap(), Outcome::Success);
        assert_eq!(fan.snapshot().state, EntityState::Unavailable);
        assert_eq!(fan.poll().await, Outcome::Skipped);
        assert_eq!(vendor.status_reads(), 0);

        assert_eq!(fan.poll().await, Outcome::Success);
        assert_eq!(vendor.status_reads(), 1);
    }

    #[tokio::test]
    async fn should_keep_local_power_change_when_poll_is_in_flight() {
        let vendor = Arc::new(
            MockVendor::online(purifier_status()).with_status_delay(Duration::from_millis(300)),
        );
        let fan = Arc::new(device_with(Variant::Purifier3, &vendor));

        let polling = tokio::spawn({
            let fan = Arc::clone(&fan);
            async move { fan.poll().await }
        });
        while vendor.status_reads() == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(fan.turn_off().await.unwrap(), Outcome::Success);
        assert_eq!(polling.await.unwrap(), Outcome::Success);

        assert_eq!(fan.snapshot().state, EntityState::Off);
        assert_eq!(fan.poll().await, Outcome::Skipped);
        assert_eq!(fan.snapshot().state, EntityState::Off);
        assert_eq!(vendor.calls(), vec![VendorCall::Off]);
    }

    #[tokio::test]
    async fn should_set_local_power_state_on_turn_on_and_off() {
        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::Purifier3, &vendor);
        fan.poll().await;

        fan.turn_off().await.unwrap();
        assert_eq!(fan.snapshot().state, EntityState::Off);
        assert_eq!(fan.snapshot().speed, None);

        fan.turn_on(None).await.unwrap();
        assert_eq!(fan.snapshot().state, EntityState::On);
        assert_eq!(vendor.calls(), vec![VendorCall::Off, VendorCall::On]);
    }

    #[tokio::test]
    async fn should_turn_on_with_speed_through_a_single_mode_call() {
        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::Purifier3, &vendor);
        fan.poll().await;

        let outcome = fan.turn_on(Some("favorite")).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(vendor.calls(), vec![VendorCall::SetMode(RawMode::Ordinal(2))]);
        let state = fan.snapshot();
        assert_eq!(state.state, EntityState::On);
        assert_eq!(state.speed.as_deref(), Some("Favorite"));
    }

    #[tokio::test]
    async fn should_update_mode_attribute_on_set_speed() {
        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::PurifierGeneric, &vendor);
        fan.poll().await;

        fan.set_speed("idle").await.unwrap();

        assert_eq!(vendor.calls(), vec![VendorCall::SetMode(RawMode::Text("idle"))]);
        assert_eq!(fan.snapshot().attributes["mode"], AttributeValue::from("idle"));
        assert_eq!(fan.poll().await, Outcome::Skipped);
    }

    #[tokio::test]
    async fn should_reject_unknown_speed_without_vendor_call() {
        let vendor = Arc::new(MockVendor::default());
        let fan = device_with(Variant::HumidifierGeneric, &vendor);

        let result = fan.set_speed("Auto").await;

        assert_eq!(
            result,
            Err(InvalidArgumentError::UnknownSpeed("Auto".to_string()))
        );
        assert!(vendor.calls().is_empty());
    }

    #[tokio::test]
    async fn should_not_arm_poll_skip_when_command_fails() {
        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::Purifier3, &vendor);
        vendor.push_reply(json!(["error"]));

        let outcome = fan.turn_off().await.unwrap();

        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(fan.poll().await, Outcome::Success);
    }

    #[tokio::test]
    async fn should_not_arm_poll_skip_for_plain_setting() {
        let vendor = Arc::new(MockVendor::online(purifier_status()));
        let fan = device_with(Variant::Purifier3, &vendor);

        fan.execute(&Command::SetChildLock(true)).await.unwrap();

        assert_eq!(fan.poll().await, Outcome::Success);
        assert_eq!(vendor.status_reads(), 1);
    }
}
