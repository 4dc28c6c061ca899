//! Fan service — use-cases over every managed fan.
//!
//! Sets devices up (model resolution, connection, registration), forwards
//! per-fan commands, drives polls and fans named services out to many
//! devices at once.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinSet;

use airhub_domain::command::Command;
use airhub_domain::error::{
    AirHubError, DeviceFault, InvalidArgumentError, NotFoundError, UnsupportedModelError,
};
use airhub_domain::fan::FanState;
use airhub_domain::id::EntityId;
use airhub_domain::model::{MatchTier, resolve};

use crate::ports::{DeviceConnector, Endpoint, StatePublisher, VendorDevice};
use crate::services::device_registry::ManagedDevices;
use crate::services::fan_device::{FanDevice, Outcome};

/// Data key that scopes a named service to specific entities.
pub const ENTITY_ID_KEY: &str = "entity_id";

/// What is needed to set one device up.
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    pub name: String,
    pub endpoint: Endpoint,
    /// Model string; detected from the device when absent.
    pub model: Option<String>,
}

/// Result of a command sent to a single fan.
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub outcome: Outcome,
    pub state: FanState,
}

/// Result of a named service for one target.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub entity_id: EntityId,
    /// Rejected arguments (such as a speed outside this variant's
    /// vocabulary) only affect this target.
    pub outcome: Result<Outcome, InvalidArgumentError>,
    pub state: FanState,
}

/// Result of a named service across all its targets, ordered by entity id.
#[derive(Debug, Clone)]
pub struct BroadcastReport {
    pub service: &'static str,
    pub targets: Vec<TargetReport>,
}

/// Application service for fan setup, commands and polling.
pub struct FanService<C: DeviceConnector, P> {
    connector: C,
    publisher: P,
    devices: Arc<ManagedDevices<C::Device>>,
}

impl<C, P> FanService<C, P>
where
    C: DeviceConnector,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    /// Create a new service with an empty device registry.
    pub fn new(connector: C, publisher: P) -> Self {
        Self::with_devices(connector, publisher, Arc::default())
    }

    /// Create a new service on top of an existing registry.
    pub fn with_devices(
        connector: C,
        publisher: P,
        devices: Arc<ManagedDevices<C::Device>>,
    ) -> Self {
        Self {
            connector,
            publisher,
            devices,
        }
    }

    #[must_use]
    pub fn devices(&self) -> &Arc<ManagedDevices<C::Device>> {
        &self.devices
    }

    /// Resolve, connect and register a device, then read its first status.
    ///
    /// # Errors
    ///
    /// Returns [`AirHubError::UnsupportedModel`] when the model matches no
    /// variant (nothing is registered), [`AirHubError::Device`] when the
    /// device cannot be reached for identification, or
    /// [`AirHubError::Validation`] for an unusable name or host, or a name
    /// whose entity id another host already carries.
    #[tracing::instrument(skip(self, settings), fields(host = %settings.endpoint.host, name = %settings.name))]
    pub async fn setup_device(&self, settings: DeviceSettings) -> Result<FanState, AirHubError> {
        tracing::debug!(
            token = %format_args!("{}...", settings.endpoint.token_hint()),
            "initializing device"
        );
        if let Some(model) = &settings.model {
            resolve(model)?;
        }

        let vendor = self
            .connector
            .connect(&settings.endpoint, settings.model.as_deref())
            .await?;
        let (model, vendor) = match settings.model {
            Some(model) => (model, vendor),
            None => identify(vendor).await?,
        };

        let resolution = resolve(&model).inspect_err(|err| {
            tracing::error!(model = %err.model, "unsupported device found");
        })?;
        if resolution.tier == MatchTier::FamilyPrefix {
            tracing::warn!(
                model = %model,
                variant = %resolution.variant,
                "no dedicated variant for model, using family defaults"
            );
        }

        let device = Arc::new(FanDevice::new(
            &settings.name,
            &settings.endpoint.host,
            &model,
            resolution.variant,
            vendor,
        )?);
        if let Some(previous) = self.devices.insert(Arc::clone(&device))? {
            tracing::warn!(replaced = %previous.entity_id(), "host was already managed");
        }
        tracing::info!(entity_id = %device.entity_id(), variant = %resolution.variant, "device set up");

        device.poll().await;
        Ok(self.publish(&device).await)
    }

    /// Stop managing the device at `host`.
    ///
    /// # Errors
    ///
    /// Returns [`AirHubError::NotFound`] when no device uses `host`.
    #[tracing::instrument(skip(self))]
    pub fn remove_device(&self, host: &str) -> Result<FanState, AirHubError> {
        self.devices
            .remove(host)
            .map(|device| device.snapshot())
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Host",
                    id: host.to_string(),
                }
                .into()
            })
    }

    /// Snapshots of every managed fan.
    #[must_use]
    pub fn list_fans(&self) -> Vec<FanState> {
        self.devices.all().iter().map(|device| device.snapshot()).collect()
    }

    /// Snapshot of one fan.
    ///
    /// # Errors
    ///
    /// Returns [`AirHubError::NotFound`] for an unknown entity id.
    pub fn get_fan(&self, entity_id: &EntityId) -> Result<FanState, AirHubError> {
        Ok(self.find(entity_id)?.snapshot())
    }

    /// Turn one fan on, optionally at a given speed.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn turn_on(
        &self,
        entity_id: &EntityId,
        speed: Option<&str>,
    ) -> Result<CommandReport, AirHubError> {
        let command = Command::TurnOn {
            speed: speed.map(str::to_string),
        };
        self.command(entity_id, &command).await
    }

    /// Turn one fan off.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn turn_off(&self, entity_id: &EntityId) -> Result<CommandReport, AirHubError> {
        self.command(entity_id, &Command::TurnOff).await
    }

    /// Change the speed of one fan.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn set_speed(
        &self,
        entity_id: &EntityId,
        speed: &str,
    ) -> Result<CommandReport, AirHubError> {
        let command = Command::SetSpeed {
            speed: speed.to_string(),
        };
        self.command(entity_id, &command).await
    }

    /// Send one command to one fan.
    ///
    /// The new snapshot is published when the command succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AirHubError::NotFound`] for an unknown entity id and
    /// [`AirHubError::InvalidArgument`] for a rejected argument.
    #[tracing::instrument(skip(self, command), fields(command = %command))]
    pub async fn command(
        &self,
        entity_id: &EntityId,
        command: &Command,
    ) -> Result<CommandReport, AirHubError> {
        let device = self.find(entity_id)?;
        let outcome = device.execute(command).await?;
        let state = if outcome.is_success() {
            self.publish(&device).await
        } else {
            device.snapshot()
        };
        Ok(CommandReport { outcome, state })
    }

    /// Poll every managed fan concurrently and publish the results.
    #[tracing::instrument(skip(self))]
    pub async fn poll_all(&self) -> Vec<(EntityId, Outcome)> {
        let mut tasks = JoinSet::new();
        for device in self.devices.all() {
            let publisher = self.publisher.clone();
            tasks.spawn(async move {
                let outcome = device.poll().await;
                publish_snapshot(&publisher, &device).await;
                (device.entity_id().clone(), outcome)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(err) => tracing::error!(error = %err, "poll task aborted"),
            }
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }

    /// Run a named service against its target fans.
    ///
    /// `data` carries the service arguments and, optionally, an
    /// `entity_id` (string or list of strings) restricting the targets.
    /// Without it every managed fan is targeted. Unknown ids are ignored.
    /// Each target runs the command, then a fresh poll, then a publish;
    /// targets run concurrently and a failing target does not affect the
    /// others.
    ///
    /// # Errors
    ///
    /// Returns [`AirHubError::NotFound`] for an unknown service name and
    /// [`AirHubError::InvalidArgument`] for arguments that are missing,
    /// mistyped or outside their domain. Nothing is dispatched then.
    #[tracing::instrument(skip(self, data))]
    pub async fn call_service(
        &self,
        service: &str,
        data: &Value,
    ) -> Result<BroadcastReport, AirHubError> {
        let command = Command::parse(service, data)?;
        command.validate()?;
        let targets = match target_ids(data)? {
            Some(ids) => self.devices.select(&ids),
            None => self.devices.all(),
        };
        tracing::debug!(%command, targets = targets.len(), "dispatching service");

        let mut tasks = JoinSet::new();
        for device in targets {
            let command = command.clone();
            let publisher = self.publisher.clone();
            tasks.spawn(async move {
                let outcome = device.execute(&command).await;
                if let Err(err) = &outcome {
                    tracing::warn!(entity_id = %device.entity_id(), error = %err, "argument rejected");
                }
                device.poll().await;
                let state = publish_snapshot(&publisher, &device).await;
                TargetReport {
                    entity_id: device.entity_id().clone(),
                    outcome,
                    state,
                }
            });
        }

        let mut reports = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(err) => tracing::error!(error = %err, "service task aborted"),
            }
        }
        reports.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        Ok(BroadcastReport {
            service: command.service_name(),
            targets: reports,
        })
    }

    fn find(&self, entity_id: &EntityId) -> Result<Arc<FanDevice<C::Device>>, NotFoundError> {
        self.devices.find(entity_id).ok_or_else(|| NotFoundError {
            entity: "Fan",
            id: entity_id.to_string(),
        })
    }

    async fn publish(&self, device: &FanDevice<C::Device>) -> FanState {
        publish_snapshot(&self.publisher, device).await
    }
}

async fn publish_snapshot<P, V>(publisher: &P, device: &FanDevice<V>) -> FanState
where
    P: StatePublisher,
    V: VendorDevice,
{
    let state = device.snapshot();
    if let Err(err) = publisher.publish(state.clone()).await {
        tracing::warn!(entity_id = %state.entity_id, error = %err, "failed to publish fan state");
    }
    state
}

/// Ask the device for its model, off the async executor.
async fn identify<V: VendorDevice>(vendor: V) -> Result<(String, V), AirHubError> {
    let (info, vendor) = tokio::task::spawn_blocking(move || (vendor.info(), vendor))
        .await
        .map_err(|err| DeviceFault::new(format!("identification aborted: {err}")))?;
    let info = info?;
    tracing::info!(
        model = %info.model,
        firmware = %info.firmware_version,
        hardware = %info.hardware_version,
        "device detected"
    );
    if info.model.is_empty() {
        return Err(UnsupportedModelError { model: info.model }.into());
    }
    Ok((info.model, vendor))
}

/// Entity ids named by the `entity_id` key, or `None` to target every fan.
///
/// An empty list targets every fan as well. Strings that are not valid
/// entity ids cannot match a device and are dropped.
fn target_ids(data: &Value) -> Result<Option<Vec<EntityId>>, InvalidArgumentError> {
    let parse = |raw: &str| raw.trim().parse::<EntityId>().ok();
    match data.get(ENTITY_ID_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => Ok(Some(raw.split(',').filter_map(parse).collect())),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or(InvalidArgumentError::NotAString {
                    name: ENTITY_ID_KEY,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|raws| Some(raws.into_iter().filter_map(parse).collect())),
        Some(_) => Err(InvalidArgumentError::NotAString {
            name: ENTITY_ID_KEY,
        }),
    }
}
