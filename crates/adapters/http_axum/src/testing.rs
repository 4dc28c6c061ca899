//! In-memory port implementations shared by the handler tests.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};

use airhub_app::ports::{
    DeviceConnector, DeviceInfo, Endpoint, RawStatus, VendorCall, VendorDevice,
};
use airhub_app::services::fan_service::{DeviceSettings, FanService};
use airhub_app::state_bus::StateBus;
use airhub_domain::error::DeviceFault;
use airhub_domain::model::{MODEL_AIRHUMIDIFIER_CA4, MODEL_AIRPURIFIER_3};

use crate::state::AppState;

pub const TOKEN: &str = "00112233445566778899aabbccddeeff";

/// Vendor device that acknowledges everything, or nothing when offline.
pub struct StubVendor {
    model: String,
    offline: bool,
}

impl VendorDevice for StubVendor {
    fn info(&self) -> Result<DeviceInfo, DeviceFault> {
        Ok(DeviceInfo {
            model: self.model.clone(),
            firmware_version: "2.1.4".to_string(),
            hardware_version: "esp32".to_string(),
        })
    }

    fn status(&self) -> Result<RawStatus, DeviceFault> {
        if self.offline {
            return Err(DeviceFault::new("no response"));
        }
        Ok(RawStatus::new(true))
    }

    fn send(&self, _call: VendorCall) -> Result<Value, DeviceFault> {
        if self.offline {
            return Err(DeviceFault::new("no response"));
        }
        Ok(json!(["ok"]))
    }
}

/// Connector whose devices at `offline` hosts never answer.
#[derive(Default)]
pub struct StubConnector {
    offline: HashSet<String>,
}

impl DeviceConnector for StubConnector {
    type Device = StubVendor;

    async fn connect(
        &self,
        endpoint: &Endpoint,
        model: Option<&str>,
    ) -> Result<StubVendor, DeviceFault> {
        Ok(StubVendor {
            model: model.unwrap_or(MODEL_AIRPURIFIER_3).to_string(),
            offline: self.offline.contains(&endpoint.host),
        })
    }
}

pub type TestState = AppState<StubConnector, Arc<StateBus>>;

fn settings(name: &str, host: &str, model: &str) -> DeviceSettings {
    DeviceSettings {
        name: name.to_string(),
        endpoint: Endpoint {
            host: host.to_string(),
            token: TOKEN.to_string(),
        },
        model: Some(model.to_string()),
    }
}

async fn build_state(connector: StubConnector) -> TestState {
    let service = FanService::new(connector, Arc::new(StateBus::new(16)));
    service
        .setup_device(settings("Living Room", "10.0.0.1", MODEL_AIRPURIFIER_3))
        .await
        .unwrap();
    service
        .setup_device(settings("Bedroom", "10.0.0.2", MODEL_AIRHUMIDIFIER_CA4))
        .await
        .unwrap();
    AppState::new(service)
}

/// `fan.living_room` (purifier 3) and `fan.bedroom` (humidifier CA4).
pub async fn test_state() -> TestState {
    build_state(StubConnector::default()).await
}

/// Same fans as [`test_state`], with the bedroom humidifier unreachable.
pub async fn test_state_with_offline_bedroom() -> TestState {
    let connector = StubConnector {
        offline: HashSet::from(["10.0.0.2".to_string()]),
    };
    build_state(connector).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
