//! JSON handler for named services fanned out to many fans.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

use airhub_app::ports::{DeviceConnector, StatePublisher};
use airhub_app::services::fan_service::{BroadcastReport, TargetReport};
use airhub_domain::fan::FanState;
use airhub_domain::id::EntityId;

use crate::api::OutcomeBody;
use crate::error::ApiError;
use crate::state::AppState;

/// One target of a broadcast.
#[derive(Debug, Serialize)]
pub struct TargetBody {
    pub entity_id: EntityId,
    #[serde(flatten)]
    pub outcome: OutcomeBody,
    pub state: FanState,
}

impl From<TargetReport> for TargetBody {
    fn from(report: TargetReport) -> Self {
        let outcome = match &report.outcome {
            Ok(outcome) => OutcomeBody::from(outcome),
            Err(err) => OutcomeBody {
                outcome: "rejected",
                reason: Some(err.to_string()),
            },
        };
        Self {
            entity_id: report.entity_id,
            outcome,
            state: report.state,
        }
    }
}

/// Response body of a broadcast.
#[derive(Debug, Serialize)]
pub struct BroadcastBody {
    pub service: &'static str,
    pub targets: Vec<TargetBody>,
}

/// Possible responses from the service endpoint.
pub enum CallResponse {
    Ok(Json<BroadcastBody>),
}

impl IntoResponse for CallResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

impl From<BroadcastReport> for CallResponse {
    fn from(report: BroadcastReport) -> Self {
        Self::Ok(Json(BroadcastBody {
            service: report.service,
            targets: report.targets.into_iter().map(TargetBody::from).collect(),
        }))
    }
}

/// `POST /api/services/{service}`
///
/// The optional body carries the service arguments and an optional
/// `entity_id` (string or list) restricting the targets.
pub async fn call<C, P>(
    State(state): State<AppState<C, P>>,
    Path(service): Path<String>,
    body: Option<Json<Value>>,
) -> Result<CallResponse, ApiError>
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    let data = body.map_or_else(|| Value::Object(Map::new()), |Json(data)| data);
    let report = state.fan_service.call_service(&service, &data).await?;
    tracing::debug!(service = %service, targets = report.targets.len(), "service handled");
    Ok(report.into())
}
