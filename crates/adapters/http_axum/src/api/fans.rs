//! JSON handlers for individual fans.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use airhub_app::ports::{DeviceConnector, StatePublisher};
use airhub_app::services::fan_service::CommandReport;
use airhub_domain::fan::FanState;
use airhub_domain::id::EntityId;

use crate::api::OutcomeBody;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for turning a fan on.
#[derive(Debug, Default, Deserialize)]
pub struct TurnOnRequest {
    pub speed: Option<String>,
}

/// Request body for changing the speed of a fan.
#[derive(Debug, Deserialize)]
pub struct SetSpeedRequest {
    pub speed: String,
}

/// Response body of a per-fan command.
#[derive(Debug, Serialize)]
pub struct CommandBody {
    #[serde(flatten)]
    pub outcome: OutcomeBody,
    pub state: FanState,
}

impl From<CommandReport> for CommandBody {
    fn from(report: CommandReport) -> Self {
        Self {
            outcome: OutcomeBody::from(&report.outcome),
            state: report.state,
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<FanState>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<FanState>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the command endpoints.
///
/// A command the device refused or skipped still answers `200`; the body
/// tells which.
pub enum CommandResponse {
    Ok(Json<CommandBody>),
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

impl From<CommandReport> for CommandResponse {
    fn from(report: CommandReport) -> Self {
        Self::Ok(Json(report.into()))
    }
}

fn parse_entity_id(raw: &str) -> Result<EntityId, ApiError> {
    Ok(raw.parse::<EntityId>()?)
}

/// `GET /api/fans`
pub async fn list<C, P>(State(state): State<AppState<C, P>>) -> ListResponse
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    ListResponse::Ok(Json(state.fan_service.list_fans()))
}

/// `GET /api/fans/{entity_id}`
pub async fn get<C, P>(
    State(state): State<AppState<C, P>>,
    Path(entity_id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    let entity_id = parse_entity_id(&entity_id)?;
    let fan = state.fan_service.get_fan(&entity_id)?;
    Ok(GetResponse::Ok(Json(fan)))
}

/// `POST /api/fans/{entity_id}/turn_on`
///
/// The body is optional; without one the fan resumes its last mode.
pub async fn turn_on<C, P>(
    State(state): State<AppState<C, P>>,
    Path(entity_id): Path<String>,
    body: Option<Json<TurnOnRequest>>,
) -> Result<CommandResponse, ApiError>
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    let entity_id = parse_entity_id(&entity_id)?;
    let Json(req) = body.unwrap_or_default();
    let report = state
        .fan_service
        .turn_on(&entity_id, req.speed.as_deref())
        .await?;
    Ok(report.into())
}

/// `POST /api/fans/{entity_id}/turn_off`
pub async fn turn_off<C, P>(
    State(state): State<AppState<C, P>>,
    Path(entity_id): Path<String>,
) -> Result<CommandResponse, ApiError>
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    let entity_id = parse_entity_id(&entity_id)?;
    let report = state.fan_service.turn_off(&entity_id).await?;
    Ok(report.into())
}

/// `POST /api/fans/{entity_id}/set_speed`
pub async fn set_speed<C, P>(
    State(state): State<AppState<C, P>>,
    Path(entity_id): Path<String>,
    Json(req): Json<SetSpeedRequest>,
) -> Result<CommandResponse, ApiError>
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    let entity_id = parse_entity_id(&entity_id)?;
    let report = state.fan_service.set_speed(&entity_id, &req.speed).await?;
    Ok(report.into())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::router::build;
    use crate::testing::{body_json, test_state, test_state_with_offline_bedroom};

    fn post(uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method("POST").uri(uri);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn should_list_fans_ordered_by_entity_id() {
        let app = build(test_state().await);

        let response = app.oneshot(get("/api/fans")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let ids: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|fan| fan["entity_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["fan.bedroom", "fan.living_room"]);
    }

    #[tokio::test]
    async fn should_get_fan_with_variant_and_speed_list() {
        let app = build(test_state().await);

        let response = app.oneshot(get("/api/fans/fan.living_room")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["variant"], "purifier_3");
        assert_eq!(body["state"], "on");
        assert_eq!(body["speed_list"], json!(["Auto", "Silent", "Favorite", "Fan"]));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_fan() {
        let app = build(test_state().await);

        let response = app.oneshot(get("/api/fans/fan.garage")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("fan.garage"));
    }

    #[tokio::test]
    async fn should_reject_malformed_entity_id() {
        let app = build(test_state().await);

        let response = app.oneshot(get("/api/fans/light.kitchen")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_turn_off_fan() {
        let app = build(test_state().await);

        let response = app
            .oneshot(post("/api/fans/fan.living_room/turn_off", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["outcome"], "success");
        assert_eq!(body["state"]["state"], "off");
        assert!(body.get("reason").is_none());
    }

    #[tokio::test]
    async fn should_turn_on_fan_at_requested_speed() {
        let app = build(test_state().await);

        let response = app
            .oneshot(post(
                "/api/fans/fan.living_room/turn_on",
                Some(json!({ "speed": "silent" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["outcome"], "success");
        assert_eq!(body["state"]["state"], "on");
        assert_eq!(body["state"]["speed"], "Silent");
    }

    #[tokio::test]
    async fn should_turn_on_fan_without_body() {
        let app = build(test_state().await);

        let response = app
            .oneshot(post("/api/fans/fan.bedroom/turn_on", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["outcome"], "success");
    }

    #[tokio::test]
    async fn should_reject_speed_outside_variant_vocabulary() {
        let app = build(test_state().await);

        let response = app
            .oneshot(post(
                "/api/fans/fan.bedroom/set_speed",
                Some(json!({ "speed": "Turbo" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Turbo"));
    }

    #[tokio::test]
    async fn should_report_failed_command_on_unreachable_fan() {
        let app = build(test_state_with_offline_bedroom().await);

        let response = app
            .oneshot(post("/api/fans/fan.bedroom/turn_off", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["outcome"], "failed");
        assert_eq!(body["reason"], "no response");
        assert_eq!(body["state"]["state"], "unavailable");
    }
}
