//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod fans;
#[allow(clippy::missing_errors_doc)]
pub mod services;

use axum::Router;
use axum::routing::{get, post};
use serde::Serialize;

use airhub_app::ports::{DeviceConnector, StatePublisher};
use airhub_app::services::fan_device::Outcome;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<C, P>() -> Router<AppState<C, P>>
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    Router::new()
        // Fans
        .route("/fans", get(fans::list::<C, P>))
        .route("/fans/{entity_id}", get(fans::get::<C, P>))
        .route("/fans/{entity_id}/turn_on", post(fans::turn_on::<C, P>))
        .route("/fans/{entity_id}/turn_off", post(fans::turn_off::<C, P>))
        .route("/fans/{entity_id}/set_speed", post(fans::set_speed::<C, P>))
        // Named services
        .route("/services/{service}", post(services::call::<C, P>))
}

/// Wire form of an [`Outcome`].
#[derive(Debug, Serialize)]
pub struct OutcomeBody {
    /// `success`, `skipped`, `failed` or, for a broadcast target whose
    /// arguments were refused, `rejected`.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&Outcome> for OutcomeBody {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success => Self {
                outcome: "success",
                reason: None,
            },
            Outcome::Skipped => Self {
                outcome: "skipped",
                reason: None,
            },
            Outcome::Failed(fault) => Self {
                outcome: "failed",
                reason: Some(fault.reason.clone()),
            },
        }
    }
}
