//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use airhub_app::ports::{DeviceConnector, StatePublisher};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the JSON API under `/api` next to a `/health` probe, with a
/// [`TraceLayer`] logging each request/response through `tracing`.
pub fn build<C, P>(state: AppState<C, P>) -> Router
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
