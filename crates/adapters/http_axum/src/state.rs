//! Shared application state for axum handlers.

use std::sync::Arc;

use airhub_app::ports::{DeviceConnector, StatePublisher};
use airhub_app::services::fan_service::FanService;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the connector and publisher types do
/// not need to be `Clone`; only the `Arc` is cloned.
pub struct AppState<C: DeviceConnector, P> {
    /// Fan use-cases.
    pub fan_service: Arc<FanService<C, P>>,
}

impl<C: DeviceConnector, P> Clone for AppState<C, P> {
    fn clone(&self) -> Self {
        Self {
            fan_service: Arc::clone(&self.fan_service),
        }
    }
}

impl<C, P> AppState<C, P>
where
    C: DeviceConnector + 'static,
    P: StatePublisher + Clone + Send + Sync + 'static,
{
    /// Create a new application state owning the service.
    pub fn new(fan_service: FanService<C, P>) -> Self {
        Self::from_arc(Arc::new(fan_service))
    }

    /// Create a new application state from a service already shared with
    /// background tasks (such as the poll loop).
    pub fn from_arc(fan_service: Arc<FanService<C, P>>) -> Self {
        Self { fan_service }
    }
}
