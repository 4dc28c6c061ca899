//! State publisher port — where fan snapshots go after each change.

use std::future::Future;

use airhub_domain::error::AirHubError;
use airhub_domain::fan::FanState;

/// Publishes fan snapshots to interested subscribers.
pub trait StatePublisher {
    /// Publish a snapshot to all current subscribers.
    fn publish(&self, state: FanState) -> impl Future<Output = Result<(), AirHubError>> + Send;
}

impl<T: StatePublisher + Send + Sync> StatePublisher for std::sync::Arc<T> {
    fn publish(&self, state: FanState) -> impl Future<Output = Result<(), AirHubError>> + Send {
        (**self).publish(state)
    }
}
