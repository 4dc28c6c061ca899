//! In-process state bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use airhub_domain::error::AirHubError;
use airhub_domain::fan::FanState;

use crate::ports::StatePublisher;

/// Fans snapshots out to every subscriber through a [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the snapshot is simply dropped).
pub struct StateBus {
    sender: broadcast::Sender<FanState>,
}

impl StateBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to snapshots published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FanState> {
        self.sender.subscribe()
    }
}

impl StatePublisher for StateBus {
    fn publish(&self, state: FanState) -> impl Future<Output = Result<(), AirHubError>> + Send {
        // send only fails when nobody listens
        let _ = self.sender.send(state);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airhub_domain::entity::{AttributeMap, EntityState};
    use airhub_domain::id::EntityId;
    use airhub_domain::variant::Variant;

    fn snapshot(name: &str, state: EntityState) -> FanState {
        FanState {
            entity_id: EntityId::from_name(name).unwrap(),
            name: name.to_string(),
            model: "zhimi.airfresh.va2".to_string(),
            variant: Variant::AirFresh,
            state,
            speed: None,
            speed_list: Vec::new(),
            capabilities: Vec::new(),
            attributes: AttributeMap::new(),
            last_updated: airhub_domain::time::now(),
        }
    }

    #[tokio::test]
    async fn should_deliver_snapshot_to_every_subscriber() {
        let bus = StateBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(snapshot("Hall", EntityState::On)).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().name, "Hall");
        assert_eq!(rx2.recv().await.unwrap().state, EntityState::On);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = StateBus::new(16);
        let result = bus.publish(snapshot("Hall", EntityState::Off)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_snapshots_published_before_subscription() {
        let bus = StateBus::new(16);
        bus.publish(snapshot("Early", EntityState::Off)).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(snapshot("Late", EntityState::On)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().name, "Late");
    }
}
