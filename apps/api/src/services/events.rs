use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::team::TeamEvent;

/// Destination for team and membership events
///
/// Follow-up work such as removing channel memberships after a user leaves a
/// team is done by whoever consumes these events.
#[async_trait]
pub trait TeamEventSink: Send + Sync {
    async fn publish(&self, event: TeamEvent);
}

/// Writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

#[async_trait]
impl TeamEventSink for TracingEventSink {
    async fn publish(&self, event: TeamEvent) {
        tracing::info!(
            event = event.name(),
            team_id = %event.team_id(),
            user_id = ?event.user_id(),
            "Team event"
        );
    }
}

/// Fans events out to any number of in-process subscribers
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<TeamEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TeamEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl TeamEventSink for BroadcastEventSink {
    async fn publish(&self, event: TeamEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Team event dropped, no subscribers");
        }
    }
}
