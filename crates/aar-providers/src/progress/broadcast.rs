//! Per-project progress multiplexer, generalizing the teacher's
//! single-channel `BroadcastEventBus` to one `tokio::sync::broadcast` channel
//! per project, created lazily on first publish or subscribe.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

use aar_domain::events::ProgressEvent;
use aar_domain::ports::{ProgressBus, ProgressSubscription};
use aar_domain::value_objects::ProjectId;

const CHANNEL_CAPACITY: usize = 256;

/// In-process, per-project broadcast-backed [`ProgressBus`].
#[derive(Default)]
pub struct BroadcastProgressBus {
    channels: DashMap<ProjectId, broadcast::Sender<ProgressEvent>>,
}

impl BroadcastProgressBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sender_for(&self, project_id: ProjectId) -> broadcast::Sender<ProgressEvent> {
        self.channels
            .entry(project_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl ProgressBus for BroadcastProgressBus {
    fn publish(&self, project_id: ProjectId, event: ProgressEvent) {
        let sender = self.sender_for(project_id);
        // No subscribers is not an error; producers never block on delivery.
        let _ = sender.send(event);
    }

    fn subscribe(&self, project_id: ProjectId) -> Box<dyn ProgressSubscription> {
        let receiver = self.sender_for(project_id).subscribe();
        Box::new(BroadcastSubscription { receiver })
    }
}

struct BroadcastSubscription {
    receiver: broadcast::Receiver<ProgressEvent>,
}

#[async_trait]
impl ProgressSubscription for BroadcastSubscription {
    async fn recv(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "progress bus subscriber lagged, dropping events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aar_domain::entities::Phase;

    #[tokio::test]
    async fn delivers_events_to_current_subscribers_only() {
        let bus = BroadcastProgressBus::new();
        let project = ProjectId::new();
        let mut sub = bus.subscribe(project);

        bus.publish(
            project,
            ProgressEvent::Progress {
                phase: Phase::Indexing,
                progress_percent: 10,
                files_processed: 1,
                total_files: 10,
            },
        );

        let event = sub.recv().await.unwrap();
        assert!(matches!(event, ProgressEvent::Progress { .. }));
    }

    #[tokio::test]
    async fn publishing_with_no_subscribers_does_not_error() {
        let bus = BroadcastProgressBus::new();
        bus.publish(
            ProjectId::new(),
            ProgressEvent::Completion {
                success: true,
                duration_seconds: 1.0,
                statistics: None,
            },
        );
    }
}
