//! Progress Bus port: per-project pub/sub of pipeline progress.
//!
//! Producers never block on slow subscribers. A subscriber that falls behind
//! observes lagged-message loss rather than backpressuring the pipeline.

use async_trait::async_trait;

use crate::events::ProgressEvent;
use crate::value_objects::ProjectId;

/// A receive handle over one project's event stream.
#[async_trait]
pub trait ProgressSubscription: Send {
    /// Wait for the next event, or `None` once the project's pipeline has
    /// emitted its terminal `Completion` event and no further events will arrive.
    async fn recv(&mut self) -> Option<ProgressEvent>;
}

/// Per-project event multiplexer.
pub trait ProgressBus: Send + Sync {
    /// Publish an event for `project_id`. Must not block the caller on slow
    /// or absent subscribers.
    fn publish(&self, project_id: ProjectId, event: ProgressEvent);

    /// Subscribe to future events for `project_id`. Events published before
    /// this call are not replayed.
    fn subscribe(&self, project_id: ProjectId) -> Box<dyn ProgressSubscription>;
}
