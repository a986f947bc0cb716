//! Durable Queue port: FIFO-ish delivery with visibility timeout and explicit deletion.
//!
//! At-least-once delivery. Consumers MUST be idempotent per `(project,
//! phase)` — the same message may be redelivered after its lease expires.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Opaque token returned by `dequeue`, required by `delete`. Redeeming the
/// wrong receipt (e.g. after the lease already expired and someone else
/// dequeued the message) must fail rather than silently delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopReceipt(pub String);

/// Stable identifier for one enqueued message (distinct from its receipt,
/// which changes on every redelivery).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub uuid::Uuid);

impl MessageId {
    /// Generate a new message ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// A message received from `dequeue`.
#[derive(Debug, Clone)]
pub struct DequeuedMessage {
    /// Base64-decoded, UTF-8 JSON payload bytes.
    pub payload: Vec<u8>,
    /// Stable message identifier.
    pub message_id: MessageId,
    /// Receipt required to `delete` this specific delivery.
    pub pop_receipt: PopReceipt,
    /// Number of times this message has been dequeued (the retry counter).
    pub dequeue_count: u32,
    /// When the message was originally enqueued.
    pub inserted_at: DateTime<Utc>,
}

/// FIFO-ish durable message queue with visibility-timeout semantics.
#[async_trait]
pub trait DurableQueue: Send + Sync {
    /// Enqueue `payload` (will be base64-encoded over a text envelope) onto `topic`.
    ///
    /// `visibility_delay` postpones the message's initial visibility, if given.
    async fn enqueue(
        &self,
        topic: &str,
        payload: &[u8],
        visibility_delay: Option<std::time::Duration>,
    ) -> Result<MessageId>;

    /// Receive a single message from `topic`, making it invisible for the
    /// queue's configured lease duration. Returns `None` if the topic is
    /// currently empty of visible messages.
    async fn dequeue(&self, topic: &str) -> Result<Option<DequeuedMessage>>;

    /// Observe the head of `topic` without leasing it.
    async fn peek(&self, topic: &str) -> Result<Option<DequeuedMessage>>;

    /// Delete a message using the receipt returned by the `dequeue` that
    /// produced it. Deleting with a stale receipt (message already
    /// redelivered) must fail rather than silently succeed.
    async fn delete(&self, topic: &str, message_id: MessageId, pop_receipt: &PopReceipt) -> Result<()>;

    /// Number of messages currently enqueued on `topic` (visible or leased).
    async fn length(&self, topic: &str) -> Result<u64>;

    /// Remove all messages from `topic`.
    async fn clear(&self, topic: &str) -> Result<()>;
}
