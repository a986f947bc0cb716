//! Structurally-complete stand-in for a managed cloud queue (e.g. SQS/Storage
//! Queues). Implements the exact [`DurableQueue`] wire contract — including
//! base64-over-JSON envelopes — without a live network dependency, so
//! integration tests can exercise the "cloud" code path deterministically.
//!
//! A production deployment swaps this for a real client; nothing above the
//! port boundary needs to change.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use aar_domain::error::{Error, Result};
use aar_domain::ports::{DequeuedMessage, DurableQueue, MessageId, PopReceipt};

use crate::queue::in_memory::InMemoryQueue;

#[derive(Serialize, Deserialize)]
struct Envelope {
    payload_b64: String,
}

/// Wraps [`InMemoryQueue`] with the base64-envelope wire format a real cloud
/// queue client would require.
pub struct CloudQueueStub {
    inner: InMemoryQueue,
}

impl CloudQueueStub {
    /// Create an empty stub queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: InMemoryQueue::new(),
        }
    }
}

impl Default for CloudQueueStub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableQueue for CloudQueueStub {
    async fn enqueue(
        &self,
        topic: &str,
        payload: &[u8],
        visibility_delay: Option<Duration>,
    ) -> Result<MessageId> {
        let envelope = Envelope {
            payload_b64: base64::engine::general_purpose::STANDARD.encode(payload),
        };
        let wire = serde_json::to_vec(&envelope)?;
        self.inner.enqueue(topic, &wire, visibility_delay).await
    }

    async fn dequeue(&self, topic: &str) -> Result<Option<DequeuedMessage>> {
        let Some(mut msg) = self.inner.dequeue(topic).await? else {
            return Ok(None);
        };
        msg.payload = decode_envelope(&msg.payload)?;
        Ok(Some(msg))
    }

    async fn peek(&self, topic: &str) -> Result<Option<DequeuedMessage>> {
        let Some(mut msg) = self.inner.peek(topic).await? else {
            return Ok(None);
        };
        msg.payload = decode_envelope(&msg.payload)?;
        Ok(Some(msg))
    }

    async fn delete(&self, topic: &str, message_id: MessageId, pop_receipt: &PopReceipt) -> Result<()> {
        self.inner.delete(topic, message_id, pop_receipt).await
    }

    async fn length(&self, topic: &str) -> Result<u64> {
        self.inner.length(topic).await
    }

    async fn clear(&self, topic: &str) -> Result<()> {
        self.inner.clear(topic).await
    }
}

fn decode_envelope(wire: &[u8]) -> Result<Vec<u8>> {
    let envelope: Envelope = serde_json::from_slice(wire)?;
    base64::engine::general_purpose::STANDARD
        .decode(envelope.payload_b64)
        .map_err(|e| Error::fatal_with_source("decoding queue envelope", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrips_payload_through_base64_envelope() {
        let queue = CloudQueueStub::new();
        queue.enqueue("analysis", b"hello", None).await.unwrap();
        let msg = queue.dequeue("analysis").await.unwrap().unwrap();
        assert_eq!(msg.payload, b"hello");
    }
}
