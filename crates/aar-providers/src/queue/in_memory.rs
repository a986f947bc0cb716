//! In-memory [`DurableQueue`], backed by a per-topic `VecDeque` behind a `Mutex`.
//!
//! Suitable for tests and single-process local runs. Visibility timeout is
//! enforced by a background sweep on every call rather than a real timer
//! wheel, which is adequate at this queue's scale.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use aar_domain::error::Result;
use aar_domain::ports::{DequeuedMessage, DurableQueue, MessageId, PopReceipt};

const LEASE_DURATION: Duration = Duration::from_secs(5 * 60);

struct Entry {
    payload: Vec<u8>,
    message_id: MessageId,
    dequeue_count: u32,
    inserted_at: DateTime<Utc>,
    visible_at: DateTime<Utc>,
    current_receipt: Option<PopReceipt>,
}

/// In-memory durable queue, one `VecDeque<Entry>` per topic.
#[derive(Default)]
pub struct InMemoryQueue {
    topics: DashMap<String, Mutex<VecDeque<Entry>>>,
}

impl InMemoryQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn topic_lock(&self, topic: &str) -> dashmap::mapref::one::Ref<'_, String, Mutex<VecDeque<Entry>>> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| Mutex::new(VecDeque::new()));
        self.topics.get(topic).expect("just inserted")
    }
}

#[async_trait]
impl DurableQueue for InMemoryQueue {
    async fn enqueue(
        &self,
        topic: &str,
        payload: &[u8],
        visibility_delay: Option<Duration>,
    ) -> Result<MessageId> {
        let now = Utc::now();
        let visible_at = visibility_delay
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map_or(now, |d| now + d);
        let message_id = MessageId::new();
        let lock = self.topic_lock(topic);
        let mut queue = lock.lock().expect("queue mutex poisoned");
        queue.push_back(Entry {
            payload: payload.to_vec(),
            message_id,
            dequeue_count: 0,
            inserted_at: now,
            visible_at,
            current_receipt: None,
        });
        Ok(message_id)
    }

    async fn dequeue(&self, topic: &str) -> Result<Option<DequeuedMessage>> {
        let now = Utc::now();
        let lock = self.topic_lock(topic);
        let mut queue = lock.lock().expect("queue mutex poisoned");
        let candidate = queue.iter_mut().find(|e| e.visible_at <= now);
        let Some(entry) = candidate else {
            return Ok(None);
        };
        entry.dequeue_count += 1;
        entry.visible_at = now + chrono::Duration::from_std(LEASE_DURATION).expect("fits");
        let receipt = PopReceipt(Uuid::new_v4().to_string());
        entry.current_receipt = Some(receipt.clone());
        Ok(Some(DequeuedMessage {
            payload: entry.payload.clone(),
            message_id: entry.message_id,
            pop_receipt: receipt,
            dequeue_count: entry.dequeue_count,
            inserted_at: entry.inserted_at,
        }))
    }

    async fn peek(&self, topic: &str) -> Result<Option<DequeuedMessage>> {
        let now = Utc::now();
        let lock = self.topic_lock(topic);
        let queue = lock.lock().expect("queue mutex poisoned");
        Ok(queue
            .iter()
            .find(|e| e.visible_at <= now)
            .map(|entry| DequeuedMessage {
                payload: entry.payload.clone(),
                message_id: entry.message_id,
                pop_receipt: entry
                    .current_receipt
                    .clone()
                    .unwrap_or_else(|| PopReceipt(String::new())),
                dequeue_count: entry.dequeue_count,
                inserted_at: entry.inserted_at,
            }))
    }

    async fn delete(&self, topic: &str, message_id: MessageId, pop_receipt: &PopReceipt) -> Result<()> {
        let lock = self.topic_lock(topic);
        let mut queue = lock.lock().expect("queue mutex poisoned");
        let position = queue.iter().position(|e| {
            e.message_id == message_id && e.current_receipt.as_ref() == Some(pop_receipt)
        });
        match position {
            Some(idx) => {
                queue.remove(idx);
                Ok(())
            }
            None => Err(aar_domain::Error::conflict(
                "delete with stale or unknown pop receipt",
            )),
        }
    }

    async fn length(&self, topic: &str) -> Result<u64> {
        let lock = self.topic_lock(topic);
        let queue = lock.lock().expect("queue mutex poisoned");
        Ok(queue.len() as u64)
    }

    async fn clear(&self, topic: &str) -> Result<()> {
        let lock = self.topic_lock(topic);
        let mut queue = lock.lock().expect("queue mutex poisoned");
        queue.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dequeue_count_increments_on_redelivery() {
        let queue = InMemoryQueue::new();
        queue.enqueue("analysis", b"payload", None).await.unwrap();

        let first = queue.dequeue("analysis").await.unwrap().unwrap();
        assert_eq!(first.dequeue_count, 1);
        // message is leased; another dequeue should see nothing visible.
        assert!(queue.dequeue("analysis").await.unwrap().is_none());

        queue
            .delete("analysis", first.message_id, &first.pop_receipt)
            .await
            .unwrap();
        assert_eq!(queue.length("analysis").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_with_stale_receipt_fails() {
        let queue = InMemoryQueue::new();
        let id = queue.enqueue("analysis", b"payload", None).await.unwrap();
        let _ = queue.dequeue("analysis").await.unwrap();
        let stale = PopReceipt("not-the-real-one".to_string());
        assert!(queue.delete("analysis", id, &stale).await.is_err());
    }
}
