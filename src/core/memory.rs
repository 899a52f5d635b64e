//! Conversation memory
//!
//! One append-only list per thread under `thread:{thread_id}`, each entry a
//! JSON-encoded [`Message`]. Every save pushes the thread's expiry back to
//! the configured TTL; reads leave it alone.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::conversation::{Message, Thread};
use crate::store::{BackendError, InMemoryBackend, ThreadBackend};

/// Threads expire this long after their last write unless configured otherwise
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Failed to encode or decode message: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Memory store for conversation persistence
pub struct MemoryStore {
    backend: Arc<dyn ThreadBackend>,
    message_ttl: Duration,
}

impl MemoryStore {
    pub fn new(backend: Arc<dyn ThreadBackend>, message_ttl: Duration) -> Self {
        Self {
            backend,
            message_ttl,
        }
    }

    /// Create a store backed by process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()), DEFAULT_MESSAGE_TTL)
    }

    fn thread_key(thread_id: &str) -> String {
        format!("thread:{}", thread_id)
    }

    /// Append a message to its thread and return its sequence number
    /// (1 for the first message of a thread).
    pub async fn save_message(&self, message: &Message) -> Result<u64, MemoryError> {
        let key = Self::thread_key(&message.thread_id);
        let encoded = serde_json::to_string(message)?;

        let seq = self.backend.append(&key, encoded, self.message_ttl).await?;
        tracing::debug!(thread_id = %message.thread_id, seq, "saved message");
        Ok(seq)
    }

    /// Get the messages of a thread in conversation order.
    ///
    /// With `limit`, only the most recent `limit` messages are returned.
    pub async fn get_thread_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, MemoryError> {
        let key = Self::thread_key(thread_id);
        let raw = self.backend.range(&key, limit).await?;

        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(MemoryError::from))
            .collect()
    }

    /// Materialize a thread, or `None` if it has no messages
    pub async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>, MemoryError> {
        let messages = self.get_thread_messages(thread_id, None).await?;
        Ok(Thread::from_messages(thread_id, messages))
    }

    /// Delete a thread and all its messages
    pub async fn delete_thread(&self, thread_id: &str) -> Result<(), MemoryError> {
        let key = Self::thread_key(thread_id);
        self.backend.delete(&key).await?;
        tracing::debug!(thread_id, "deleted thread");
        Ok(())
    }
}
