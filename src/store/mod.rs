//! Key-value backends for conversation memory
//!
//! A backend stores one append-only list of strings per key, with an expiry
//! that every append pushes back. Reads never touch the expiry.

mod in_memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use self::in_memory::InMemoryBackend;
pub use self::redis::RedisBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

#[async_trait]
pub trait ThreadBackend: Send + Sync {
    /// Append `value` to the list at `key` and reset its expiry to `ttl`.
    ///
    /// Returns the 1-based position of the appended value.
    async fn append(&self, key: &str, value: String, ttl: Duration) -> Result<u64, BackendError>;

    /// Read the list at `key` in insertion order, or only its last `limit`
    /// entries. A missing or expired key reads as an empty list.
    async fn range(&self, key: &str, limit: Option<usize>) -> Result<Vec<String>, BackendError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;
}
