//! In-process backend with expiring keys
//!
//! Behaves like the Redis backend for a single process: lists per key,
//! expiry reset on append, expired keys read as absent. Used by tests and
//! for running without a Redis server.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{BackendError, ThreadBackend};

struct Entry {
    values: Vec<String>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Default)]
pub struct InMemoryBackend {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadBackend for InMemoryBackend {
    async fn append(&self, key: &str, value: String, ttl: Duration) -> Result<u64, BackendError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        // Keys nobody reads again would otherwise stay forever
        entries.retain(|_, entry| entry.is_live(now));

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            values: Vec::new(),
            expires_at: now,
        });
        entry.values.push(value);
        entry.expires_at = now + ttl;
        Ok(entry.values.len() as u64)
    }

    async fn range(&self, key: &str, limit: Option<usize>) -> Result<Vec<String>, BackendError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => {}
            Some(_) => {
                entries.remove(key);
                return Ok(Vec::new());
            }
            None => return Ok(Vec::new()),
        }
        let values = &entries[key].values;

        let start = match limit {
            Some(n) if n > 0 => values.len().saturating_sub(n),
            _ => 0,
        };
        Ok(values[start..].to_vec())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(60 * 60 * 24);

    #[tokio::test]
    async fn test_append_returns_position() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.append("k", "a".into(), DAY).await.unwrap(), 1);
        assert_eq!(backend.append("k", "b".into(), DAY).await.unwrap(), 2);
        assert_eq!(backend.append("other", "c".into(), DAY).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_range_with_limit() {
        let backend = InMemoryBackend::new();
        for v in ["a", "b", "c", "d"] {
            backend.append("k", v.into(), DAY).await.unwrap();
        }

        assert_eq!(backend.range("k", None).await.unwrap(), vec!["a", "b", "c", "d"]);
        assert_eq!(backend.range("k", Some(2)).await.unwrap(), vec!["c", "d"]);
        assert_eq!(backend.range("k", Some(10)).await.unwrap().len(), 4);
        assert_eq!(backend.range("k", Some(0)).await.unwrap().len(), 4);
        assert!(backend.range("missing", None).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_key_reads_empty() {
        let backend = InMemoryBackend::new();
        let ttl = Duration::from_millis(20);
        backend.append("k", "a".into(), ttl).await.unwrap();

        tokio::time::advance(Duration::from_millis(20)).await;

        assert!(backend.range("k", None).await.unwrap().is_empty());
        // A write after expiry starts a fresh list
        assert_eq!(backend.append("k", "b".into(), ttl).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_resets_expiry_and_read_does_not() {
        let backend = InMemoryBackend::new();
        let ttl = Duration::from_millis(300);
        backend.append("k", "a".into(), ttl).await.unwrap();

        tokio::time::advance(Duration::from_millis(200)).await;
        backend.append("k", "b".into(), ttl).await.unwrap();

        tokio::time::advance(Duration::from_millis(200)).await;
        // Past the first deadline, inside the second
        assert_eq!(backend.range("k", None).await.unwrap(), vec!["a", "b"]);

        tokio::time::advance(Duration::from_millis(99)).await;
        assert_eq!(backend.range("k", None).await.unwrap().len(), 2);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(backend.range("k", None).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_purges_expired_keys() {
        let backend = InMemoryBackend::new();
        let ttl = Duration::from_millis(10);
        for i in 0..1000 {
            backend.append(&format!("thread:{}", i), "a".into(), ttl).await.unwrap();
        }
        assert_eq!(backend.entries.lock().await.len(), 1000);

        tokio::time::advance(Duration::from_millis(50)).await;
        backend.append("fresh", "b".into(), ttl).await.unwrap();

        let entries = backend.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_keeps_live_keys() {
        let backend = InMemoryBackend::new();
        backend.append("short", "a".into(), Duration::from_millis(10)).await.unwrap();
        backend.append("long", "a".into(), DAY).await.unwrap();

        tokio::time::advance(Duration::from_millis(50)).await;
        backend.append("other", "b".into(), DAY).await.unwrap();

        assert_eq!(backend.entries.lock().await.len(), 2);
        assert_eq!(backend.range("long", None).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = InMemoryBackend::new();
        backend.append("k", "a".into(), DAY).await.unwrap();

        backend.delete("k").await.unwrap();
        backend.delete("k").await.unwrap();
        backend.delete("never-existed").await.unwrap();

        assert!(backend.range("k", None).await.unwrap().is_empty());
    }
}
