//! Redis-backed thread storage
//!
//! Each key is a Redis list. Appends run as `MULTI { RPUSH; PEXPIRE }` so
//! two writers on the same thread never overwrite each other.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::{BackendError, ThreadBackend};

/// Shared handle over one multiplexed connection. Cloning the connection
/// per call is cheap and lets requests pipeline over the same socket.
pub struct RedisBackend {
    connection: MultiplexedConnection,
}

impl RedisBackend {
    /// Connect using a URL of the form `redis://[user:pass@]host[:port][/db]`.
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl ThreadBackend for RedisBackend {
    async fn append(&self, key: &str, value: String, ttl: Duration) -> Result<u64, BackendError> {
        let mut conn = self.connection.clone();
        let (len,): (u64,) = redis::pipe()
            .atomic()
            .rpush(key, value)
            .pexpire(key, ttl_millis(ttl))
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(len)
    }

    async fn range(&self, key: &str, limit: Option<usize>) -> Result<Vec<String>, BackendError> {
        let mut conn = self.connection.clone();
        let values: Vec<String> = conn.lrange(key, range_start(limit), -1).await?;
        Ok(values)
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut conn = self.connection.clone();
        let _removed: u64 = conn.del(key).await?;
        Ok(())
    }
}

/// `LRANGE` start index: negative counts back from the tail.
/// A zero limit reads the whole list.
fn range_start(limit: Option<usize>) -> isize {
    match limit {
        Some(n) if n > 0 => -(isize::try_from(n).unwrap_or(isize::MAX)),
        _ => 0,
    }
}

fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_start() {
        assert_eq!(range_start(None), 0);
        assert_eq!(range_start(Some(0)), 0);
        assert_eq!(range_start(Some(3)), -3);
    }

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[tokio::test]
    #[ignore = "needs a Redis server at REDIS_URL"]
    async fn test_append_against_live_redis() {
        let backend = RedisBackend::connect(&redis_url()).await.unwrap();
        let key = format!("thread:redis-backend-test-{}", std::process::id());
        backend.delete(&key).await.unwrap();

        let ttl = Duration::from_secs(60);
        assert_eq!(backend.append(&key, "a".into(), ttl).await.unwrap(), 1);
        assert_eq!(backend.append(&key, "b".into(), ttl).await.unwrap(), 2);

        assert_eq!(backend.range(&key, None).await.unwrap(), vec!["a", "b"]);
        assert_eq!(backend.range(&key, Some(1)).await.unwrap(), vec!["b"]);

        let mut conn = backend.connection.clone();
        let remaining: i64 = conn.pttl(&key).await.unwrap();
        assert!(remaining > 0 && remaining <= 60_000);

        backend.delete(&key).await.unwrap();
        assert!(backend.range(&key, None).await.unwrap().is_empty());
    }

    #[test]
    fn test_ttl_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(60 * 60 * 24)), 86_400_000);
        assert_eq!(ttl_millis(Duration::MAX), i64::MAX);
    }
}
