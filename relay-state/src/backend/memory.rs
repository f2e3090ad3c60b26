use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::StateBackend;
use crate::clock::Clock;
use crate::error::RelayStateResult;

struct MemoryEntry {
    value: String,
    expires_at_ms: i64,
}

/// In-process backend for tests and local runs.
///
/// Expiry is evaluated against the injected [`Clock`], so a
/// [`ManualClock`](crate::clock::ManualClock) can step entries past their TTL.
/// Expired entries are dropped when read and swept on every write.
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, MemoryEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Remaining time to live of `key`, `None` if absent or expired.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now_ms = self.now_ms();
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at_ms > now_ms)
            .map(|entry| Duration::from_millis((entry.expires_at_ms - now_ms) as u64))
    }

    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now_ms = self.now_ms();
        let entries = self.entries.lock().await;
        entries
            .values()
            .filter(|entry| entry.expires_at_ms > now_ms)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Write a raw value without going through an index, e.g. to plant a
    /// corrupt entry.
    pub async fn insert_raw(&self, key: &str, value: &str, ttl: Duration) {
        let expires_at_ms = self.expiry_from_now(ttl);
        self.entries.lock().await.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
    }

    fn expiry_from_now(&self, ttl: Duration) -> i64 {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.now_ms().saturating_add(ttl_ms)
    }
}

impl StateBackend for MemoryBackend {
    async fn get(&self, key: &str) -> RelayStateResult<Option<String>> {
        let now_ms = self.now_ms();
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if entry.expires_at_ms > now_ms => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> RelayStateResult<()> {
        let now_ms = self.now_ms();
        self.entries
            .lock()
            .await
            .retain(|_, entry| entry.expires_at_ms > now_ms);
        self.insert_raw(key, value, ttl).await;
        Ok(())
    }

    async fn del(&self, key: &str) -> RelayStateResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[tokio::test]
    async fn test_entries_expire_with_clock() {
        let clock = Arc::new(ManualClock::from_unix_seconds(1_000));
        let backend = MemoryBackend::new(clock.clone());

        backend
            .set_ex("k", "v", Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(backend.ttl("k").await, Some(Duration::from_secs(10)));

        clock.advance(Duration::from_secs(9));
        assert_eq!(backend.get("k").await.unwrap(), Some("v".to_string()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(backend.get("k").await.unwrap(), None);
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_overwrite_restarts_expiry() {
        let clock = Arc::new(ManualClock::from_unix_seconds(1_000));
        let backend = MemoryBackend::new(clock.clone());

        backend.set_ex("k", "a", Duration::from_secs(10)).await.unwrap();
        clock.advance(Duration::from_secs(8));
        backend.set_ex("k", "b", Duration::from_secs(10)).await.unwrap();
        clock.advance(Duration::from_secs(8));

        assert_eq!(backend.get("k").await.unwrap(), Some("b".to_string()));
        assert_eq!(backend.ttl("k").await, Some(Duration::from_secs(2)));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_write_sweeps_expired_entries_never_read_again() {
        let clock = Arc::new(ManualClock::from_unix_seconds(1_000));
        let backend = MemoryBackend::new(clock.clone());

        for i in 0..5 {
            backend
                .set_ex(&format!("old-{i}"), "v", Duration::from_secs(10))
                .await
                .unwrap();
        }
        clock.advance(Duration::from_secs(10));
        backend.set_ex("fresh", "v", Duration::from_secs(10)).await.unwrap();

        assert_eq!(backend.entries.lock().await.len(), 1);
        assert_eq!(backend.get("fresh").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_del_missing_key_is_ok() {
        let backend = MemoryBackend::new(Arc::new(ManualClock::from_unix_seconds(0)));
        backend.del("missing").await.unwrap();
        assert_eq!(backend.get("missing").await.unwrap(), None);
    }
}
