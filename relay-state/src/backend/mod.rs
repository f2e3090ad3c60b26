use std::time::Duration;

use crate::error::RelayStateResult;

mod memory;
mod redis_backend;

pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;

/// Key-value service with per-key expiry that the relay state indices sit on.
///
/// Every method is a single-key operation and must be atomic on its own; there
/// is no multi-key transaction. A missing or expired key reads as `Ok(None)`.
pub trait StateBackend: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = RelayStateResult<Option<String>>> + Send;

    /// Overwrite `key` and (re)start its expiry window.
    fn set_ex(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = RelayStateResult<()>> + Send;

    fn del(&self, key: &str) -> impl Future<Output = RelayStateResult<()>> + Send;
}
