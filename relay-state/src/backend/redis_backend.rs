use std::time::Duration;

use redis::{AsyncCommands, aio::ConnectionManager};

use super::StateBackend;
use crate::error::RelayStateResult;

/// Redis over a multiplexed [`ConnectionManager`]. Clones share the connection.
#[derive(Clone)]
pub struct RedisBackend {
    redis: ConnectionManager,
}

impl RedisBackend {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.redis
    }
}

impl StateBackend for RedisBackend {
    async fn get(&self, key: &str) -> RelayStateResult<Option<String>> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> RelayStateResult<()> {
        let mut conn = self.redis.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> RelayStateResult<()> {
        let mut conn = self.redis.clone();
        let _: u32 = conn.del(key).await?;
        Ok(())
    }
}
