use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use serde::Deserialize;

use crate::{
    backend::{RedisBackend, StateBackend},
    clock::Clock,
    error::{RelayStateError, RelayStateResult},
    keys::{DEFAULT_KEY_PREFIX, RelayStateKeys},
};

#[derive(Debug, Clone, Deserialize)]
pub struct RelayStateConfig {
    pub url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

/// TTL-indexed lookup tables that give the gateway memory across requests.
///
/// One instance per process, built at startup and shared by reference (or
/// `Arc`) with every request handler. The indices are independent: nothing
/// here spans more than one key atomically.
pub struct RelayStateStore<B = RedisBackend> {
    backend: B,
    keys: RelayStateKeys,
    clock: Arc<dyn Clock>,
}

impl RelayStateStore<RedisBackend> {
    /// Connect to Redis and probe it once, so a bad address or rejected
    /// credentials fail startup instead of the first request.
    pub async fn connect(config: &RelayStateConfig, clock: Arc<dyn Clock>) -> RelayStateResult<Self> {
        let url = redacted_url(&config.url);
        let init_error = |source: redis::RedisError| RelayStateError::Init {
            url: url.clone(),
            source,
        };

        let client = redis::Client::open(config.url.as_str()).map_err(init_error)?;
        let redis = client.get_connection_manager().await.map_err(init_error)?;

        let keys = RelayStateKeys::new(config.key_prefix.as_str());

        // nil is fine, only transport and auth failures matter here
        let _: Option<String> = redis
            .clone()
            .get(keys.liveness_probe_key_name())
            .await
            .map_err(init_error)?;

        tracing::info!(url = %url, prefix = keys.prefix(), "Relay state store connected");

        Ok(Self::with_backend(RedisBackend::new(redis), keys, clock))
    }
}

impl<B: StateBackend> RelayStateStore<B> {
    pub fn with_backend(backend: B, keys: RelayStateKeys, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            keys,
            clock,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn keys(&self) -> &RelayStateKeys {
        &self.keys
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) async fn read(&self, key: &str) -> RelayStateResult<Option<String>> {
        let value = self.backend.get(key).await.inspect_err(|e| {
            tracing::error!(key, error = %e, "Relay state read failed");
        })?;
        tracing::debug!(key, found = value.is_some(), "Relay state read");
        Ok(value)
    }

    /// Read and parse a stored value. A value that does not parse is an
    /// error, never "not found".
    pub(crate) async fn read_parsed<T>(&self, key: &str) -> RelayStateResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(raw) = self.read(key).await? else {
            return Ok(None);
        };

        raw.parse::<T>()
            .map(Some)
            .map_err(|e| RelayStateError::InvalidValue {
                key: key.to_string(),
                value: raw,
                reason: e.to_string(),
            })
    }

    pub(crate) async fn write(&self, key: &str, value: &str, ttl: Duration) -> RelayStateResult<()> {
        self.backend.set_ex(key, value, ttl).await.inspect_err(|e| {
            tracing::error!(key, error = %e, "Relay state write failed");
        })?;
        tracing::debug!(key, value, ttl_secs = ttl.as_secs(), "Relay state written");
        Ok(())
    }

    pub(crate) async fn delete(&self, key: &str) -> RelayStateResult<()> {
        self.backend.del(key).await.inspect_err(|e| {
            tracing::error!(key, error = %e, "Relay state delete failed");
        })?;
        tracing::debug!(key, "Relay state deleted");
        Ok(())
    }
}

fn redacted_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable redis url>".to_string(),
    }
}
