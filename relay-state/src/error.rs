#[derive(thiserror::Error, Debug)]
pub enum RelayStateError {
    #[error("Relay state init error for {url}: {source}")]
    Init {
        url: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid value {value:?} stored under {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

pub type RelayStateResult<T> = Result<T, RelayStateError>;
