//! Redis connection pool management.

use redis::aio::ConnectionManager;
use thiserror::Error;

/// Redis error types.
#[derive(Error, Debug)]
pub enum RedisError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for Redis operations.
pub type RedisResult<T> = Result<T, RedisError>;

/// Redis connection pool. ConnectionManager multiplexes internally and
/// reconnects on its own; callers clone it to get a mutable handle.
pub type RedisPool = ConnectionManager;

/// Initialize a Redis connection pool from a URL.
///
/// Example URL: `redis://127.0.0.1:6379`
///
/// The connection is established eagerly, so an unreachable server fails
/// here rather than on the first query.
pub async fn init_pool(redis_url: &str) -> RedisResult<RedisPool> {
    let client = redis::Client::open(redis_url)?;
    let mut manager = ConnectionManager::new(client).await?;
    let pong: String = redis::cmd("PING").query_async(&mut manager).await?;
    if pong != "PONG" {
        return Err(RedisError::OperationFailed(format!(
            "unexpected PING reply: {}",
            pong
        )));
    }
    tracing::debug!(url = %redis_url, "Redis connection established");
    Ok(manager)
}

/// Escape glob metacharacters so a value can be embedded in a SCAN pattern.
pub(crate) fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_glob_plain() {
        assert_eq!(escape_glob("A123"), "A123");
    }

    #[test]
    fn test_escape_glob_metacharacters() {
        assert_eq!(escape_glob("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
    }
}
