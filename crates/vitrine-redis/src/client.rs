//! Redis client implementation with connection management

use crate::Result;
use redis::{AsyncCommands, aio::ConnectionManager};

/// Redis client with automatic reconnection
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
}

impl RedisClient {
    /// Connect to Redis server
    ///
    /// Supports both redis:// and rediss:// (TLS) URLs
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// DEL - Delete a key
    pub async fn del(&mut self, key: &str) -> Result<i64> {
        self.conn.del(key).await
    }

    /// Atomically increment a fixed-window counter and return
    /// `(count, ttl_seconds)`.
    ///
    /// Uses a Lua script to combine INCR + EXPIRE in a single atomic
    /// operation: the expiry is set only on the first increment of a window,
    /// so concurrent first requests cannot race the expiry-set. The TTL is
    /// read in the same script to save a round trip.
    pub async fn incr_with_window(&mut self, key: &str, window_seconds: i64) -> Result<(i64, i64)> {
        let script = redis::Script::new(
            r"
            local count = redis.call('INCR', KEYS[1])
            if count == 1 then
                redis.call('EXPIRE', KEYS[1], ARGV[1])
            end
            local ttl = redis.call('TTL', KEYS[1])
            return {count, ttl}
            ",
        );

        let (count, ttl): (i64, i64) = script
            .key(key)
            .arg(window_seconds)
            .invoke_async(&mut self.conn)
            .await?;

        Ok((count, ttl))
    }
}
