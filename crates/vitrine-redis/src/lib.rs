//! # Vitrine Redis
//!
//! Shared Redis client for the vitrine server: connection management plus
//! the atomic counter primitive the rate limiter is built on.

mod client;

pub use client::RedisClient;

/// Result type for Redis operations
pub type Result<T> = std::result::Result<T, redis::RedisError>;
