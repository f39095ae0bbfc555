// ============================================================================
// Vitrine Config - Centralized configuration management
// ============================================================================
//
// This crate provides centralized configuration for the vitrine server.
// Supports loading from environment variables with sensible defaults.
//
// ============================================================================

mod constants;
mod database;
mod ratelimit;
mod redis;

pub use constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
pub use database::DbConfig;
pub use ratelimit::{RateLimitConfig, RatePolicyConfig};
pub use redis::RedisKeyPrefixes;

use anyhow::Result;
use constants::*;

/// Deployment environment, selected via `APP_ENV`
///
/// Controls the strictness of the login rate-limit policy: production gets
/// the strict brute-force quota, everything else gets the relaxed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub(crate) fn from_env() -> Self {
        match std::env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Main configuration structure for the vitrine server
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub bind_address: String,
    pub environment: Environment,
    pub rust_log: String,

    // Sub-configurations
    pub db: DbConfig,
    pub rate_limit: RateLimitConfig,
    pub redis_key_prefixes: RedisKeyPrefixes,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_env();
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            port,
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "[::]".to_string()),
            environment,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            db: DbConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(environment),
            redis_key_prefixes: RedisKeyPrefixes::from_env(),
        })
    }
}

/// Parse an environment variable as an integer, falling back to a default
pub(crate) fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
