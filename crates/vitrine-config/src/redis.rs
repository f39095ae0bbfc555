// ============================================================================
// Redis Configuration
// ============================================================================

/// Redis key prefixes configuration
#[derive(Clone, Debug)]
pub struct RedisKeyPrefixes {
    /// Prefix for rate limiting keys: "rate:{class}:{ip}"
    pub rate: String,
}

impl RedisKeyPrefixes {
    pub(crate) fn from_env() -> Self {
        Self {
            rate: std::env::var("REDIS_KEY_PREFIX_RATE").unwrap_or_else(|_| "rate:".to_string()),
        }
    }
}
