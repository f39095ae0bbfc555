// ============================================================================
// Rate Limit Configuration
// ============================================================================

use crate::constants::*;
use crate::{Environment, env_parse};

/// Quota for a single route class: at most `max_requests` per
/// `window_seconds`, counted in fixed windows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatePolicyConfig {
    pub max_requests: u32,
    pub window_seconds: i64,
}

/// Rate-limit quotas and store settings
///
/// The login quota is environment-dependent: production uses the strict
/// brute-force limit, other environments the relaxed one so local test
/// suites are not throttled.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Path prefix under which the default public quota applies
    pub api_root: String,
    pub login: RatePolicyConfig,
    pub inquiry: RatePolicyConfig,
    pub public_api: RatePolicyConfig,
    /// Deadline for one round trip to the shared counter store; past it
    /// the limiter fails open
    pub store_timeout_ms: u64,
}

impl RateLimitConfig {
    pub(crate) fn from_env(environment: Environment) -> Self {
        let login_default = if environment.is_production() {
            DEFAULT_LOGIN_MAX_REQUESTS
        } else {
            DEFAULT_LOGIN_MAX_REQUESTS_RELAXED
        };

        Self {
            api_root: std::env::var("RATE_LIMIT_API_ROOT")
                .unwrap_or_else(|_| "/api/v1".to_string()),
            login: RatePolicyConfig {
                max_requests: env_parse("RATE_LIMIT_LOGIN_MAX", login_default),
                window_seconds: env_parse("RATE_LIMIT_LOGIN_WINDOW_SECS", DEFAULT_LOGIN_WINDOW_SECS),
            },
            inquiry: RatePolicyConfig {
                max_requests: env_parse("RATE_LIMIT_INQUIRY_MAX", DEFAULT_INQUIRY_MAX_REQUESTS),
                window_seconds: env_parse(
                    "RATE_LIMIT_INQUIRY_WINDOW_SECS",
                    DEFAULT_INQUIRY_WINDOW_SECS,
                ),
            },
            public_api: RatePolicyConfig {
                max_requests: env_parse("RATE_LIMIT_PUBLIC_MAX", DEFAULT_PUBLIC_MAX_REQUESTS),
                window_seconds: env_parse(
                    "RATE_LIMIT_PUBLIC_WINDOW_SECS",
                    DEFAULT_PUBLIC_WINDOW_SECS,
                ),
            },
            store_timeout_ms: env_parse("RATE_LIMIT_STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}
