// ============================================================================
// Configuration Constants
// ============================================================================

// Default port value
pub(crate) const DEFAULT_PORT: u16 = 8080;

// Default rate-limit quotas (requests per window)
pub(crate) const DEFAULT_LOGIN_MAX_REQUESTS: u32 = 5;
pub(crate) const DEFAULT_LOGIN_MAX_REQUESTS_RELAXED: u32 = 100;
pub(crate) const DEFAULT_INQUIRY_MAX_REQUESTS: u32 = 3;
pub(crate) const DEFAULT_PUBLIC_MAX_REQUESTS: u32 = 60;

// Default rate-limit windows (in seconds)
pub(crate) const DEFAULT_LOGIN_WINDOW_SECS: i64 = 60;
pub(crate) const DEFAULT_INQUIRY_WINDOW_SECS: i64 = 60;
pub(crate) const DEFAULT_PUBLIC_WINDOW_SECS: i64 = 60;

// Deadline for a single round trip to the rate-limit store; past it the
// limiter fails open (in milliseconds)
pub(crate) const DEFAULT_STORE_TIMEOUT_MS: u64 = 200;

// Default database pool settings
pub(crate) const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub(crate) const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;
pub(crate) const DEFAULT_DB_IDLE_TIMEOUT_SECS: u64 = 300;

// Time conversion constants
pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3600;
pub const SECONDS_PER_DAY: i64 = 86400;
