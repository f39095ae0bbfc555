// ============================================================================
// Rate Limiting
// ============================================================================
//
// Fixed-window request counting against a shared store, so the quota stays
// global across server instances. Split into:
// - counter: the atomic increment-and-check against the store
// - policy: route-class selection and key construction
// - middleware: HTTP enforcement (429 + X-RateLimit-* headers)
//
// ============================================================================

mod counter;
mod middleware;
mod policy;

pub use counter::{
    CounterStore, MemoryCounterStore, RateLimitDecision, RateLimiter, RedisCounterStore,
};
pub use middleware::{RateLimitState, rate_limiting};
pub use policy::{PolicyDecision, PolicySelector, RatePolicy, RouteClass};
