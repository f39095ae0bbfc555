// ============================================================================
// Vitrine Server - Admission core for the vitrine CMS backend
// ============================================================================
//
// Two concerns live here, in front of the content API:
// - Rate limiting: fixed-window counters in a shared store, selected per
//   route class, enforced by gateway middleware.
// - Optimistic concurrency: every externally mutable entity carries a
//   version; stale writes are rejected with a 409 instead of silently
//   overwriting concurrent edits.
//
// ============================================================================

pub mod content;
pub mod db;
pub mod handlers;
pub mod ratelimit;
pub mod routes;
pub mod utils;
pub mod versioning;

pub use vitrine_error::{AppError, AppResult};
