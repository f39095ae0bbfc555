// ============================================================================
// Router Assembly
// ============================================================================

use axum::routing::{get, post};
use axum::{Router, middleware};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};
use crate::ratelimit::{RateLimitState, rate_limiting};

/// Build the application router with the rate-limiting layer applied.
///
/// The layer wraps the whole router, so the limiter sees every request,
/// matched route or not; health endpoints are exempted inside the policy
/// selector rather than by route wiring.
pub fn app(state: AppState, rate_limit: Arc<RateLimitState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        .route("/api/v1/public/inquiries", post(handlers::submit_inquiry))
        .route(
            "/api/v1/admin/tenants/{tenant_id}/articles/{id}",
            get(handlers::get_article).put(handlers::update_article),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(rate_limit, rate_limiting))
                .into_inner(),
        )
        .with_state(state)
}
