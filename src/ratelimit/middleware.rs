// ============================================================================
// Rate Limiting Middleware
// ============================================================================

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use vitrine_error::AppError;

use crate::ratelimit::counter::{RateLimitDecision, RateLimiter};
use crate::ratelimit::policy::{self, PolicyDecision, PolicySelector};
use crate::utils::extract_client_ip;

/// Dependencies for the rate-limiting layer
pub struct RateLimitState {
    pub selector: PolicySelector,
    pub limiter: RateLimiter,
    /// Store key prefix, e.g. "rate:"
    pub key_prefix: String,
}

/// Rate limiting middleware
///
/// Health traffic passes through uncounted; unlimited routes pass through
/// untouched. Limited routes are counted against `{prefix}{class}:{ip}`:
/// admitted responses carry the X-RateLimit-* headers with post-increment
/// values, rejected requests get a 429 problem response with Retry-After.
pub async fn rate_limiting(
    State(state): State<Arc<RateLimitState>>,
    request: Request,
    next: Next,
) -> Response {
    let (class, rate_policy) = match state.selector.select(request.method(), request.uri().path())
    {
        PolicyDecision::Bypass | PolicyDecision::Unlimited => return next.run(request).await,
        PolicyDecision::Limited { class, policy } => (class, policy),
    };

    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip());
    let client_ip = extract_client_ip(request.headers(), peer_ip);
    let key = policy::counter_key(&state.key_prefix, class, &client_ip);

    let decision = state
        .limiter
        .increment_and_check(&key, rate_policy.max_requests, rate_policy.window_seconds)
        .await;

    if !decision.allowed {
        tracing::warn!(
            key = %key,
            class = class.as_str(),
            limit = decision.limit,
            "rate limit exceeded"
        );
        return reject(&decision, request.uri().path());
    }

    let mut response = next.run(request).await;
    attach_quota_headers(&mut response, &decision);
    response
}

/// 429 problem response with quota headers and Retry-After
fn reject(decision: &RateLimitDecision, path: &str) -> Response {
    let error = AppError::RateLimitExceeded {
        limit: decision.limit,
        reset_seconds: decision.reset_seconds,
    };
    error.log();

    let body = error.problem_body(Some(path));
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    attach_quota_headers(&mut response, decision);
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, int_header(decision.reset_seconds));
    response
}

fn attach_quota_headers(response: &mut Response, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", int_header(decision.limit as i64));
    headers.insert("x-ratelimit-remaining", int_header(decision.remaining as i64));
    headers.insert("x-ratelimit-reset", int_header(decision.reset_seconds));
}

fn int_header(value: i64) -> HeaderValue {
    HeaderValue::from_str(&value.to_string()).unwrap_or(HeaderValue::from_static("0"))
}
