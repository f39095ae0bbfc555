// ============================================================================
// Rate Limiting Integration Tests
// ============================================================================
//
// Drives the real router + middleware through tower's oneshot with the
// in-memory counter store, so no live Redis is needed.
//
// ============================================================================

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use vitrine_config::{RateLimitConfig, RatePolicyConfig};
use vitrine_server::content::MemoryArticleStore;
use vitrine_server::handlers::AppState;
use vitrine_server::ratelimit::{
    MemoryCounterStore, PolicySelector, RateLimitState, RateLimiter,
};
use vitrine_server::routes;

fn test_config() -> RateLimitConfig {
    RateLimitConfig {
        api_root: "/api/v1".to_string(),
        login: RatePolicyConfig {
            max_requests: 2,
            window_seconds: 60,
        },
        inquiry: RatePolicyConfig {
            max_requests: 3,
            window_seconds: 60,
        },
        public_api: RatePolicyConfig {
            max_requests: 10,
            window_seconds: 60,
        },
        store_timeout_ms: 200,
    }
}

fn test_app() -> (Router, Arc<MemoryArticleStore>) {
    let config = test_config();
    let limiter = RateLimiter::new(MemoryCounterStore::new(), Duration::from_millis(200));
    let rate_limit = Arc::new(RateLimitState {
        selector: PolicySelector::new(&config),
        limiter,
        key_prefix: "rate:".to_string(),
    });

    let articles = MemoryArticleStore::new();
    let state = AppState {
        articles: articles.clone(),
    };

    (routes::app(state, rate_limit), articles)
}

fn inquiry_request(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/public/inquiries")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({"name": "Ada", "contact": "ada@example.com", "message": "hi"}).to_string(),
        ))
        .unwrap()
}

fn header_int(response: &axum::response::Response, name: &str) -> i64 {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("missing header {}", name))
}

#[tokio::test]
async fn inquiry_quota_admits_three_then_rejects() {
    let (app, _) = test_app();

    let mut statuses = Vec::new();
    let mut remaining = Vec::new();
    for _ in 0..4 {
        let response = app.clone().oneshot(inquiry_request("203.0.113.5")).await.unwrap();
        statuses.push(response.status());
        remaining.push(header_int(&response, "x-ratelimit-remaining"));
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::ACCEPTED,
            StatusCode::ACCEPTED,
            StatusCode::ACCEPTED,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
    assert_eq!(remaining, vec![2, 1, 0, 0]);
}

#[tokio::test]
async fn rejection_carries_problem_body_and_retry_after() {
    let (app, _) = test_app();

    for _ in 0..3 {
        app.clone().oneshot(inquiry_request("203.0.113.5")).await.unwrap();
    }
    let response = app.oneshot(inquiry_request("203.0.113.5")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header_int(&response, "x-ratelimit-limit"), 3);
    assert_eq!(header_int(&response, "x-ratelimit-remaining"), 0);
    assert!(header_int(&response, "x-ratelimit-reset") > 0);
    assert!(header_int(&response, "retry-after") > 0);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], 429);
    assert_eq!(body["title"], "Too Many Requests");
    assert_eq!(body["instance"], "/api/v1/public/inquiries");
}

#[tokio::test]
async fn admitted_responses_carry_quota_headers() {
    let (app, _) = test_app();

    let response = app.oneshot(inquiry_request("198.51.100.1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(header_int(&response, "x-ratelimit-limit"), 3);
    assert_eq!(header_int(&response, "x-ratelimit-remaining"), 2);
    assert!(header_int(&response, "x-ratelimit-reset") > 0);
}

#[tokio::test]
async fn quotas_are_per_client_ip() {
    let (app, _) = test_app();

    for _ in 0..3 {
        app.clone().oneshot(inquiry_request("203.0.113.5")).await.unwrap();
    }
    let rejected = app.clone().oneshot(inquiry_request("203.0.113.5")).await.unwrap();
    assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app.oneshot(inquiry_request("203.0.113.99")).await.unwrap();
    assert_eq!(other.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn health_is_bypassed_and_never_counted() {
    let (app, _) = test_app();

    for _ in 0..25 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn login_policy_takes_precedence_over_public_default() {
    // Login quota is 2, the generic public quota 10: a third POST to the
    // login path must already be rejected, proving the stricter policy won.
    let (app, _) = test_app();

    let login = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(login("192.0.2.7")).await.unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(header_int(&response, "x-ratelimit-limit"), 2);
    }

    let response = app.oneshot(login("192.0.2.7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn admin_routes_are_not_limited() {
    let (app, articles) = test_app();
    let tenant = uuid::Uuid::new_v4();
    let article = articles.insert(tenant, "about", "About", "body").await;

    // Far beyond the public quota; none of these may be throttled
    for _ in 0..30 {
        let uri = format!("/api/v1/admin/tenants/{}/articles/{}", tenant, article.id);
        let response = app
            .clone()
            .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn clients_without_identity_share_the_unknown_bucket() {
    let (app, _) = test_app();

    let anonymous = || {
        Request::builder()
            .method("POST")
            .uri("/api/v1/public/inquiries")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"name": "A", "contact": "a@example.com"}).to_string(),
            ))
            .unwrap()
    };

    for _ in 0..3 {
        let response = app.clone().oneshot(anonymous()).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
    let response = app.oneshot(anonymous()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
