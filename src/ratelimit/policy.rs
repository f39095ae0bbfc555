// ============================================================================
// Rate Limit Policy Selection
// ============================================================================

use axum::http::Method;
use vitrine_config::{RateLimitConfig, RatePolicyConfig};

/// Quota applied to one route class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub max_requests: u32,
    pub window_seconds: i64,
}

impl From<RatePolicyConfig> for RatePolicy {
    fn from(cfg: RatePolicyConfig) -> Self {
        Self {
            max_requests: cfg.max_requests,
            window_seconds: cfg.window_seconds,
        }
    }
}

/// Coarse route class; becomes part of the counter key so each class has
/// its own per-client quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Login,
    Inquiry,
    Public,
}

impl RouteClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteClass::Login => "login",
            RouteClass::Inquiry => "inquiry",
            RouteClass::Public => "public",
        }
    }
}

/// What the selector decided for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Health/liveness traffic: not limited, not even counted
    Bypass,
    /// No quota applies (e.g. authenticated admin surface)
    Unlimited,
    /// Count against the class quota
    Limited {
        class: RouteClass,
        policy: RatePolicy,
    },
}

/// Maps `(method, path)` to a quota, first match wins:
///
/// 1. Health paths are bypassed entirely.
/// 2. POST on the login path gets the brute-force policy (strict in
///    production, relaxed elsewhere, via config).
/// 3. POST on the public lead-submission path gets the spam policy.
/// 4. Paths with a `public` segment get the general public quota.
/// 5. Paths with an `admin` segment are unlimited; they sit behind
///    authentication, which is the gate there.
/// 6. Anything else under the API root gets the public quota; anything
///    outside it is unlimited.
#[derive(Debug, Clone)]
pub struct PolicySelector {
    api_root: String,
    login_path: String,
    inquiry_path: String,
    login: RatePolicy,
    inquiry: RatePolicy,
    public_api: RatePolicy,
}

impl PolicySelector {
    pub fn new(config: &RateLimitConfig) -> Self {
        let api_root = config.api_root.trim_end_matches('/').to_string();
        Self {
            login_path: format!("{}/auth/login", api_root),
            inquiry_path: format!("{}/public/inquiries", api_root),
            api_root,
            login: config.login.into(),
            inquiry: config.inquiry.into(),
            public_api: config.public_api.into(),
        }
    }

    /// Resolve the applicable quota for a request
    pub fn select(&self, method: &Method, path: &str) -> PolicyDecision {
        if path == "/health" || path.starts_with("/health/") {
            return PolicyDecision::Bypass;
        }

        if method == Method::POST && path == self.login_path {
            return PolicyDecision::Limited {
                class: RouteClass::Login,
                policy: self.login,
            };
        }

        if method == Method::POST && path == self.inquiry_path {
            return PolicyDecision::Limited {
                class: RouteClass::Inquiry,
                policy: self.inquiry,
            };
        }

        if has_segment(path, "public") {
            return PolicyDecision::Limited {
                class: RouteClass::Public,
                policy: self.public_api,
            };
        }

        if has_segment(path, "admin") {
            return PolicyDecision::Unlimited;
        }

        if path == self.api_root || path.starts_with(&format!("{}/", self.api_root)) {
            return PolicyDecision::Limited {
                class: RouteClass::Public,
                policy: self.public_api,
            };
        }

        PolicyDecision::Unlimited
    }
}

/// Counter key: `{prefix}{class}:{client_ip}`
pub fn counter_key(prefix: &str, class: RouteClass, client_ip: &str) -> String {
    format!("{}{}:{}", prefix, class.as_str(), client_ip)
}

fn has_segment(path: &str, segment: &str) -> bool {
    path.split('/').any(|s| s == segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> PolicySelector {
        PolicySelector {
            api_root: "/api/v1".to_string(),
            login_path: "/api/v1/auth/login".to_string(),
            inquiry_path: "/api/v1/public/inquiries".to_string(),
            login: RatePolicy {
                max_requests: 5,
                window_seconds: 60,
            },
            inquiry: RatePolicy {
                max_requests: 3,
                window_seconds: 60,
            },
            public_api: RatePolicy {
                max_requests: 60,
                window_seconds: 60,
            },
        }
    }

    #[test]
    fn health_paths_are_bypassed() {
        let s = selector();
        assert_eq!(s.select(&Method::GET, "/health"), PolicyDecision::Bypass);
        assert_eq!(
            s.select(&Method::GET, "/health/ready"),
            PolicyDecision::Bypass
        );
    }

    #[test]
    fn login_policy_wins_over_the_generic_api_default() {
        let s = selector();
        match s.select(&Method::POST, "/api/v1/auth/login") {
            PolicyDecision::Limited { class, policy } => {
                assert_eq!(class, RouteClass::Login);
                assert_eq!(policy.max_requests, 5);
            }
            other => panic!("expected login policy, got {:?}", other),
        }
    }

    #[test]
    fn login_get_is_not_the_login_class() {
        let s = selector();
        match s.select(&Method::GET, "/api/v1/auth/login") {
            PolicyDecision::Limited { class, .. } => assert_eq!(class, RouteClass::Public),
            other => panic!("expected public policy, got {:?}", other),
        }
    }

    #[test]
    fn inquiry_policy_wins_over_the_public_segment_rule() {
        let s = selector();
        match s.select(&Method::POST, "/api/v1/public/inquiries") {
            PolicyDecision::Limited { class, policy } => {
                assert_eq!(class, RouteClass::Inquiry);
                assert_eq!(policy.max_requests, 3);
            }
            other => panic!("expected inquiry policy, got {:?}", other),
        }
    }

    #[test]
    fn public_segment_gets_the_public_quota() {
        let s = selector();
        match s.select(&Method::GET, "/api/v1/public/articles") {
            PolicyDecision::Limited { class, .. } => assert_eq!(class, RouteClass::Public),
            other => panic!("expected public policy, got {:?}", other),
        }
    }

    #[test]
    fn admin_segment_is_unlimited() {
        let s = selector();
        assert_eq!(
            s.select(&Method::POST, "/api/v1/admin/articles"),
            PolicyDecision::Unlimited
        );
    }

    #[test]
    fn api_root_defaults_to_public_and_outside_is_unlimited() {
        let s = selector();
        assert!(matches!(
            s.select(&Method::GET, "/api/v1/sitemap"),
            PolicyDecision::Limited {
                class: RouteClass::Public,
                ..
            }
        ));
        assert_eq!(
            s.select(&Method::GET, "/favicon.ico"),
            PolicyDecision::Unlimited
        );
    }

    #[test]
    fn key_combines_prefix_class_and_ip() {
        assert_eq!(
            counter_key("rate:", RouteClass::Inquiry, "203.0.113.5"),
            "rate:inquiry:203.0.113.5"
        );
    }
}
