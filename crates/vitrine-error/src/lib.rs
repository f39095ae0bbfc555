// ============================================================================
// Vitrine Error - Shared error taxonomy
// ============================================================================
//
// Application error type shared across the vitrine server. Every error maps
// to an RFC 7807-style problem response at the HTTP boundary; the mapping
// lives here so handlers and middleware produce identical bodies.
//
// ============================================================================

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Quota exhausted for the current window; correctable by waiting
    /// `reset_seconds`
    #[error("rate limit of {limit} requests exceeded, retry in {reset_seconds}s")]
    RateLimitExceeded { limit: u32, reset_seconds: i64 },

    /// Stale write rejected by the optimistic concurrency guard;
    /// correctable by re-fetching and retrying the edit
    #[error("{entity_type} was modified concurrently (current version {current_version}, provided {provided_version})")]
    VersionConflict {
        entity_type: String,
        current_version: i32,
        provided_version: i32,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::VersionConflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::Redis(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            AppError::VersionConflict { .. } => "VERSION_CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Redis(_) => "REDIS_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Short human-readable title for the problem body
    pub fn title(&self) -> &'static str {
        match self {
            AppError::RateLimitExceeded { .. } => "Too Many Requests",
            AppError::VersionConflict { .. } => "Version Conflict",
            AppError::NotFound(_) => "Not Found",
            AppError::Validation(_) => "Validation Error",
            AppError::Database(_)
            | AppError::Redis(_)
            | AppError::Config(_)
            | AppError::Internal(_) => "Internal Server Error",
        }
    }

    /// Get a user-friendly detail message (without sensitive internals)
    pub fn user_message(&self) -> String {
        match self {
            AppError::RateLimitExceeded {
                limit,
                reset_seconds,
            } => format!(
                "Rate limit of {} requests exceeded; retry in {} seconds",
                limit, reset_seconds
            ),
            AppError::VersionConflict { entity_type, .. } => format!(
                "The {} was modified by someone else; re-fetch it and retry your edit",
                entity_type
            ),
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::Validation(msg) => format!("Validation error: {}", msg),
            AppError::Database(_) => "Database error".to_string(),
            AppError::Redis(_) => "Cache error".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// RFC 7807-style problem body; `instance` is the request path when the
    /// caller knows it
    pub fn problem_body(&self, instance: Option<&str>) -> serde_json::Value {
        let mut body = json!({
            "type": format!("/problems/{}", self.error_code().to_lowercase().replace('_', "-")),
            "title": self.title(),
            "status": self.status_code().as_u16(),
            "detail": self.user_message(),
        });

        if let Some(instance) = instance {
            body["instance"] = json!(instance);
        }

        // Conflict responses carry both version numbers so the client can
        // decide whether to overwrite or merge
        if let AppError::VersionConflict {
            current_version,
            provided_version,
            ..
        } = self
        {
            body["current_version"] = json!(current_version);
            body["provided_version"] = json!(provided_version);
        }

        body
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "Client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let body = self.problem_body(None);
        let mut response = (status, Json(body)).into_response();

        // Rejected requests still advertise the quota they hit
        if let AppError::RateLimitExceeded {
            limit,
            reset_seconds,
        } = self
        {
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", header_value(limit as i64));
            headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
            headers.insert("x-ratelimit-reset", header_value(reset_seconds));
            headers.insert(header::RETRY_AFTER, header_value(reset_seconds));
        }

        response
    }
}

/// Integer header value; infallible for the numeric ranges used here
fn header_value(value: i64) -> HeaderValue {
    HeaderValue::from_str(&value.to_string()).unwrap_or(HeaderValue::from_static("0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_maps_to_429() {
        let err = AppError::RateLimitExceeded {
            limit: 3,
            reset_seconds: 42,
        };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.error_code(), "RATE_LIMIT_EXCEEDED");
    }

    #[test]
    fn version_conflict_body_carries_both_versions() {
        let err = AppError::VersionConflict {
            entity_type: "article".to_string(),
            current_version: 2,
            provided_version: 1,
        };
        let body = err.problem_body(Some("/api/v1/admin/articles/abc"));
        assert_eq!(body["status"], 409);
        assert_eq!(body["current_version"], 2);
        assert_eq!(body["provided_version"], 1);
        assert_eq!(body["instance"], "/api/v1/admin/articles/abc");
    }

    #[test]
    fn problem_body_omits_instance_when_unknown() {
        let err = AppError::NotFound("article".to_string());
        let body = err.problem_body(None);
        assert_eq!(body["status"], 404);
        assert!(body.get("instance").is_none());
    }
}
