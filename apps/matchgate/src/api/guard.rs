//! # Request Guards
//!
//! The two checks that run before any capability work: the global rate limit
//! and the API key. Both reject with the API's JSON [`ErrorResponse`] body.
//!
//! | Check | Enabled by | Rejection |
//! |-------|------------|-----------|
//! | rate limit | `rate_limit > 0` | `429` + `Retry-After` |
//! | API key | `api_key` set | `401` + `WWW-Authenticate: Bearer` |
//!
//! `/health` skips the key check so load balancers can probe without it.

use super::{AppState, ErrorResponse};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
};
use std::sync::Arc;
use std::time::Duration;
use subtle::{Choice, ConstantTimeEq};

/// Process-wide limiter shared by every request.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build the limiter for a quota.
pub fn create_rate_limiter(quota: Quota) -> GlobalRateLimiter {
    Arc::new(RateLimiter::direct(quota))
}

// =============================================================================
// REJECTIONS
// =============================================================================

/// Why a request was turned away before reaching a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingKey,
    InvalidKey,
    RateLimited { retry_after: Duration },
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::MissingKey | Rejection::InvalidKey => {
                let mut response =
                    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("Unauthorized")))
                        .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            Rejection::RateLimited { retry_after } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse::new("Too Many Requests")),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(whole_seconds(retry_after)));
                response
            }
        }
    }
}

/// Round up to whole seconds, never below one.
fn whole_seconds(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

// =============================================================================
// RATE LIMIT
// =============================================================================

/// Reject once the global quota is exhausted. A no-op without a limiter.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Rejection> {
    let Some(limiter) = state.limiter.as_ref() else {
        return Ok(next.run(request).await);
    };

    if let Err(not_until) = limiter.check() {
        let retry_after = not_until.wait_time_from(limiter.clock().now());
        tracing::warn!(
            event = "rate_limited",
            path = request.uri().path(),
            retry_after_ms = retry_after.as_millis() as u64,
            "Rate limit exceeded"
        );
        return Err(Rejection::RateLimited { retry_after });
    }

    Ok(next.run(request).await)
}

// =============================================================================
// API KEY
// =============================================================================

/// Compare a presented key with the configured one in constant time.
///
/// Every byte of `expected` is visited whatever `provided` holds, so timing
/// depends only on the configured key's length.
pub fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let same_len = (provided.len() as u64).ct_eq(&(expected.len() as u64));
    let same_bytes = expected
        .as_bytes()
        .iter()
        .enumerate()
        .fold(Choice::from(1), |acc, (i, byte)| {
            acc & byte.ct_eq(provided.get(i).unwrap_or(&0))
        });
    (same_len & same_bytes).into()
}

/// Require the configured API key on everything but `/health`.
///
/// The key may be sent as `Bearer <key>` or bare.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Rejection> {
    let Some(expected) = state.config.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

    let verdict = match presented {
        Some(key) if keys_match(key, expected) => None,
        Some(_) => Some(Rejection::InvalidKey),
        None => Some(Rejection::MissingKey),
    };
    let Some(rejection) = verdict else {
        return Ok(next.run(request).await);
    };
    tracing::warn!(
        event = "auth_failure",
        reason = ?rejection,
        path = request.uri().path(),
        "Request rejected"
    );
    Err(rejection)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_exact() {
        assert!(keys_match("secret", "secret"));
        assert!(!keys_match("secreT", "secret"));
    }

    #[test]
    fn key_prefixes_do_not_match() {
        assert!(!keys_match("secret", "secret-longer"));
        assert!(!keys_match("secret-longer", "secret"));
        assert!(!keys_match("", "secret"));
    }

    #[test]
    fn trailing_nul_is_not_padding() {
        assert!(!keys_match("secret\0", "secret"));
    }

    #[test]
    fn retry_after_rounds_up() {
        assert_eq!(whole_seconds(Duration::ZERO), 1);
        assert_eq!(whole_seconds(Duration::from_millis(10)), 1);
        assert_eq!(whole_seconds(Duration::from_secs(2)), 2);
        assert_eq!(whole_seconds(Duration::from_millis(2001)), 3);
    }

    #[test]
    fn rejections_use_json_envelope() {
        let response = Rejection::InvalidKey.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static("Bearer"))
        );

        let response = Rejection::RateLimited {
            retry_after: Duration::from_millis(300),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from(1u64))
        );
    }
}
