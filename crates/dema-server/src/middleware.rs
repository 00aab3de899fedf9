use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id of the current request, available as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug)]
struct Window {
    opened: Instant,
    used: usize,
}

/// Shared fixed-window counter for the quote endpoint.
///
/// All clients draw from the same budget; the counter resets once `period`
/// has passed since the window opened.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    limit: usize,
    period: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(limit: usize, period: Duration) -> Self {
        let window = Window {
            opened: Instant::now(),
            used: 0,
        };
        Self {
            limit,
            period,
            window: Arc::new(Mutex::new(window)),
        }
    }

    #[must_use]
    pub fn per_minute(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Take one slot from the current window. `false` when none are left.
    async fn try_acquire(&self) -> bool {
        let mut window = self.window.lock().await;
        if window.opened.elapsed() >= self.period {
            *window = Window {
                opened: Instant::now(),
                used: 0,
            };
        }
        let available = window.used < self.limit;
        if available {
            window.used += 1;
        }
        available
    }
}

/// Reuse the caller's `x-request-id` or mint a UUID, expose it to handlers
/// and echo it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(given) if !given.is_empty() => given.to_string(),
        _ => Uuid::new_v4().to_string(),
    };
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub async fn enforce_rate_limit(
    State(limiter): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire().await {
        return next.run(req).await;
    }

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::warn!(path = %req.uri().path(), %request_id, "rate limit exceeded");
    ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn window_allows_exactly_the_limit() {
        let limiter = RateLimitState::new(2, Duration::from_secs(60));
        assert!(limiter.try_acquire().await);
        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);
    }

    #[tokio::test]
    async fn window_reopens_after_period() {
        let limiter = RateLimitState::new(1, Duration::from_millis(20));
        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.try_acquire().await);
    }

    #[tokio::test]
    async fn zero_limit_blocks_everything() {
        let limiter = RateLimitState::per_minute(0);
        assert!(!limiter.try_acquire().await);
    }
}
