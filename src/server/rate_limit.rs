use crate::AppState;
use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use super::handlers::ErrorBody;

/// Bucket count above which refilled buckets are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// Token bucket rate limiter, one bucket per client address.
///
/// Requests without a known address share the `None` bucket.
#[derive(Debug)]
pub struct SimpleRateLimiter {
    // client -> (last_update, tokens)
    buckets: Mutex<HashMap<Option<IpAddr>, (Instant, f32)>>,
    rate_per_sec: f32,
    burst_size: f32,
}

impl SimpleRateLimiter {
    pub fn new(rate_per_sec: f32, burst_size: f32) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            rate_per_sec,
            burst_size,
        }
    }

    /// `requests` per minute, all of which may arrive at once.
    #[allow(clippy::cast_precision_loss)]
    pub fn per_minute(requests: u32) -> Self {
        let requests = requests as f32;
        Self::new(requests / 60.0, requests)
    }

    /// Take one token from `client`'s bucket.
    pub fn check(&self, client: Option<IpAddr>) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let (last_update, tokens) = buckets
            .get(&client)
            .copied()
            .unwrap_or((now, self.burst_size));
        let elapsed = now.duration_since(last_update).as_secs_f32();

        let new_tokens = (tokens + elapsed * self.rate_per_sec).min(self.burst_size);

        // Time still advances on a denied request.
        let (left, allowed) = if new_tokens >= 1.0 {
            (new_tokens - 1.0, true)
        } else {
            (new_tokens, false)
        };
        buckets.insert(client, (now, left));

        if buckets.len() > PRUNE_THRESHOLD {
            // A full bucket behaves like a missing one.
            buckets.retain(|_, (last, tokens)| {
                *tokens + now.duration_since(*last).as_secs_f32() * self.rate_per_sec
                    < self.burst_size
            });
        }
        allowed
    }

    /// Number of buckets currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Middleware guarding the send route.
///
/// The client is the peer address from `ConnectInfo`, present when the
/// service runs with `into_make_service_with_connect_info`.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorBody>)> {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if state.config.resilience.rate_limit_enabled && !state.rate_limiter.check(client) {
        tracing::warn!(
            path = %req.uri().path(),
            client = ?client,
            "rate limit exceeded"
        );
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody::new("Rate limit exceeded. Please wait a minute.")),
        ));
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_simple_rate_limiter() {
        let limiter = SimpleRateLimiter::new(2.0, 5.0); // 2 req/s, 5 burst

        // Consume all burst
        for _ in 0..5 {
            assert!(limiter.check(None));
        }

        // Next should fail (immediate)
        assert!(!limiter.check(None));

        // Wait for 0.6s -> +1.2 tokens -> check consumes 1 -> 0.2 left
        std::thread::sleep(Duration::from_millis(600));
        assert!(limiter.check(None));

        assert!(!limiter.check(None));
    }

    #[test]
    fn test_per_minute_burst() {
        let limiter = SimpleRateLimiter::per_minute(8);
        for _ in 0..8 {
            assert!(limiter.check(ip("10.0.0.1")));
        }
        assert!(!limiter.check(ip("10.0.0.1")));
    }

    #[test]
    fn test_clients_have_separate_buckets() {
        let limiter = SimpleRateLimiter::per_minute(2);
        assert!(limiter.check(ip("10.0.0.1")));
        assert!(limiter.check(ip("10.0.0.1")));
        assert!(!limiter.check(ip("10.0.0.1")));

        assert!(limiter.check(ip("10.0.0.2")));
        assert!(limiter.check(None));
        assert_eq!(limiter.tracked_clients(), 3);
    }

    #[test]
    fn test_refilled_buckets_are_pruned() {
        // Refills instantly, so every bucket is full again by the next call.
        let limiter = SimpleRateLimiter::new(1_000_000.0, 1.0);
        for i in 0..PRUNE_THRESHOLD {
            let last = u8::try_from(i % 256).unwrap();
            let third = u8::try_from(i / 256).unwrap();
            assert!(limiter.check(Some(IpAddr::from([10, 0, third, last]))));
        }
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(limiter.tracked_clients(), PRUNE_THRESHOLD);

        assert!(limiter.check(ip("192.168.1.1")));
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
