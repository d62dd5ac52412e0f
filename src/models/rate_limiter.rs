// Minimum-interval rate limiter for hosted inference calls.
//
// The Hugging Face Inference API throttles anonymous and free-tier tokens.
// Each hosted model client owns one of these and waits on it before every
// request. Spacing is enforced per client, not globally.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Enforces a minimum gap between consecutive requests.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
}

struct RateLimiterInner {
    interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Allow up to `requests_per_second` requests per second. Non-positive
    /// rates disable limiting.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                interval,
                last_request: None,
            })),
        }
    }

    /// Wait until a request is allowed, then return.
    pub async fn acquire(&self) {
        let mut inner = self.inner.lock().await;

        if let Some(last) = inner.last_request {
            let elapsed = last.elapsed();
            if elapsed < inner.interval {
                let wait = inner.interval - elapsed;
                // Hold the lock while sleeping so waiters queue in order
                tokio::time::sleep(wait).await;
            }
        }

        inner.last_request = Some(Instant::now());
    }
}
