use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use reqwest::header::HeaderMap;
use tracing::{debug, trace};

/// Default bucket shape before any response headers have refined it:
/// approximates Discord's global per-route limit.
const DEFAULT_TOKENS_PER_SEC: f64 = 5.0;
const DEFAULT_BURST: f64 = 5.0;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct Bucket {
    remaining: i64,
    limit: i64,
    reset_at: Option<DateTime<Utc>>,

    tokens: f64,
    capacity: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl Default for Bucket {
    fn default() -> Self {
        Self {
            remaining: 1,
            limit: DEFAULT_BURST as i64,
            reset_at: None,
            tokens: DEFAULT_BURST,
            capacity: DEFAULT_BURST,
            refill_per_sec: DEFAULT_TOKENS_PER_SEC,
            last_refill: Instant::now(),
        }
    }
}

impl Bucket {
    fn refill(&mut self) {
        let elapsed = self.last_refill.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return;
        }
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = Instant::now();
    }

    /// Attempts to take one slot. Returns true on success.
    fn try_acquire(&mut self) -> bool {
        self.refill();

        let now = Utc::now();
        let reset_passed = self.reset_at.map_or(true, |reset| now >= reset);

        if (self.remaining > 0 || reset_passed) && self.tokens >= 1.0 {
            self.tokens -= 1.0;
            if self.remaining > 0 {
                self.remaining -= 1;
            }
            if reset_passed {
                self.remaining = self.limit.max(1) - 1;
                self.reset_at = None;
            }
            true
        } else {
            false
        }
    }
}

/// Per-route token-bucket rate limiter, driven by Discord's rate-limit
/// response headers. One bucket per route key; buckets are created lazily
/// with the conservative global-limit default.
#[derive(Default)]
pub struct RateLimiter {
    buckets: DashMap<String, Mutex<Bucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks the caller until a request against `route` may proceed, then
    /// consumes one slot.
    pub async fn wait(&self, route: &str) {
        loop {
            let acquired = {
                let entry = self.buckets.entry(route.to_owned()).or_default();
                let mut bucket = entry.lock().expect("rate limiter bucket mutex poisoned");
                bucket.try_acquire()
            };

            if acquired {
                trace!(route, "rate limiter slot acquired");
                return;
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Refines a route's bucket from a successful response's rate-limit
    /// headers.
    pub fn update_from_headers(&self, route: &str, headers: &HeaderMap) {
        let remaining = header_i64(headers, "x-ratelimit-remaining");
        let limit = header_i64(headers, "x-ratelimit-limit");
        let reset = header_reset(headers, "x-ratelimit-reset");

        if remaining.is_none() && limit.is_none() && reset.is_none() {
            return;
        }

        let entry = self.buckets.entry(route.to_owned()).or_default();
        let mut bucket = entry.lock().expect("rate limiter bucket mutex poisoned");

        if let Some(remaining) = remaining {
            bucket.remaining = remaining;
        }
        if let Some(limit) = limit {
            bucket.limit = limit;
            bucket.capacity = limit.max(1) as f64;
        }
        if let Some(reset) = reset {
            bucket.reset_at = Some(reset);

            if let Some(limit) = limit {
                let seconds_until_reset = (reset - Utc::now()).num_milliseconds() as f64 / 1000.0;
                if seconds_until_reset > 0.0 {
                    bucket.refill_per_sec = limit as f64 / seconds_until_reset;
                }
            }
        }

        debug!(route, remaining = ?remaining, limit = ?limit, "rate limiter bucket updated");
    }

    /// Records a 429 response: Retry-After (seconds) wins, falling back to
    /// the reset header, then a 1s default.
    pub fn handle_rate_limited(&self, route: &str, headers: &HeaderMap) -> f64 {
        let retry_after = headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok());

        let wait_secs = retry_after
            .or_else(|| {
                header_reset(headers, "x-ratelimit-reset")
                    .map(|reset| (reset - Utc::now()).num_milliseconds().max(0) as f64 / 1000.0)
            })
            .unwrap_or(1.0);

        let entry = self.buckets.entry(route.to_owned()).or_default();
        let mut bucket = entry.lock().expect("rate limiter bucket mutex poisoned");
        bucket.remaining = 0;
        bucket.reset_at = Some(Utc::now() + chrono::Duration::milliseconds((wait_secs * 1000.0) as i64));

        wait_secs
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

/// Parses `X-RateLimit-Reset`: RFC3339 first, Unix seconds (possibly
/// fractional) fallback.
fn header_reset(headers: &HeaderMap, name: &str) -> Option<DateTime<Utc>> {
    let raw = headers.get(name)?.to_str().ok()?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let secs = raw.parse::<f64>().ok()?;
    Utc.timestamp_opt(secs.trunc() as i64, ((secs.fract()) * 1e9) as u32)
        .single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquires_immediately_on_fresh_bucket() {
        let limiter = RateLimiter::new();
        limiter.wait("/users/@me").await;
    }

    #[test]
    fn reset_header_parses_rfc3339_and_unix() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", "1700000000".parse().unwrap());
        assert!(header_reset(&headers, "x-ratelimit-reset").is_some());

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-ratelimit-reset",
            "2024-01-01T00:00:00Z".parse().unwrap(),
        );
        assert!(header_reset(&headers, "x-ratelimit-reset").is_some());
    }

    #[test]
    fn handle_rate_limited_prefers_retry_after() {
        let limiter = RateLimiter::new();
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", "2".parse().unwrap());
        let wait = limiter.handle_rate_limited("/x", &headers);
        assert!((wait - 2.0).abs() < 1e-9);
    }
}
