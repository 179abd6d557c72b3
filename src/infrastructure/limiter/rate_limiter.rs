use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::sleep;

/// A token bucket which allows fractional tokens for precise refill
#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_per_sec: f64) -> Self {
        let now = Instant::now();
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: now,
            last_seen: now,
        }
    }

    /// Refill tokens based on elapsed time. Uses double precision arithmetic.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            self.last_refill = now;
        }
    }

    /// Consumes one token, or returns the whole seconds until one is available.
    /// Small epsilon to avoid fp surprises
    fn try_consume(&mut self, now: Instant) -> Result<(), u64> {
        self.last_seen = now;
        self.refill(now);
        if self.tokens + 1e-12 >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - self.tokens;
            Err(((tokens_needed / self.refill_per_sec).ceil() as u64).max(1))
        }
    }
}

/// Per-client login attempt budget: `max_attempts` burst, refilled one token
/// every `refill_every`.
#[derive(Clone)]
pub struct LoginThrottle {
    map: Arc<DashMap<String, Arc<Mutex<TokenBucket>>>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, refill_every: Duration) -> Self {
        let refill_secs = refill_every.as_secs_f64().max(f64::EPSILON);
        Self {
            map: Arc::new(DashMap::new()),
            capacity: f64::from(max_attempts.max(1)),
            refill_per_sec: 1.0 / refill_secs,
        }
    }

    /// Records an attempt for `key`. `Err(retry_after_secs)` when the budget is spent.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let bucket = self.get_bucket(key);
        let mut b = bucket.lock();
        b.try_consume(Instant::now())
    }

    fn get_bucket(&self, key: &str) -> Arc<Mutex<TokenBucket>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(TokenBucket::new(self.capacity, self.refill_per_sec))))
            .clone()
    }

    /// Drops buckets idle for longer than `ttl`.
    pub fn evict_idle(&self, ttl: Duration) {
        let now = Instant::now();
        self.map.retain(|_, bucket| now.duration_since(bucket.lock().last_seen) <= ttl);
    }

    pub fn tracked_clients(&self) -> usize {
        self.map.len()
    }

    /// Runs [`evict_idle`](Self::evict_idle) every `interval` on the current runtime.
    pub fn spawn_eviction(&self, interval: Duration, ttl: Duration) -> tokio::task::JoinHandle<()> {
        let throttle = self.clone();
        tokio::spawn(async move {
            loop {
                sleep(interval).await;
                throttle.evict_idle(ttl);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_burst_then_rejects() {
        let throttle = LoginThrottle::new(3, Duration::from_secs(6));
        for _ in 0..3 {
            assert!(throttle.check("203.0.113.7").is_ok());
        }
        let retry_after = throttle.check("203.0.113.7").unwrap_err();
        assert!((1..=6).contains(&retry_after));
    }

    #[test]
    fn clients_have_separate_budgets() {
        let throttle = LoginThrottle::new(1, Duration::from_secs(60));
        assert!(throttle.check("a").is_ok());
        assert!(throttle.check("a").is_err());
        assert!(throttle.check("b").is_ok());
    }

    #[test]
    fn bucket_refills_over_time() {
        let mut bucket = TokenBucket::new(1.0, 10.0);
        let start = Instant::now();
        assert!(bucket.try_consume(start).is_ok());
        assert!(bucket.try_consume(start).is_err());
        assert!(bucket.try_consume(start + Duration::from_millis(150)).is_ok());
    }

    #[test]
    fn idle_buckets_are_evicted() {
        let throttle = LoginThrottle::new(5, Duration::from_secs(6));
        throttle.check("a").unwrap();
        assert_eq!(throttle.tracked_clients(), 1);
        throttle.evict_idle(Duration::from_secs(3600));
        assert_eq!(throttle.tracked_clients(), 1);
        std::thread::sleep(Duration::from_millis(5));
        throttle.evict_idle(Duration::ZERO);
        assert_eq!(throttle.tracked_clients(), 0);
    }
}
