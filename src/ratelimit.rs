// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sliding-window request rate governor.
//!
//! Tracks per-key request timestamps in a trailing window. Admission prunes
//! lazily; a background sweep bounds memory independent of traffic shape by
//! pruning every key and dropping emptied entries. The sweep task is owned
//! by the caller's lifecycle via a [`CancellationToken`], not a detached
//! loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Interval between background sweeps (1 minute).
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Per-key sliding-window rate limiter.
///
/// One mutex guards the whole map; `allow` does a handful of comparisons
/// under it, which keeps admission linearizable per key without sharding.
pub struct RateLimiter {
    requests: Mutex<HashMap<String, Vec<Instant>>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
            limit,
            window,
        }
    }

    /// Admit or deny a request for the given key.
    ///
    /// Prunes entries older than the window, denies without recording when
    /// the remaining count has reached the limit, otherwise records now and
    /// admits.
    pub fn allow(&self, key: &str) -> bool {
        let mut requests = self.requests.lock().expect("rate limiter lock poisoned");
        let now = Instant::now();

        let timestamps = requests.entry(key.to_string()).or_default();
        timestamps.retain(|&t| now.duration_since(t) < self.window);

        if timestamps.len() >= self.limit {
            return false;
        }

        timestamps.push(now);
        true
    }

    /// Prune every key's entries and drop keys left empty.
    pub fn sweep(&self) {
        let mut requests = self.requests.lock().expect("rate limiter lock poisoned");
        let now = Instant::now();

        requests.retain(|_, timestamps| {
            timestamps.retain(|&t| now.duration_since(t) < self.window);
            !timestamps.is_empty()
        });
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.requests
            .lock()
            .expect("rate limiter lock poisoned")
            .len()
    }

    /// Start the periodic sweep task. Runs until the token is cancelled.
    pub fn spawn_sweeper(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let limiter = self;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            // The first tick fires immediately; consume it so sweeps start
            // one interval from now.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("rate limiter sweep task stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        limiter.sweep();
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn admits_up_to_limit_then_denies() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.allow("user-1"));
        assert!(limiter.allow("user-1"));
        assert!(limiter.allow("user-1"));
        assert!(!limiter.allow("user-1"));
    }

    #[test]
    fn keys_are_governed_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.allow("user-1"));
        assert!(!limiter.allow("user-1"));
        assert!(limiter.allow("10.0.0.7"));
    }

    #[test]
    fn admission_resumes_after_window() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50));
        assert!(limiter.allow("user-1"));
        assert!(limiter.allow("user-1"));
        assert!(!limiter.allow("user-1"));

        thread::sleep(Duration::from_millis(70));
        assert!(limiter.allow("user-1"));
    }

    #[test]
    fn window_slides_rather_than_resets() {
        let limiter = RateLimiter::new(2, Duration::from_millis(120));
        assert!(limiter.allow("user-1"));
        assert!(limiter.allow("user-1"));

        // Halfway through the window both admissions still count.
        thread::sleep(Duration::from_millis(60));
        assert!(!limiter.allow("user-1"));

        // Past the window from the oldest admission, a slot opens.
        thread::sleep(Duration::from_millis(80));
        assert!(limiter.allow("user-1"));
    }

    #[test]
    fn denied_requests_are_not_recorded() {
        let limiter = RateLimiter::new(1, Duration::from_millis(60));
        assert!(limiter.allow("user-1"));
        for _ in 0..10 {
            assert!(!limiter.allow("user-1"));
        }
        // Only the single admitted timestamp ages out; denials added nothing.
        thread::sleep(Duration::from_millis(80));
        assert!(limiter.allow("user-1"));
    }

    #[test]
    fn concurrent_calls_never_double_admit() {
        let limit = 8;
        let limiter = Arc::new(RateLimiter::new(limit, Duration::from_secs(60)));

        let handles: Vec<_> = (0..limit * 2)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || limiter.allow("user-1"))
            })
            .collect();

        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let admitted = results.iter().filter(|&&allowed| allowed).count();
        let denied = results.len() - admitted;
        assert_eq!(admitted, limit);
        assert_eq!(denied, limit);
    }

    #[test]
    fn sweep_drops_empty_keys() {
        let limiter = RateLimiter::new(5, Duration::from_millis(30));
        assert!(limiter.allow("user-1"));
        assert!(limiter.allow("user-2"));
        assert_eq!(limiter.tracked_keys(), 2);

        thread::sleep(Duration::from_millis(50));
        limiter.sweep();
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn sweeper_stops_on_cancellation() {
        let limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)));
        let shutdown = CancellationToken::new();
        let handle = limiter.spawn_sweeper(shutdown.clone());

        shutdown.cancel();
        handle.await.unwrap();
    }
}
