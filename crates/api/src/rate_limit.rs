use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: usize },
    Limited { retry_after: Duration },
}

#[derive(Debug)]
struct Windows {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

/// Sliding-window request counter keyed by client address.
///
/// Keys whose window has fully elapsed are dropped, at most one window after
/// their last hit, so the map only holds clients seen recently.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    windows: Arc<Mutex<Windows>>,
    window: Duration,
    max_requests: usize,
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            windows: Arc::new(Mutex::new(Windows {
                hits: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            window,
            max_requests: max_requests.max(1),
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Number of clients currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().hits.len()
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut windows = self.windows.lock();

        if now.saturating_duration_since(windows.last_sweep) >= self.window {
            let window = self.window;
            windows.hits.retain(|_, hits| {
                prune(hits, now, window);
                !hits.is_empty()
            });
            windows.last_sweep = now;
        }

        let hits = windows.hits.entry(key.to_string()).or_default();
        prune(hits, now, self.window);

        if hits.len() >= self.max_requests {
            let elapsed = hits
                .front()
                .map(|oldest| now.saturating_duration_since(*oldest))
                .unwrap_or_default();
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        hits.push_back(now);
        RateDecision::Allowed {
            remaining: self.max_requests - hits.len(),
        }
    }
}

fn prune(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while hits
        .front()
        .is_some_and(|seen| now.saturating_duration_since(*seen) > window)
    {
        hits.pop_front();
    }
}
