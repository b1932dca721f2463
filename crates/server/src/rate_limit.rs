//! Fixed-window rate limiting for the admin endpoints.
//!
//! Each client origin gets its own window. The clock is injected so tests
//! can drive window rollover deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time, used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Window {
    started: Instant,
    count: u32,
}

/// Per-origin fixed-window counter.
///
/// `check` admits up to `limit` calls per `window`; the first rejected call
/// and all later ones in the same window get the seconds remaining until the
/// window rolls over.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    window: Duration,
    limit: u32,
    clock: Arc<dyn Clock>,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, limit: u32) -> Self {
        Self::with_clock(window, limit, Arc::new(SystemClock))
    }

    pub fn with_clock(window: Duration, limit: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            limit,
            clock,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Admit or reject one call from `origin`. Rejections carry the
    /// whole-second wait until the current window expires (at least 1).
    pub fn check(&self, origin: &str) -> Result<(), u64> {
        let now = self.clock.now();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // Counters stay valid even if a holder panicked.
            Err(poisoned) => poisoned.into_inner(),
        };

        // Drop lapsed windows so one-off origins do not accumulate forever.
        windows.retain(|_, w| now.duration_since(w.started) < self.window);

        let window = windows.entry(origin.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if window.count < self.limit {
            window.count += 1;
            Ok(())
        } else {
            let elapsed = now.duration_since(window.started);
            let remaining = self.window.saturating_sub(elapsed);
            Err((remaining.as_secs()).max(1))
        }
    }

    #[cfg(test)]
    fn tracked_origins(&self) -> usize {
        match self.windows.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Test clock advanced by hand.
#[cfg(test)]
pub(crate) struct ManualClock {
    now: Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}
