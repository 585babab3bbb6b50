//! # Attempt Rate Limiting
//!
//! Client-side sliding-window limiter for auth attempts. It runs BEFORE
//! any provider contact, so a flood of sign-in attempts never turns into
//! a flood of provider requests.
//!
//! ## Sliding Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sliding Window per Key                               │
//! │                                                                         │
//! │  key = "sign_in:amina@duka.ke"                                          │
//! │                                                                         │
//! │  window ──────────────────────────────────────────────► now             │
//! │          │ x       x    x        x  x │ <── 5 timestamps kept           │
//! │          └── older entries pruned ────┘                                 │
//! │                                                                         │
//! │  attempt #6 inside the window ──► rejected, retry_after = time until    │
//! │                                   the oldest timestamp leaves the       │
//! │                                   window                                │
//! │                                                                         │
//! │  ATTEMPTS count at call time, success or failure. A correct password    │
//! │  on the 6th try within the window is still rejected.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

/// Sliding-window attempt limiter keyed by an arbitrary string
/// (typically `action:email`).
#[derive(Debug)]
pub struct AttemptLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
}

impl AttemptLimiter {
    /// Creates a limiter allowing `max_attempts` per `window` per key.
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        AttemptLimiter {
            max_attempts,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt and decides whether it may proceed.
    ///
    /// Returns `Err(retry_after)` when the key already used up its window;
    /// the rejected attempt is NOT recorded, so waiting out the window
    /// always works.
    pub fn check_and_record(&self, key: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().expect("limiter lock poisoned");
        let entries = attempts.entry(key.to_string()).or_default();

        entries.retain(|t| now.duration_since(*t) < self.window);

        if entries.len() >= self.max_attempts {
            let oldest = entries[0];
            let retry_after = self.window.saturating_sub(now.duration_since(oldest));
            warn!(key = %key, retry_after_secs = retry_after.as_secs(), "Attempt rate limited");
            return Err(retry_after);
        }

        entries.push(now);
        Ok(())
    }

    /// Drops the recorded attempts for a key. Used by tests and after a
    /// deliberate admin reset, never on mere sign-in success.
    pub fn reset(&self, key: &str) {
        self.attempts
            .lock()
            .expect("limiter lock poisoned")
            .remove(key);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
