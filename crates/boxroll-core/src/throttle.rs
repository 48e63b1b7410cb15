//! Per-message debug log throttling
//!
//! Decision-path logging fires every tick, so identical lines are suppressed
//! unless enough time has passed since that line was last emitted. Distinct
//! messages throttle independently.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Messages are keyed by their first `KEY_LEN` characters, so long lines that
/// differ only in a trailing detail still share a throttle slot.
const KEY_LEN: usize = 50;

const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Suppresses repeats of the same debug message within a fixed interval
#[derive(Debug)]
pub struct LogThrottle {
    interval: Duration,
    last_emitted: Mutex<HashMap<String, Instant>>,
}

impl LogThrottle {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_emitted: Mutex::new(HashMap::new()),
        }
    }

    /// Whether this message may be emitted now
    ///
    /// Returns true and records the emission if the message's throttle slot
    /// is open; returns false without side effects otherwise.
    pub fn allow(&self, message: &str) -> bool {
        self.allow_at(message, Instant::now())
    }

    fn allow_at(&self, message: &str, now: Instant) -> bool {
        let key: String = message.chars().take(KEY_LEN).collect();
        let mut last_emitted = self.last_emitted.lock().unwrap_or_else(|e| e.into_inner());

        match last_emitted.get(&key) {
            Some(&last) if now.duration_since(last) < self.interval => false,
            _ => {
                last_emitted.insert(key, now);
                true
            }
        }
    }

    /// Emit a throttled debug line
    pub fn debug(&self, message: &str) {
        if self.allow(message) {
            tracing::debug!("{}", message);
        }
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new()
    }
}
