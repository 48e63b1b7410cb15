//! Readiness verdict cache
//!
//! Readiness is recomputed from live affix text, which is cheap but not
//! free, and both the decision path and the overlay ask for it every frame.
//! Verdicts are cached per container for a short TTL; anything older is
//! recomputed. Entries for containers no longer observed are purged so the
//! cache cannot grow with the session.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use boxroll_core::ContainerId;

/// How long a cached verdict stays valid
pub const READINESS_TTL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy)]
struct Entry {
    is_ready: bool,
    last_checked_at: Instant,
}

#[derive(Debug)]
pub struct ReadinessCache {
    ttl: Duration,
    entries: HashMap<ContainerId, Entry>,
}

impl ReadinessCache {
    pub fn new() -> Self {
        Self::with_ttl(READINESS_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Cached verdict, or `None` when absent or expired
    pub fn verdict(&self, id: ContainerId, now: Instant) -> Option<bool> {
        let entry = self.entries.get(&id)?;
        if now.duration_since(entry.last_checked_at) < self.ttl {
            Some(entry.is_ready)
        } else {
            None
        }
    }

    /// Record a fresh verdict, overwriting any previous entry
    pub fn record(&mut self, id: ContainerId, is_ready: bool, now: Instant) {
        self.entries.insert(
            id,
            Entry {
                is_ready,
                last_checked_at: now,
            },
        );
    }

    /// Drop the entry for a container whose affixes just changed
    pub fn invalidate(&mut self, id: ContainerId) {
        self.entries.remove(&id);
    }

    /// Keep only entries for containers still being observed
    pub fn retain_observed(&mut self, observed: &[ContainerId]) {
        self.entries.retain(|id, _| observed.contains(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReadinessCache {
    fn default() -> Self {
        Self::new()
    }
}
