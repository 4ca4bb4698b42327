//! Injected frame clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing render-timeline tick.
///
/// Advanced exactly once per rendered frame by the owning renderer; the
/// cache only reads it to timestamp entries. Advancement is not synchronized
/// with cache operations, so `last_used` values are an eviction-ordering
/// heuristic rather than precise timestamps (off by at most one in-flight
/// advancement).
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame: Arc<AtomicU64>,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one frame. Owner-side only.
    pub fn advance(&self) {
        self.frame.fetch_add(1, Ordering::Relaxed);
    }

    /// Current frame index.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.frame.load(Ordering::Relaxed)
    }
}
