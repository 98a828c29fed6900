//! Scheduler counters.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time view of a scheduler's activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Tasks accepted onto this scheduler's own queue.
    pub submitted: u64,
    /// `schedule` calls delegated to a pass-through scheduler.
    pub redirected: u64,
    /// Tasks that settled successfully.
    pub succeeded: u64,
    /// Tasks that settled with a failure.
    pub failed: u64,
    /// Tasks waiting in the queue.
    pub queued: usize,
    /// Whether a task is executing right now.
    pub running: bool,
    /// Deepest level a task has been queued on.
    pub deepest_level: usize,
}

/// Internal counters (lock-free atomics).
#[derive(Debug, Default)]
pub(crate) struct SchedulerCounters {
    pub submitted: AtomicU64,
    pub redirected: AtomicU64,
    pub succeeded: AtomicU64,
    pub failed: AtomicU64,
    pub running: AtomicBool,
    pub deepest_level: AtomicUsize,
}

impl SchedulerCounters {
    pub fn record_submit(&self, depth: usize) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        self.deepest_level.fetch_max(depth, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, ok: bool) {
        let counter = if ok { &self.succeeded } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, queued: usize) -> SchedulerStats {
        SchedulerStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            redirected: self.redirected.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            queued,
            running: self.running.load(Ordering::Acquire),
            deepest_level: self.deepest_level.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = SchedulerStats::default();
        assert_eq!(stats.submitted, 0);
        assert_eq!(stats.queued, 0);
        assert!(!stats.running);
    }

    #[test]
    fn test_counters_snapshot() {
        let counters = SchedulerCounters::default();
        counters.record_submit(0);
        counters.record_submit(2);
        counters.record_submit(1);
        counters.record_outcome(true);
        counters.record_outcome(false);
        counters.redirected.fetch_add(4, Ordering::Relaxed);

        let stats = counters.snapshot(1);
        assert_eq!(stats.submitted, 3);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.redirected, 4);
        assert_eq!(stats.queued, 1);
        assert_eq!(stats.deepest_level, 2);
    }
}
