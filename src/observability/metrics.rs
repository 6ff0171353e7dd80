//! Counters for the tagging passes
//!
//! Monotonic, reset only by creating a new registry. Relaxed atomics: a
//! registry may be shared by planners running on several threads.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Pass counters
#[derive(Debug, Default)]
pub struct PassMetrics {
    passes: AtomicU64,
    relocations: AtomicU64,
    clones_attached: AtomicU64,
    predicates_subsumed: AtomicU64,
    partial_relocations: AtomicU64,
    unresolved_directives: AtomicU64,
}

impl PassMetrics {
    /// Creates a registry with every counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one completed pass
    pub fn increment_passes(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds processed directive sets
    pub fn add_relocations(&self, n: u64) {
        self.relocations.fetch_add(n, Ordering::Relaxed);
    }

    /// Adds copies grafted into OR branches
    pub fn add_clones_attached(&self, n: u64) {
        self.clones_attached.fetch_add(n, Ordering::Relaxed);
    }

    /// Adds predicates removed from their AND
    pub fn add_predicates_subsumed(&self, n: u64) {
        self.predicates_subsumed.fetch_add(n, Ordering::Relaxed);
    }

    /// Adds directive sets that left a branch uncovered
    pub fn add_partial_relocations(&self, n: u64) {
        self.partial_relocations.fetch_add(n, Ordering::Relaxed);
    }

    /// Adds directives still attached after resolution
    pub fn add_unresolved_directives(&self, n: u64) {
        self.unresolved_directives.fetch_add(n, Ordering::Relaxed);
    }

    /// Reads every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            passes: self.passes.load(Ordering::Relaxed),
            relocations: self.relocations.load(Ordering::Relaxed),
            clones_attached: self.clones_attached.load(Ordering::Relaxed),
            predicates_subsumed: self.predicates_subsumed.load(Ordering::Relaxed),
            partial_relocations: self.partial_relocations.load(Ordering::Relaxed),
            unresolved_directives: self.unresolved_directives.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub passes: u64,
    pub relocations: u64,
    pub clones_attached: u64,
    pub predicates_subsumed: u64,
    pub partial_relocations: u64,
    pub unresolved_directives: u64,
}
