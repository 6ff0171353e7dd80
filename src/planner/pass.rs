//! Tagging pass driver
//!
//! Runs, in order:
//! 1. directive resolution
//! 2. optional verification that no directives were left behind
//! 3. optional canonicalization (tag propagation, then sort)
//!
//! and records the outcome in logs and counters.

use std::sync::Arc;

use super::ast::PredicateNode;
use super::canonical::{propagate_tag, sort_by_tag};
use super::config::TagPassConfig;
use super::indexability::{DefaultIndexability, Indexability};
use super::resolve::{resolve_with, RelocationRecord, ResolveStats};
use crate::observability::{Event, Logger, ObservationScope, PassMetrics};

/// Outcome of one pass over one tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub resolve: ResolveStats,
    /// Directives still attached after resolution (0 unless verification ran)
    pub unresolved: usize,
    pub canonicalized: bool,
}

/// Configured tagging pass
pub struct TagPass<I: Indexability = DefaultIndexability> {
    config: TagPassConfig,
    oracle: I,
    metrics: Arc<PassMetrics>,
}

impl TagPass<DefaultIndexability> {
    /// Pass using the standard indexability rules
    pub fn new(config: TagPassConfig) -> Self {
        Self::with_oracle(config, DefaultIndexability)
    }
}

impl<I: Indexability> TagPass<I> {
    /// Pass using a custom indexability oracle
    pub fn with_oracle(config: TagPassConfig, oracle: I) -> Self {
        Self {
            config,
            oracle,
            metrics: Arc::new(PassMetrics::new()),
        }
    }

    /// Shares `metrics` with other passes
    pub fn with_metrics(mut self, metrics: Arc<PassMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Configuration this pass runs with
    pub fn config(&self) -> &TagPassConfig {
        &self.config
    }

    /// Counters updated by `run`
    pub fn metrics(&self) -> &PassMetrics {
        &self.metrics
    }

    /// Rewrites `tree` in place.
    ///
    /// Panics if the tree breaks the relocation contract; see
    /// `ContractViolationCode`.
    pub fn run(&self, tree: &mut PredicateNode) -> PassReport {
        let scope = ObservationScope::new(
            Event::TagPassBegin,
            Event::TagPassComplete,
            vec![("nodes", tree.node_count().to_string())],
            self.config.log_events,
        );

        let trace = self.config.trace_relocations;
        let mut stats = ResolveStats::default();
        resolve_with(tree, &mut |record: RelocationRecord| {
            if trace {
                trace_record(&record);
            }
            stats.record(&record);
        });

        let unresolved = if self.config.verify_resolved {
            tree.pending_directive_count()
        } else {
            0
        };
        if unresolved > 0 && self.config.log_events {
            Logger::warn(
                Event::DirectivesUnresolved.as_str(),
                &[("count", unresolved.to_string().as_str())],
            );
        }

        if self.config.canonicalize {
            propagate_tag(tree, &self.oracle);
            sort_by_tag(tree);
            if trace {
                Logger::trace(Event::TreeCanonicalized.as_str(), &[]);
            }
        }

        self.metrics.increment_passes();
        self.metrics.add_relocations(stats.relocations);
        self.metrics.add_clones_attached(stats.clones_attached);
        self.metrics.add_predicates_subsumed(stats.subsumed);
        self.metrics.add_partial_relocations(stats.partial);
        self.metrics.add_unresolved_directives(unresolved as u64);

        scope.complete(&[
            ("relocations", stats.relocations.to_string().as_str()),
            ("subsumed", stats.subsumed.to_string().as_str()),
            ("unresolved", unresolved.to_string().as_str()),
        ]);

        PassReport {
            resolve: stats,
            unresolved,
            canonicalized: self.config.canonicalize,
        }
    }
}

fn trace_record(record: &RelocationRecord) {
    let directives = record.directives.to_string();
    let covered = if record.covered { "true" } else { "false" };
    Logger::trace(
        Event::PredicateRelocated.as_str(),
        &[
            ("covered", covered),
            ("directives", directives.as_str()),
            ("kind", record.kind.as_str()),
            ("path", record.path.as_str()),
        ],
    );
    if record.removed {
        Logger::trace(
            Event::PredicateSubsumed.as_str(),
            &[("kind", record.kind.as_str()), ("path", record.path.as_str())],
        );
    }
}
