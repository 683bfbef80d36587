//! Run statistics.

use crate::config::Verbosity;

/// Counters accumulated over one enumeration run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Statistics {
    /// Forward-search expansions (closed states, reopenings included).
    pub expansions: u64,
    /// Heuristic evaluations.
    pub evaluations: u64,
    /// Successor states generated during relaxation.
    pub generated: u64,
    /// Closed states put back on the open list.
    pub reopened: u64,
    /// Sidetracks recorded.
    pub sidetracks: u64,
    /// Heap nodes allocated across all tree-heap materializations.
    pub heap_nodes: u64,
    /// Path-graph entries popped.
    pub pg_pops: u64,
    /// Path-graph rebuilds after tree or sidetrack changes.
    pub pg_restarts: u64,
    /// Plans accepted and handed to the sink.
    pub plans_emitted: u64,
    /// Candidates rejected by filtering (non-simple or duplicate).
    pub plans_rejected: u64,
}

impl Statistics {
    /// Multi-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "expansions: {}\nevaluations: {}\ngenerated: {}\nreopened: {}\n\
             sidetracks: {}\nheap nodes: {}\npath-graph pops: {}\npath-graph restarts: {}\n\
             plans emitted: {}\nplans rejected: {}",
            self.expansions,
            self.evaluations,
            self.generated,
            self.reopened,
            self.sidetracks,
            self.heap_nodes,
            self.pg_pops,
            self.pg_restarts,
            self.plans_emitted,
            self.plans_rejected,
        )
    }

    /// Print the summary to stderr unless the run is silent.
    pub fn report(&self, verbosity: Verbosity) {
        if verbosity >= Verbosity::Normal {
            eprintln!("{}", self.summary());
        }
    }
}
