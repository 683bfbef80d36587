//! Run-time configuration.

use std::time::Duration;

use crate::error::{KStarError, KStarResult};

/// How chatty the engine is on stderr. Structured `tracing` output (when
/// the `tracing` feature is enabled) is emitted independently of this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Normal,
    Verbose,
    Debug,
}

/// Configuration for one enumeration run.
#[derive(Clone, Debug)]
pub struct KStarConfig {
    /// Number of plans to enumerate.
    pub k: usize,
    /// Whether the forward search re-expands closed states whose g-value
    /// improved. With this off, improved closed states still adopt the
    /// better parent but are not re-expanded.
    pub reopen_closed: bool,
    /// Reject plans that visit a state twice. On tasks with zero-cost
    /// actions this additionally requires `max_time`, enforced at
    /// engine construction: a free cycle yields rejected candidates at
    /// a constant cost forever, so only the budget bounds the run.
    pub simple_plans_only: bool,
    /// Reject plans whose action sequence was already emitted. Off by
    /// default: every accepted path-graph pop counts.
    pub dedup_by_actions: bool,
    /// Whether `KStarOutcome::plans` should be persisted by the caller's
    /// sink; see [`crate::plan::write_plan_bundle`].
    pub dump_plans: bool,
    /// Wall-clock budget for the whole run. `None` means unbounded.
    pub max_time: Option<Duration>,
    pub verbosity: Verbosity,
}

impl Default for KStarConfig {
    fn default() -> Self {
        Self {
            k: 1,
            reopen_closed: true,
            simple_plans_only: false,
            dedup_by_actions: false,
            dump_plans: false,
            max_time: None,
            verbosity: Verbosity::Normal,
        }
    }
}

impl KStarConfig {
    /// Check the configuration before a run.
    pub fn validate(&self) -> KStarResult<()> {
        if self.k == 0 {
            return Err(KStarError::Config("k must be positive".into()));
        }
        if let Some(budget) = self.max_time {
            if budget.is_zero() {
                return Err(KStarError::Config("max_time must be positive".into()));
            }
        }
        Ok(())
    }
}
