use std::time::Duration;

use crate::config::{KStarConfig, Verbosity};
use crate::engine::KStarEngine;
use crate::error::KStarResult;
use crate::task::{BlindHeuristic, Heuristic, SearchTask};

/// Fluent construction of a [`KStarEngine`].
pub struct KStarEngineBuilder<T: SearchTask, H: Heuristic<T>> {
    task: T,
    heuristic: H,
    config: KStarConfig,
}

impl<T: SearchTask> KStarEngineBuilder<T, BlindHeuristic> {
    /// Start from a task with the blind heuristic and defaults.
    pub fn new(task: T) -> Self {
        Self {
            task,
            heuristic: BlindHeuristic,
            config: KStarConfig::default(),
        }
    }
}

impl<T: SearchTask, H: Heuristic<T>> KStarEngineBuilder<T, H> {
    /// Swap in a different heuristic.
    pub fn with_heuristic<H2: Heuristic<T>>(self, heuristic: H2) -> KStarEngineBuilder<T, H2> {
        KStarEngineBuilder {
            task: self.task,
            heuristic,
            config: self.config,
        }
    }

    pub fn k(mut self, k: usize) -> Self {
        self.config.k = k;
        self
    }

    pub fn reopen_closed(mut self, on: bool) -> Self {
        self.config.reopen_closed = on;
        self
    }

    pub fn simple_plans_only(mut self, on: bool) -> Self {
        self.config.simple_plans_only = on;
        self
    }

    pub fn dedup_by_actions(mut self, on: bool) -> Self {
        self.config.dedup_by_actions = on;
        self
    }

    pub fn dump_plans(mut self, on: bool) -> Self {
        self.config.dump_plans = on;
        self
    }

    pub fn max_time(mut self, budget: Duration) -> Self {
        self.config.max_time = Some(budget);
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    pub fn build(self) -> KStarResult<KStarEngine<T, H>> {
        KStarEngine::new(self.task, self.heuristic, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::StateId;
    use crate::tasks::explicit::ExplicitTask;

    #[test]
    fn builder_round_trips_options() {
        let mut task = ExplicitTask::new(2, StateId(0));
        task.set_goal(StateId(1));
        task.add_action("a", StateId(0), StateId(1), 1);
        let engine = KStarEngineBuilder::new(task)
            .k(3)
            .simple_plans_only(true)
            .verbosity(Verbosity::Silent)
            .build()
            .unwrap();
        assert_eq!(engine.config().k, 3);
        assert!(engine.config().simple_plans_only);
    }

    #[test]
    fn builder_rejects_zero_k() {
        let mut task = ExplicitTask::new(2, StateId(0));
        task.set_goal(StateId(1));
        task.add_action("a", StateId(0), StateId(1), 1);
        assert!(KStarEngineBuilder::new(task).k(0).build().is_err());
    }
}
