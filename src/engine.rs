//! The orchestration loop.
//!
//! A run alternates two cooperating searches over shared structures:
//! the forward A* search grows the shortest-path tree and collects
//! sidetracks, and the path-graph search enumerates deviation sequences
//! in order of detour cost. The forward search runs until the first
//! solution (cost C*), after which the loop hands control back and
//! forth under the gate `f_u >= C* + d`: the path-graph side may commit
//! its cheapest pending candidate only while no open forward node could
//! still lead to a cheaper plan.
//!
//! Whenever a forward burst changes the tree or the sidetrack set, the
//! materialized heaps and the path-graph frontier are rebuilt from
//! scratch; plans emitted before the rebuild stay emitted and the
//! re-enumeration skips them by action-sequence identity.

use std::collections::{HashMap, HashSet};

use crate::astar::{AstarDriver, StepStatus};
use crate::config::{KStarConfig, Verbosity};
use crate::error::{KStarError, KStarResult};
use crate::pathgraph::PathGraphSearch;
use crate::plan::{NullSink, Plan, PlanSink};
use crate::reconstruct;
use crate::search_space::SearchSpace;
use crate::sidetrack::SapStore;
use crate::stats::Statistics;
use crate::task::{ActionId, Cost, Heuristic, SearchTask, StateId};
use crate::tree_heap::TreeHeaps;
use crate::utils::CountdownTimer;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationStatus {
    /// All k requested plans were emitted.
    Complete,
    /// Enumeration dried up before reaching k.
    Exhausted,
    /// The wall-clock budget ran out.
    Timeout,
    /// The forward search exhausted the state space without closing a
    /// goal. Zero plans exist; not an error.
    Unsolvable,
}

/// Result of one enumeration run.
#[derive(Clone, Debug)]
pub struct KStarOutcome {
    /// Accepted plans in emission order; costs are non-decreasing.
    pub plans: Vec<Plan>,
    pub status: TerminationStatus,
    pub stats: Statistics,
}

impl KStarOutcome {
    /// At least one plan was found.
    pub fn is_success(&self) -> bool {
        !self.plans.is_empty()
    }

    /// All k requested plans were found.
    pub fn is_complete(&self) -> bool {
        self.status == TerminationStatus::Complete
    }

    /// Process exit code: 0 for a complete enumeration, 1 for partial
    /// success, 2 when no plan exists or none was found in time.
    pub fn exit_code(&self) -> i32 {
        if self.is_complete() {
            0
        } else if self.is_success() {
            1
        } else {
            2
        }
    }
}

/// Top-k plan enumeration engine.
///
/// Typical usage:
/// ```
/// use kstar::{KStarConfig, KStarEngine, StateId};
/// use kstar::task::BlindHeuristic;
/// use kstar::tasks::explicit::ExplicitTask;
///
/// let mut task = ExplicitTask::new(2, StateId(0));
/// task.set_goal(StateId(1));
/// task.add_action("a", StateId(0), StateId(1), 1);
/// task.add_action("b", StateId(0), StateId(1), 2);
///
/// let config = KStarConfig {
///     k: 2,
///     verbosity: kstar::Verbosity::Silent,
///     ..KStarConfig::default()
/// };
/// let mut engine = KStarEngine::new(task, BlindHeuristic, config).unwrap();
/// let outcome = engine.run().unwrap();
/// assert_eq!(outcome.plans.len(), 2);
/// assert_eq!(outcome.plans[0].cost, 1);
/// assert_eq!(outcome.plans[1].cost, 2);
/// ```
pub struct KStarEngine<T: SearchTask, H: Heuristic<T>> {
    task: T,
    heuristic: H,
    config: KStarConfig,
    space: SearchSpace,
    saps: SapStore,
    heaps: TreeHeaps,
    astar: AstarDriver,
    pg: PathGraphSearch,
    stats: Statistics,
    max_action_cost: Cost,
}

impl<T: SearchTask, H: Heuristic<T>> KStarEngine<T, H> {
    /// Validate configuration and task, and set up an idle engine.
    pub fn new(task: T, heuristic: H, config: KStarConfig) -> KStarResult<Self> {
        config.validate()?;
        let mut max_action_cost = 0;
        let mut has_zero_cost = false;
        for idx in 0..task.num_actions() {
            let action = ActionId(idx as u32);
            let cost = task.action_cost(action);
            if cost < 0 {
                return Err(KStarError::Task(format!(
                    "action '{}' has negative cost {}",
                    task.action_name(action),
                    cost
                )));
            }
            has_zero_cost |= cost == 0;
            max_action_cost = max_action_cost.max(cost);
        }
        // Zero-cost cycles keep the candidate frontier below the
        // simple-plan cost ceiling forever, so filtering alone cannot
        // terminate; insist on a wall-clock budget up front.
        if config.simple_plans_only && has_zero_cost && config.max_time.is_none() {
            return Err(KStarError::Config(
                "simple_plans_only with zero-cost actions requires a max_time budget".into(),
            ));
        }
        let hint = task.state_count_hint();
        let reopen_closed = config.reopen_closed;
        Ok(Self {
            task,
            heuristic,
            config,
            space: SearchSpace::with_capacity(hint),
            saps: SapStore::new(),
            heaps: TreeHeaps::new(),
            astar: AstarDriver::new(reopen_closed),
            pg: PathGraphSearch::new(),
            stats: Statistics::default(),
            max_action_cost,
        })
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn config(&self) -> &KStarConfig {
        &self.config
    }

    /// Run the enumeration, collecting accepted plans into the outcome.
    pub fn run(&mut self) -> KStarResult<KStarOutcome> {
        self.run_with_sink(&mut NullSink)
    }

    /// Run the enumeration, additionally handing each accepted plan to
    /// `sink` (1-based index) in emission order.
    pub fn run_with_sink(&mut self, sink: &mut dyn PlanSink) -> KStarResult<KStarOutcome> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("kstar_run", k = self.config.k).entered();

        let timer = CountdownTimer::new(self.config.max_time);
        let mut emitted: Vec<Plan> = Vec::new();

        self.astar
            .initialize(&self.task, &self.heuristic, &mut self.space, &mut self.stats)?;

        // Forward search until the first solution.
        let goal = loop {
            if timer.is_expired() {
                return Ok(self.finish(emitted, TerminationStatus::Timeout));
            }
            match self.astar.step(
                &self.task,
                &self.heuristic,
                &mut self.space,
                &mut self.saps,
                &mut self.stats,
            )? {
                StepStatus::Solved => break self.goal_state()?,
                StepStatus::Exhausted => {
                    return Ok(self.finish(emitted, TerminationStatus::Unsolvable))
                }
                StepStatus::InProgress | StepStatus::Interrupted => {}
            }
        };
        let c_star = self.optimal_cost()?;

        // The optimal plan is the tree path to the goal.
        let first = reconstruct::tree_path_plan(&self.task, &self.space, goal)?;
        self.emit(&mut emitted, first, sink)?;

        // Action sequences of plans emitted before a path-graph rebuild;
        // consumed one credit per re-encounter during re-enumeration.
        let mut replay: HashMap<Vec<ActionId>, usize> = HashMap::new();
        let mut emitted_seqs: HashSet<Vec<ActionId>> =
            emitted.iter().map(|p| p.actions.clone()).collect();

        while emitted.len() < self.config.k {
            if timer.is_expired() {
                return Ok(self.finish(emitted, TerminationStatus::Timeout));
            }

            let dirty = self.space.take_dirty() | self.saps.take_dirty();
            if dirty || !self.pg.is_initialized() {
                if self.pg.is_initialized() {
                    self.stats.pg_restarts += 1;
                    #[cfg(feature = "tracing")]
                    tracing::debug!("tree changed; rebuilding path graph");
                }
                self.stats.heap_nodes += self.heaps.arena_len() as u64;
                self.heaps.invalidate();
                self.pg
                    .initialize(goal, &mut self.heaps, &self.space, &self.saps)?;
                replay.clear();
                for plan in &emitted {
                    *replay.entry(plan.actions.clone()).or_insert(0) += 1;
                }
            }

            let d = self.pg.frontier_detour();
            let f_u = self.astar.f_min(&self.space);

            let astar_matters = match (f_u, d) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(f_u), Some(d)) => c_star + d > f_u,
            };

            if astar_matters {
                self.astar.control.frontier_detour = d;
                loop {
                    if timer.is_expired() {
                        return Ok(self.finish(emitted, TerminationStatus::Timeout));
                    }
                    match self.astar.step(
                        &self.task,
                        &self.heuristic,
                        &mut self.space,
                        &mut self.saps,
                        &mut self.stats,
                    )? {
                        StepStatus::InProgress | StepStatus::Solved => {}
                        StepStatus::Interrupted | StepStatus::Exhausted => break,
                    }
                }
                continue;
            }

            // Path-graph side: commit the cheapest pending candidate.
            let Some(d) = d else {
                break;
            };
            // A simple plan visits at most every discovered state once,
            // so once the pending detour prices candidates above that
            // ceiling no simple plan is left to find.
            if self.config.simple_plans_only && f_u.is_none() {
                let ceiling =
                    (self.space.discovered() as Cost).saturating_sub(1) * self.max_action_cost;
                if c_star + d > ceiling {
                    break;
                }
            }
            let Some(node_idx) = self.pg.pop(&mut self.heaps, &self.space, &self.saps)? else {
                break;
            };
            self.stats.pg_pops += 1;
            let plan = reconstruct::extract_plan(
                &self.task,
                &self.space,
                &self.saps,
                &self.pg,
                node_idx,
                goal,
                c_star,
            )?;

            if let Some(credit) = replay.get_mut(&plan.actions) {
                *credit -= 1;
                if *credit == 0 {
                    replay.remove(&plan.actions);
                }
                continue;
            }
            if self.config.simple_plans_only && !plan.is_simple() {
                self.stats.plans_rejected += 1;
                continue;
            }
            if self.config.dedup_by_actions && emitted_seqs.contains(&plan.actions) {
                self.stats.plans_rejected += 1;
                continue;
            }
            emitted_seqs.insert(plan.actions.clone());
            self.emit(&mut emitted, plan, sink)?;
        }

        let status = if emitted.len() >= self.config.k {
            TerminationStatus::Complete
        } else {
            TerminationStatus::Exhausted
        };
        Ok(self.finish(emitted, status))
    }

    fn emit(
        &mut self,
        emitted: &mut Vec<Plan>,
        plan: Plan,
        sink: &mut dyn PlanSink,
    ) -> KStarResult<()> {
        if let Some(last) = emitted.last() {
            if plan.cost < last.cost {
                return Err(KStarError::InternalInvariant(format!(
                    "plan cost {} emitted after cost {}",
                    plan.cost, last.cost
                )));
            }
        }
        self.stats.plans_emitted += 1;
        if self.config.verbosity >= Verbosity::Verbose {
            eprintln!(
                "plan {} with cost {} ({} actions)",
                emitted.len() + 1,
                plan.cost,
                plan.len()
            );
        }
        #[cfg(feature = "tracing")]
        tracing::info!(index = emitted.len() + 1, cost = plan.cost, "plan emitted");
        sink.on_plan(emitted.len() + 1, &plan);
        emitted.push(plan);
        Ok(())
    }

    fn finish(&mut self, plans: Vec<Plan>, status: TerminationStatus) -> KStarOutcome {
        self.stats.heap_nodes += self.heaps.arena_len() as u64;
        self.stats.sidetracks = self.saps.len() as u64;
        if self.config.verbosity >= Verbosity::Normal {
            match status {
                TerminationStatus::Complete => {
                    eprintln!("enumeration complete: {} plan(s)", plans.len());
                }
                TerminationStatus::Exhausted => eprintln!(
                    "enumeration exhausted after {} of {} plan(s)",
                    plans.len(),
                    self.config.k
                ),
                TerminationStatus::Timeout => eprintln!(
                    "time limit reached after {} plan(s); last cost {:?}",
                    plans.len(),
                    plans.last().map(|p| p.cost)
                ),
                TerminationStatus::Unsolvable => eprintln!("task is unsolvable"),
            }
        }
        self.stats.report(self.config.verbosity);
        KStarOutcome {
            plans,
            status,
            stats: self.stats,
        }
    }

    fn goal_state(&self) -> KStarResult<StateId> {
        self.astar.goal_state.ok_or_else(|| {
            KStarError::InternalInvariant("solved without a recorded goal state".into())
        })
    }

    fn optimal_cost(&self) -> KStarResult<Cost> {
        self.astar.control.optimal_cost.ok_or_else(|| {
            KStarError::InternalInvariant("solved without a recorded solution cost".into())
        })
    }
}
