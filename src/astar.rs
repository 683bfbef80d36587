//! Forward A* driver with interrupt and resume.
//!
//! The driver is an explicit state machine: every [`AstarDriver::step`]
//! pops one open node, closes it, relaxes its successors and returns a
//! definite status. No partial expansion state survives between calls,
//! which is what lets the orchestrator interleave the forward search
//! with the path-graph search.
//!
//! Interruption is governed by [`SearchControl`]: once a first solution
//! of cost C* is known and the path-graph frontier sits at detour d,
//! the forward search yields as soon as `C* + d <= f_u`, where `f_u` is
//! the smallest f-value still open. Under an admissible heuristic no
//! open node can then lead to a plan cheaper than `C* + d`, so the
//! path-graph side may commit its next candidate.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::KStarResult;
use crate::search_space::{NodeStatus, SearchSpace};
use crate::sidetrack::SapStore;
use crate::stats::Statistics;
use crate::task::{Cost, Heuristic, SearchTask, StateId};

/// Outcome of one forward-search step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    InProgress,
    /// A goal state was closed for the first time.
    Solved,
    /// The interrupt gate fired; no node was popped.
    Interrupted,
    /// The open list is empty.
    Exhausted,
}

/// Shared knobs between the orchestrator and the forward search.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchControl {
    /// Force an interrupt before the next pop.
    pub interrupt_immediately: bool,
    /// C*, the cost of the first solution, once known.
    pub optimal_cost: Option<Cost>,
    /// d, the smallest detour cost pending in the path-graph frontier.
    pub frontier_detour: Option<Cost>,
}

impl SearchControl {
    /// The canonical interrupt gate: `C* + d <= f_u`.
    pub fn should_interrupt(&self, f_min: Option<Cost>) -> bool {
        if self.interrupt_immediately {
            return true;
        }
        match (self.optimal_cost, self.frontier_detour, f_min) {
            (Some(c_star), Some(d), Some(f_u)) => c_star + d <= f_u,
            _ => false,
        }
    }
}

/// Entry of the open list. Ordered by `(f, h, seq)`: ties on f prefer
/// smaller h (deeper nodes), then insertion order. The fixed order makes
/// emission sequences reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: Cost,
    h: Cost,
    seq: u64,
    state: StateId,
}

/// Binary-heap open list with lazy removal: superseded entries stay in
/// the heap and are skipped when popped, by comparing against the
/// current node record.
#[derive(Debug, Default)]
struct OpenList {
    heap: BinaryHeap<Reverse<OpenEntry>>,
    seq: u64,
}

impl OpenList {
    fn insert(&mut self, state: StateId, f: Cost, h: Cost) {
        self.heap.push(Reverse(OpenEntry {
            f,
            h,
            seq: self.seq,
            state,
        }));
        self.seq += 1;
    }

    fn entry_is_current(entry: &OpenEntry, space: &SearchSpace) -> bool {
        match space.node(entry.state) {
            Some(node) => node.status == NodeStatus::Open && node.f() == entry.f,
            None => false,
        }
    }

    fn pop_min(&mut self, space: &SearchSpace) -> Option<StateId> {
        while let Some(Reverse(entry)) = self.heap.pop() {
            if Self::entry_is_current(&entry, space) {
                return Some(entry.state);
            }
        }
        None
    }

    /// Smallest current f-value, pruning stale entries off the top.
    fn min_key(&mut self, space: &SearchSpace) -> Option<Cost> {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if Self::entry_is_current(entry, space) {
                return Some(entry.f);
            }
            self.heap.pop();
        }
        None
    }
}

/// The forward search. Owns the open list and the search control; the
/// tree store and sidetrack store are passed in by the orchestrator.
#[derive(Debug, Default)]
pub struct AstarDriver {
    open: OpenList,
    pub control: SearchControl,
    reopen_closed: bool,
    /// First goal state closed, if any.
    pub goal_state: Option<StateId>,
}

impl AstarDriver {
    pub fn new(reopen_closed: bool) -> Self {
        Self {
            reopen_closed,
            ..Self::default()
        }
    }

    /// Evaluate and open the initial state.
    pub fn initialize<T: SearchTask, H: Heuristic<T>>(
        &mut self,
        task: &T,
        heuristic: &H,
        space: &mut SearchSpace,
        stats: &mut Statistics,
    ) -> KStarResult<()> {
        let init = task.initial_state();
        stats.evaluations += 1;
        match heuristic.estimate(task, init) {
            Some(h) => {
                space.open_new(init, 0, h, None);
                self.open.insert(init, h, h);
            }
            None => space.mark_dead_end(init),
        }
        Ok(())
    }

    /// Current f_u, the smallest f-value in the open list.
    pub fn f_min(&mut self, space: &SearchSpace) -> Option<Cost> {
        self.open.min_key(space)
    }

    /// One atomic unit of forward search: check the interrupt gate, pop
    /// the best open node, close it, relax its successors.
    pub fn step<T: SearchTask, H: Heuristic<T>>(
        &mut self,
        task: &T,
        heuristic: &H,
        space: &mut SearchSpace,
        saps: &mut SapStore,
        stats: &mut Statistics,
    ) -> KStarResult<StepStatus> {
        let f_min = self.open.min_key(space);
        if self.control.should_interrupt(f_min) {
            return Ok(StepStatus::Interrupted);
        }
        let Some(state) = self.open.pop_min(space) else {
            return Ok(StepStatus::Exhausted);
        };
        space.close(state);
        stats.expansions += 1;

        let mut solved = false;
        if self.goal_state.is_none() && task.is_goal(state) {
            self.goal_state = Some(state);
            self.control.optimal_cost = Some(space.g(state)?);
            solved = true;
            #[cfg(feature = "tracing")]
            tracing::info!(
                goal = state.0,
                cost = self.control.optimal_cost.unwrap_or(0),
                "first solution"
            );
        }

        let g_state = space.g(state)?;
        for action in task.applicable_actions(state) {
            let succ = task.apply(state, action);
            let cost = task.action_cost(action);
            let g_new = g_state + cost;
            stats.generated += 1;

            match space.status(succ) {
                NodeStatus::New => {
                    stats.evaluations += 1;
                    match heuristic.estimate(task, succ) {
                        Some(h) => {
                            space.open_new(succ, g_new, h, Some((state, action)));
                            self.open.insert(succ, g_new + h, h);
                        }
                        None => space.mark_dead_end(succ),
                    }
                }
                NodeStatus::DeadEnd => {}
                status @ (NodeStatus::Open | NodeStatus::Closed) => {
                    let (g_old, h_succ, old_edge) = {
                        let node = space.node(succ).expect("relaxed state must be recorded");
                        (node.g, node.h, node.parent)
                    };
                    if g_new < g_old {
                        // The displaced tree edge becomes a sidetrack;
                        // the improving edge stops being one.
                        if let Some((old_parent, old_action)) = old_edge {
                            saps.insert(old_parent, old_action, succ, task.action_cost(old_action));
                        }
                        saps.remove(state, action, succ);
                        space.reparent(succ, g_new, (state, action));
                        if status == NodeStatus::Closed {
                            if self.reopen_closed {
                                space.reopen(succ);
                                self.open.insert(succ, g_new + h_succ, h_succ);
                                stats.reopened += 1;
                            }
                            // Without reopening the state keeps its
                            // better g and parent but is not re-expanded.
                        } else {
                            self.open.insert(succ, g_new + h_succ, h_succ);
                        }
                    } else {
                        let is_tree_edge = g_new == g_old && old_edge == Some((state, action));
                        if !is_tree_edge {
                            saps.insert(state, action, succ, cost);
                        }
                    }
                }
            }
        }

        if solved {
            Ok(StepStatus::Solved)
        } else {
            Ok(StepStatus::InProgress)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ActionId, BlindHeuristic};
    use crate::tasks::explicit::ExplicitTask;

    /// Per-state estimates from a table. Deliberately allows
    /// inconsistent values so tests can force a state to close before a
    /// cheaper path to it is found.
    struct TableHeuristic {
        values: Vec<Cost>,
    }

    impl Heuristic<ExplicitTask> for TableHeuristic {
        fn estimate(&self, _task: &ExplicitTask, state: StateId) -> Option<Cost> {
            Some(self.values[state.index()])
        }
    }

    fn run_until_solved(
        task: &ExplicitTask,
        driver: &mut AstarDriver,
        space: &mut SearchSpace,
        saps: &mut SapStore,
        stats: &mut Statistics,
    ) -> StepStatus {
        driver
            .initialize(task, &BlindHeuristic, space, stats)
            .unwrap();
        loop {
            match driver
                .step(task, &BlindHeuristic, space, saps, stats)
                .unwrap()
            {
                StepStatus::InProgress => continue,
                other => return other,
            }
        }
    }

    #[test]
    fn finds_cheapest_path_and_records_sidetracks() {
        // 0 -a(1)-> 1 and 0 -b(2)-> 1, goal 1.
        let mut task = ExplicitTask::new(2, StateId(0));
        task.set_goal(StateId(1));
        let a = task.add_action("a", StateId(0), StateId(1), 1);
        let b = task.add_action("b", StateId(0), StateId(1), 2);
        let mut driver = AstarDriver::new(true);
        let mut space = SearchSpace::with_capacity(2);
        let mut saps = SapStore::new();
        let mut stats = Statistics::default();

        let status = run_until_solved(&task, &mut driver, &mut space, &mut saps, &mut stats);
        assert_eq!(status, StepStatus::Solved);
        assert_eq!(driver.control.optimal_cost, Some(1));
        assert_eq!(space.node(StateId(1)).unwrap().parent, Some((StateId(0), a)));
        // The parallel edge is a sidetrack with delta 1.
        let incoming = saps.incoming(StateId(1));
        assert_eq!(incoming.len(), 1);
        assert_eq!(saps.sap(incoming[0]).action, b);
        assert_eq!(saps.delta(incoming[0], &space).unwrap(), 1);
    }

    #[test]
    fn open_node_is_reparented_and_old_edge_demoted() {
        // 0 -a(5)-> 1, 0 -b(1)-> 2, 2 -c(1)-> 1; goal 1.
        let mut task = ExplicitTask::new(3, StateId(0));
        task.set_goal(StateId(1));
        let a = task.add_action("a", StateId(0), StateId(1), 5);
        let _b = task.add_action("b", StateId(0), StateId(2), 1);
        let c = task.add_action("c", StateId(2), StateId(1), 1);
        let mut driver = AstarDriver::new(true);
        let mut space = SearchSpace::with_capacity(3);
        let mut saps = SapStore::new();
        let mut stats = Statistics::default();

        let status = run_until_solved(&task, &mut driver, &mut space, &mut saps, &mut stats);
        assert_eq!(status, StepStatus::Solved);
        assert_eq!(driver.control.optimal_cost, Some(2));
        assert_eq!(space.node(StateId(1)).unwrap().parent, Some((StateId(2), c)));
        // The displaced edge a is now a sidetrack with delta 5 + 0 - 2.
        let incoming = saps.incoming(StateId(1));
        assert_eq!(incoming.len(), 1);
        assert_eq!(saps.sap(incoming[0]).action, a);
        assert_eq!(saps.delta(incoming[0], &space).unwrap(), 3);
    }

    #[test]
    fn interrupt_gate_blocks_pop() {
        let mut task = ExplicitTask::new(2, StateId(0));
        task.set_goal(StateId(1));
        task.add_action("a", StateId(0), StateId(1), 1);
        let mut driver = AstarDriver::new(true);
        let mut space = SearchSpace::with_capacity(2);
        let mut saps = SapStore::new();
        let mut stats = Statistics::default();
        driver
            .initialize(&task, &BlindHeuristic, &mut space, &mut stats)
            .unwrap();
        driver.control.optimal_cost = Some(0);
        driver.control.frontier_detour = Some(0);
        // C* + d = 0 <= f_u = 0, so the driver must yield untouched.
        let status = driver
            .step(&task, &BlindHeuristic, &mut space, &mut saps, &mut stats)
            .unwrap();
        assert_eq!(status, StepStatus::Interrupted);
        assert_eq!(stats.expansions, 0);
        // Clearing d resumes normally.
        driver.control.frontier_detour = None;
        let status = driver
            .step(&task, &BlindHeuristic, &mut space, &mut saps, &mut stats)
            .unwrap();
        assert_eq!(status, StepStatus::InProgress);
    }

    /// 0 -a(5)-> 1, 0 -b(1)-> 2, 2 -c(1)-> 1, goal 3 unreachable. The
    /// inflated estimate on state 2 delays it past state 1, so state 1
    /// closes at g=5 before the cheaper route through 2 is relaxed.
    fn inconsistent_fixture() -> (ExplicitTask, TableHeuristic) {
        let mut task = ExplicitTask::new(4, StateId(0));
        task.set_goal(StateId(3));
        task.add_action("a", StateId(0), StateId(1), 5);
        task.add_action("b", StateId(0), StateId(2), 1);
        task.add_action("c", StateId(2), StateId(1), 1);
        let heuristic = TableHeuristic {
            values: vec![0, 0, 10, 0],
        };
        (task, heuristic)
    }

    fn run_to_exhaustion(
        task: &ExplicitTask,
        heuristic: &TableHeuristic,
        driver: &mut AstarDriver,
        space: &mut SearchSpace,
        saps: &mut SapStore,
        stats: &mut Statistics,
    ) {
        driver.initialize(task, heuristic, space, stats).unwrap();
        loop {
            match driver.step(task, heuristic, space, saps, stats).unwrap() {
                StepStatus::InProgress => {}
                status => {
                    assert_eq!(status, StepStatus::Exhausted);
                    return;
                }
            }
        }
    }

    #[test]
    fn improved_closed_state_stays_closed_without_reopening() {
        let (task, heuristic) = inconsistent_fixture();
        let mut driver = AstarDriver::new(false);
        let mut space = SearchSpace::with_capacity(4);
        let mut saps = SapStore::new();
        let mut stats = Statistics::default();
        run_to_exhaustion(
            &task, &heuristic, &mut driver, &mut space, &mut saps, &mut stats,
        );

        // State 1 adopted the cheaper parent but was not re-expanded.
        let node = space.node(StateId(1)).unwrap();
        assert_eq!(node.status, NodeStatus::Closed);
        assert_eq!(node.g, 2);
        assert_eq!(node.parent, Some((StateId(2), ActionId(2))));
        assert_eq!(stats.reopened, 0);
        assert_eq!(stats.expansions, 3);
        // The displaced edge a became a sidetrack with delta 5 + 0 - 2.
        let incoming = saps.incoming(StateId(1));
        assert_eq!(incoming.len(), 1);
        assert_eq!(saps.sap(incoming[0]).action, ActionId(0));
        assert_eq!(saps.delta(incoming[0], &space).unwrap(), 3);
    }

    #[test]
    fn improved_closed_state_is_reopened_when_allowed() {
        let (task, heuristic) = inconsistent_fixture();
        let mut driver = AstarDriver::new(true);
        let mut space = SearchSpace::with_capacity(4);
        let mut saps = SapStore::new();
        let mut stats = Statistics::default();
        run_to_exhaustion(
            &task, &heuristic, &mut driver, &mut space, &mut saps, &mut stats,
        );

        assert_eq!(stats.reopened, 1);
        // State 1 was expanded twice: once at g=5, once after reopening.
        assert_eq!(stats.expansions, 4);
        let node = space.node(StateId(1)).unwrap();
        assert_eq!(node.status, NodeStatus::Closed);
        assert_eq!(node.g, 2);
        assert_eq!(saps.delta(saps.incoming(StateId(1))[0], &space).unwrap(), 3);
    }

    #[test]
    fn exhausts_on_unreachable_goal() {
        let mut task = ExplicitTask::new(2, StateId(0));
        task.set_goal(StateId(1));
        let _ = task.add_action("loop", StateId(0), StateId(0), 1);
        let mut driver = AstarDriver::new(true);
        let mut space = SearchSpace::with_capacity(2);
        let mut saps = SapStore::new();
        let mut stats = Statistics::default();
        let status = run_until_solved(&task, &mut driver, &mut space, &mut saps, &mut stats);
        assert_eq!(status, StepStatus::Exhausted);
        assert_eq!(driver.goal_state, None);
    }

    #[test]
    fn tie_break_prefers_earlier_insertion() {
        let first = OpenEntry {
            f: 3,
            h: 1,
            seq: 0,
            state: StateId(5),
        };
        let second = OpenEntry {
            f: 3,
            h: 1,
            seq: 1,
            state: StateId(2),
        };
        assert!(first < second);
    }
}
