//! Consumed interfaces: planning tasks and heuristic evaluators.
//!
//! To enumerate plans for your own transition system, implement
//! [`SearchTask`] for a struct that captures your instance (states,
//! actions, costs) and optionally [`Heuristic`] for a goal-distance
//! estimator. The engine only ever sees dense integer identifiers; the
//! task owns whatever registry maps real states onto them.
//!
//! The contract mirrors a classical deterministic planning task:
//! - states are reachable from `initial_state` via `apply`,
//! - `apply` is deterministic,
//! - action costs are non-negative integers,
//! - `applicable_actions` returns actions in a fixed order for a given
//!   state (this order is part of the engine's reproducibility
//!   guarantee).

/// Integer cost type used for g-values, f-values and detour costs.
pub type Cost = i64;

/// Dense identifier of a state. Assigned by the task; stable for the
/// lifetime of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense identifier of a ground action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub u32);

impl ActionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A deterministic transition system with non-negative action costs.
///
/// # Contract
/// - `apply(s, a)` must be defined for every `a` in
///   `applicable_actions(s)` and must be deterministic.
/// - `action_cost(a) >= 0` for every action; the engine validates this
///   once at startup and refuses the task otherwise.
/// - `applicable_actions` must return the same sequence for the same
///   state across calls within one run.
pub trait SearchTask {
    /// The initial state of the task.
    fn initial_state(&self) -> StateId;

    /// Whether `state` satisfies the goal condition.
    fn is_goal(&self, state: StateId) -> bool;

    /// Actions applicable in `state`, in a fixed deterministic order.
    fn applicable_actions(&self, state: StateId) -> Vec<ActionId>;

    /// The successor of `state` under `action`.
    fn apply(&self, state: StateId, action: ActionId) -> StateId;

    /// Cost of `action`; must be non-negative.
    fn action_cost(&self, action: ActionId) -> Cost;

    /// Human-readable name of `action`, used in plan output.
    fn action_name(&self, action: ActionId) -> &str;

    /// Total number of ground actions (for startup validation).
    fn num_actions(&self) -> usize;

    /// Optional capacity hint for per-state bookkeeping.
    fn state_count_hint(&self) -> usize {
        0
    }
}

/// Goal-distance estimator for a task.
///
/// `estimate` returns `None` for dead ends (h = ∞). A sound top-k
/// enumeration requires an admissible estimate; the engine does not
/// verify admissibility at runtime.
pub trait Heuristic<T: SearchTask + ?Sized> {
    /// Estimated remaining cost from `state`, or `None` if `state` is a
    /// dead end.
    fn estimate(&self, task: &T, state: StateId) -> Option<Cost>;

    /// Whether `state` cannot reach a goal.
    fn is_dead_end(&self, task: &T, state: StateId) -> bool {
        self.estimate(task, state).is_none()
    }
}

/// The blind heuristic h ≡ 0. Turns the forward search into uniform-cost
/// search; always admissible.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlindHeuristic;

impl<T: SearchTask + ?Sized> Heuristic<T> for BlindHeuristic {
    #[inline]
    fn estimate(&self, _task: &T, _state: StateId) -> Option<Cost> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::explicit::ExplicitTask;

    #[test]
    fn blind_heuristic_is_zero_everywhere() {
        let mut task = ExplicitTask::new(2, StateId(0));
        task.set_goal(StateId(1));
        task.add_action("a", StateId(0), StateId(1), 1);
        assert_eq!(BlindHeuristic.estimate(&task, StateId(0)), Some(0));
        assert!(!BlindHeuristic.is_dead_end(&task, StateId(1)));
    }
}
