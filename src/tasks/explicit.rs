//! Explicitly enumerated transition systems.
//!
//! States are `0..num_states`, actions are added one by one with a
//! name, source, target and cost. Handy for tests, demos and anything
//! small enough to write down.

use crate::task::{ActionId, Cost, SearchTask, StateId};

#[derive(Clone, Debug)]
struct ExplicitAction {
    name: String,
    source: StateId,
    target: StateId,
    cost: Cost,
}

/// A transition system given by explicit edge lists.
#[derive(Clone, Debug)]
pub struct ExplicitTask {
    num_states: usize,
    initial: StateId,
    goals: Vec<bool>,
    actions: Vec<ExplicitAction>,
    outgoing: Vec<Vec<ActionId>>,
}

impl ExplicitTask {
    /// A task over `num_states` states with no goals and no actions yet.
    pub fn new(num_states: usize, initial: StateId) -> Self {
        assert!(
            initial.index() < num_states,
            "initial state out of range"
        );
        Self {
            num_states,
            initial,
            goals: vec![false; num_states],
            actions: Vec::new(),
            outgoing: vec![Vec::new(); num_states],
        }
    }

    pub fn set_goal(&mut self, state: StateId) {
        self.goals[state.index()] = true;
    }

    /// Add an action `source -> target` with the given cost; returns its
    /// id. Insertion order fixes the relaxation order.
    pub fn add_action(
        &mut self,
        name: &str,
        source: StateId,
        target: StateId,
        cost: Cost,
    ) -> ActionId {
        assert!(source.index() < self.num_states, "source out of range");
        assert!(target.index() < self.num_states, "target out of range");
        let id = ActionId(self.actions.len() as u32);
        self.actions.push(ExplicitAction {
            name: name.to_string(),
            source,
            target,
            cost,
        });
        self.outgoing[source.index()].push(id);
        id
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }
}

impl SearchTask for ExplicitTask {
    fn initial_state(&self) -> StateId {
        self.initial
    }

    fn is_goal(&self, state: StateId) -> bool {
        self.goals[state.index()]
    }

    fn applicable_actions(&self, state: StateId) -> Vec<ActionId> {
        self.outgoing[state.index()].clone()
    }

    fn apply(&self, state: StateId, action: ActionId) -> StateId {
        let action = &self.actions[action.index()];
        debug_assert_eq!(action.source, state, "action applied in wrong state");
        action.target
    }

    fn action_cost(&self, action: ActionId) -> Cost {
        self.actions[action.index()].cost
    }

    fn action_name(&self, action: ActionId) -> &str {
        &self.actions[action.index()].name
    }

    fn num_actions(&self) -> usize {
        self.actions.len()
    }

    fn state_count_hint(&self) -> usize {
        self.num_states
    }
}
