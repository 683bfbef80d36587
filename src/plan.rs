//! Plans, plan sinks and the persisted plan bundle.

use std::collections::HashSet;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::task::{ActionId, Cost, SearchTask, StateId};

/// An executable plan: the action sequence, every state it visits
/// (initial state included) and its total cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub actions: Vec<ActionId>,
    pub states: Vec<StateId>,
    pub cost: Cost,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// A plan is simple when it never visits a state twice.
    pub fn is_simple(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.states.len());
        self.states.iter().all(|state| seen.insert(*state))
    }
}

/// Receiver of accepted plans, invoked in emission order.
pub trait PlanSink {
    fn on_plan(&mut self, index: usize, plan: &Plan);
}

/// Sink that ignores everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl PlanSink for NullSink {
    fn on_plan(&mut self, _index: usize, _plan: &Plan) {}
}

/// Serialized form of one plan inside a bundle. Indices are 1-based;
/// costs are non-decreasing across a bundle.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanRecord {
    pub index: usize,
    pub cost: Cost,
    pub actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<u32>>,
}

/// Build the serializable records for `plans`, resolving action names
/// through the task.
pub fn plan_records<T: SearchTask>(
    task: &T,
    plans: &[Plan],
    include_states: bool,
) -> Vec<PlanRecord> {
    plans
        .iter()
        .enumerate()
        .map(|(i, plan)| PlanRecord {
            index: i + 1,
            cost: plan.cost,
            actions: plan
                .actions
                .iter()
                .map(|&a| task.action_name(a).to_string())
                .collect(),
            states: include_states.then(|| plan.states.iter().map(|s| s.0).collect()),
        })
        .collect()
}

/// Write the whole bundle as pretty-printed JSON, one record per plan.
pub fn write_plan_bundle<T: SearchTask, W: Write>(
    task: &T,
    plans: &[Plan],
    include_states: bool,
    writer: W,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &plan_records(task, plans, include_states))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::explicit::ExplicitTask;

    #[test]
    fn simplicity_detects_repeats() {
        let simple = Plan {
            actions: vec![ActionId(0)],
            states: vec![StateId(0), StateId(1)],
            cost: 1,
        };
        assert!(simple.is_simple());
        let looping = Plan {
            actions: vec![ActionId(0), ActionId(1)],
            states: vec![StateId(0), StateId(1), StateId(0)],
            cost: 2,
        };
        assert!(!looping.is_simple());
    }

    #[test]
    fn records_resolve_names_and_index_from_one() {
        let mut task = ExplicitTask::new(2, StateId(0));
        task.set_goal(StateId(1));
        let a = task.add_action("go", StateId(0), StateId(1), 3);
        let plan = Plan {
            actions: vec![a],
            states: vec![StateId(0), StateId(1)],
            cost: 3,
        };
        let records = plan_records(&task, &[plan], true);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, 1);
        assert_eq!(records[0].actions, vec!["go".to_string()]);
        assert_eq!(records[0].states, Some(vec![0, 1]));
    }

    #[test]
    fn bundle_omits_states_when_disabled() {
        let mut task = ExplicitTask::new(2, StateId(0));
        task.set_goal(StateId(1));
        let a = task.add_action("go", StateId(0), StateId(1), 3);
        let plan = Plan {
            actions: vec![a],
            states: vec![StateId(0), StateId(1)],
            cost: 3,
        };
        let mut buf = Vec::new();
        write_plan_bundle(&task, &[plan], false, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"go\""));
        assert!(!text.contains("\"states\""));
    }
}
