//! Plan reconstruction from path-graph entries.
//!
//! A popped path-graph entry encodes a deviation sequence: walking its
//! predecessor chain back to the root yields the committed sidetracks.
//! The committed set is the entry's own sidetrack plus the sidetrack of
//! every predecessor that was left through a cross edge; heap-structural
//! steps merely swap which sidetrack is pending at the same deviation
//! point and commit nothing.
//!
//! Materialization then stitches tree segments and sidetracks together:
//! from the initial state, walk the tree down to the source of the
//! first committed sidetrack, take it, walk the tree onward from its
//! target, and so on until the last sidetrack's target, from which the
//! tree leads to the goal. The path-graph construction guarantees that
//! every such tree segment exists; a missing segment is a bug.

use crate::error::{KStarError, KStarResult};
use crate::pathgraph::PathGraphSearch;
use crate::plan::Plan;
use crate::search_space::SearchSpace;
use crate::sidetrack::{SapId, SapStore};
use crate::task::{Cost, SearchTask, StateId};

/// The optimal plan: the tree path from the initial state to `goal`.
pub fn tree_path_plan<T: SearchTask>(
    task: &T,
    space: &SearchSpace,
    goal: StateId,
) -> KStarResult<Plan> {
    let (actions, states) = space.path_from_root(goal)?;
    let cost = actions.iter().map(|&a| task.action_cost(a)).sum();
    if cost != space.g(goal)? {
        return Err(KStarError::InternalInvariant(format!(
            "tree path to goal {} costs {} but g is {}",
            goal.0,
            cost,
            space.g(goal)?
        )));
    }
    Ok(Plan {
        actions,
        states,
        cost,
    })
}

/// Reconstruct the plan encoded by the path-graph entry `node_idx`.
pub fn extract_plan<T: SearchTask>(
    task: &T,
    space: &SearchSpace,
    saps: &SapStore,
    pg: &PathGraphSearch,
    node_idx: usize,
    goal: StateId,
    c_star: Cost,
) -> KStarResult<Plan> {
    let deviations = committed_sidetracks(pg, node_idx);

    let mut actions = Vec::new();
    let mut states = vec![task.initial_state()];
    let mut cursor = task.initial_state();
    for &sap_id in &deviations {
        let sap = saps.sap(sap_id);
        for (action, state) in space.walk_down(cursor, sap.from)? {
            actions.push(action);
            states.push(state);
        }
        actions.push(sap.action);
        states.push(sap.to);
        cursor = sap.to;
    }
    for (action, state) in space.walk_down(cursor, goal)? {
        actions.push(action);
        states.push(state);
    }

    let cost: Cost = actions.iter().map(|&a| task.action_cost(a)).sum();
    let expected = c_star + pg.node(node_idx).g;
    if cost != expected {
        return Err(KStarError::InternalInvariant(format!(
            "reconstructed plan costs {} but the path graph priced it {}",
            cost, expected
        )));
    }
    Ok(Plan {
        actions,
        states,
        cost,
    })
}

/// Committed sidetracks of the entry, ordered from the initial-state
/// side toward the goal side (the order in which a plan executes them).
fn committed_sidetracks(pg: &PathGraphSearch, node_idx: usize) -> Vec<SapId> {
    let mut deviations = vec![pg.node(node_idx).sap];
    let mut cur = node_idx;
    while let Some(parent) = pg.node(cur).parent {
        if pg.node(cur).via_cross {
            deviations.push(pg.node(parent).sap);
        }
        cur = parent;
    }
    deviations
}
