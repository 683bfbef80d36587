//! Shortest-path tree store.
//!
//! One record per discovered state: g-value, cached heuristic value,
//! tree parent (state and action) and lifecycle status. The parent
//! pointers of all non-dead-end states form the current shortest-path
//! tree rooted at the initial state; re-parenting on an improved g-value
//! mutates the tree and flags it dirty so that dependent path-graph
//! structures can be rebuilt.

use crate::error::{KStarError, KStarResult};
use crate::task::{ActionId, Cost, StateId};

/// Lifecycle of a state in the forward search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeStatus {
    New,
    Open,
    Closed,
    DeadEnd,
}

/// Per-state record of the forward search.
#[derive(Clone, Debug)]
pub struct SearchNode {
    pub status: NodeStatus,
    pub g: Cost,
    pub h: Cost,
    /// Tree edge into this state: (parent state, parent action). `None`
    /// at the root.
    pub parent: Option<(StateId, ActionId)>,
}

impl SearchNode {
    fn unseen() -> Self {
        Self {
            status: NodeStatus::New,
            g: Cost::MAX,
            h: 0,
            parent: None,
        }
    }

    #[inline]
    pub fn f(&self) -> Cost {
        self.g + self.h
    }
}

/// Flat store of [`SearchNode`] records indexed by state id.
#[derive(Debug)]
pub struct SearchSpace {
    nodes: Vec<SearchNode>,
    /// Set whenever the tree shape or a g-value changes; consumed by the
    /// orchestrator to invalidate derived heaps.
    dirty: bool,
    discovered: usize,
}

impl SearchSpace {
    pub fn with_capacity(hint: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(hint),
            dirty: false,
            discovered: 0,
        }
    }

    /// Number of states ever opened (dead ends excluded).
    pub fn discovered(&self) -> usize {
        self.discovered
    }

    fn ensure(&mut self, state: StateId) -> &mut SearchNode {
        let idx = state.index();
        if idx >= self.nodes.len() {
            self.nodes.resize(idx + 1, SearchNode::unseen());
        }
        &mut self.nodes[idx]
    }

    /// The record for `state`, if it was ever discovered.
    pub fn node(&self, state: StateId) -> Option<&SearchNode> {
        self.nodes.get(state.index())
    }

    pub fn status(&self, state: StateId) -> NodeStatus {
        self.node(state).map_or(NodeStatus::New, |n| n.status)
    }

    pub fn g(&self, state: StateId) -> KStarResult<Cost> {
        match self.node(state) {
            Some(n) if n.status != NodeStatus::New => Ok(n.g),
            _ => Err(KStarError::InternalInvariant(format!(
                "g-value requested for undiscovered state {}",
                state.0
            ))),
        }
    }

    /// Discover `state` with the given g/h and tree edge; opens it.
    pub fn open_new(
        &mut self,
        state: StateId,
        g: Cost,
        h: Cost,
        parent: Option<(StateId, ActionId)>,
    ) {
        let node = self.ensure(state);
        node.status = NodeStatus::Open;
        node.g = g;
        node.h = h;
        node.parent = parent;
        self.discovered += 1;
    }

    /// Re-parent `state` onto a cheaper tree edge. The caller is
    /// responsible for demoting the displaced edge to a sidetrack and
    /// for deciding whether a closed state is reopened.
    pub fn reparent(&mut self, state: StateId, g: Cost, parent: (StateId, ActionId)) {
        let node = self.ensure(state);
        debug_assert!(g < node.g, "reparent must improve g");
        node.g = g;
        node.parent = Some(parent);
        self.dirty = true;
    }

    pub fn reopen(&mut self, state: StateId) {
        self.ensure(state).status = NodeStatus::Open;
    }

    pub fn close(&mut self, state: StateId) {
        self.ensure(state).status = NodeStatus::Closed;
    }

    pub fn mark_dead_end(&mut self, state: StateId) {
        self.ensure(state).status = NodeStatus::DeadEnd;
    }

    /// Whether the tree changed since the last [`take_dirty`](Self::take_dirty).
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Tree path from the root to `state`: the actions along the parent
    /// chain in execution order, and every state visited including the
    /// root and `state` itself.
    pub fn path_from_root(&self, state: StateId) -> KStarResult<(Vec<ActionId>, Vec<StateId>)> {
        let mut actions = Vec::new();
        let mut states = vec![state];
        let mut cur = state;
        while let Some((parent, action)) = self.parent_edge(cur)? {
            actions.push(action);
            states.push(parent);
            cur = parent;
        }
        actions.reverse();
        states.reverse();
        Ok((actions, states))
    }

    /// Walk the tree downward from `ancestor` to `descendant`, returning
    /// `(action, state)` pairs in execution order; empty when the two
    /// coincide. Fails if `ancestor` is not on the parent chain of
    /// `descendant`.
    pub fn walk_down(
        &self,
        ancestor: StateId,
        descendant: StateId,
    ) -> KStarResult<Vec<(ActionId, StateId)>> {
        let mut segment = Vec::new();
        let mut cur = descendant;
        while cur != ancestor {
            match self.parent_edge(cur)? {
                Some((parent, action)) => {
                    segment.push((action, cur));
                    cur = parent;
                }
                None => {
                    return Err(KStarError::InternalInvariant(format!(
                        "state {} is not an ancestor of state {}",
                        ancestor.0, descendant.0
                    )))
                }
            }
        }
        segment.reverse();
        Ok(segment)
    }

    fn parent_edge(&self, state: StateId) -> KStarResult<Option<(StateId, ActionId)>> {
        match self.node(state) {
            Some(n) if n.status != NodeStatus::New => Ok(n.parent),
            _ => Err(KStarError::InternalInvariant(format!(
                "parent requested for undiscovered state {}",
                state.0
            ))),
        }
    }
}
