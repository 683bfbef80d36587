//! Best-first search over the path graph.
//!
//! Vertices of the path graph are positions inside materialized tree
//! heaps; a queue entry carries the sidetrack at that position and the
//! accumulated detour cost g_pg of the deviation sequence leading to
//! it. Out of every vertex there are up to three edges:
//!
//! - two *heap-structural* edges to the children of the position, with
//!   weight δ(child) − δ(position) ≥ 0 (selecting a worse sidetrack for
//!   the same deviation point), and
//! - one *cross* edge to the top of H_T of the sidetrack's source
//!   state, with weight δ(top) (committing the sidetrack and opening
//!   the next deviation point behind it).
//!
//! The search enumerates path-graph *paths* in order of total weight:
//! every pop is one candidate plan of cost C* + g_pg and is never
//! re-expanded, but the same heap position may be referenced by many
//! entries; that is how plans looping through the same sidetrack are
//! produced. Entries are kept in an arena so the reconstructor can walk
//! the predecessor chain afterwards.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{KStarError, KStarResult};
use crate::search_space::SearchSpace;
use crate::sidetrack::{SapId, SapStore};
use crate::task::{Cost, StateId};
use crate::tree_heap::TreeHeaps;

/// One enumerated entry of the path graph.
#[derive(Clone, Copy, Debug)]
pub struct PathNode {
    pub sap: SapId,
    /// Position in the tree-heap arena this entry sits at.
    pub heap_idx: usize,
    /// Accumulated detour cost of the deviation sequence.
    pub g: Cost,
    /// Predecessor entry, `None` for entries seeded from the root.
    pub parent: Option<usize>,
    /// Whether the edge into this entry was a cross edge. Entries
    /// seeded from the root count as cross: they commit a deviation.
    pub via_cross: bool,
}

/// The path-graph search state: entry arena plus the frontier.
#[derive(Debug, Default)]
pub struct PathGraphSearch {
    nodes: Vec<PathNode>,
    queue: BinaryHeap<Reverse<(Cost, usize)>>,
    initialized: bool,
}

impl PathGraphSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn node(&self, idx: usize) -> &PathNode {
        &self.nodes[idx]
    }

    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Forget all entries and the frontier. Used when the underlying
    /// tree or sidetrack set changed and the enumeration restarts.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.queue.clear();
        self.initialized = false;
    }

    /// Seed the frontier with the top of H_T(goal): the cheapest single
    /// deviation from the optimal plan. An empty H_T(goal) leaves the
    /// frontier empty: the optimal plan is the only one.
    pub fn initialize(
        &mut self,
        goal: StateId,
        heaps: &mut TreeHeaps,
        space: &SearchSpace,
        saps: &SapStore,
    ) -> KStarResult<()> {
        self.reset();
        if let Some(top) = heaps.root(goal, space, saps)? {
            let node = heaps.node(top);
            self.push(PathNode {
                sap: node.sap,
                heap_idx: top,
                g: node.delta,
                parent: None,
                via_cross: true,
            });
        }
        self.initialized = true;
        Ok(())
    }

    /// d: the smallest detour cost pending in the frontier.
    pub fn frontier_detour(&self) -> Option<Cost> {
        self.queue.peek().map(|Reverse((g, _))| *g)
    }

    /// Pop the cheapest pending entry and push its successors. Returns
    /// the arena index of the popped entry, which represents one
    /// candidate plan of cost C* + g.
    pub fn pop(
        &mut self,
        heaps: &mut TreeHeaps,
        space: &SearchSpace,
        saps: &SapStore,
    ) -> KStarResult<Option<usize>> {
        let Some(Reverse((_, idx))) = self.queue.pop() else {
            return Ok(None);
        };
        let current = self.nodes[idx];
        let current_delta = heaps.node(current.heap_idx).delta;

        // Heap-structural successors: siblings-in-waiting at the same
        // deviation point.
        let heap_node = *heaps.node(current.heap_idx);
        for child in [heap_node.left, heap_node.right].into_iter().flatten() {
            let child_node = heaps.node(child);
            let weight = child_node.delta - current_delta;
            if weight < 0 {
                return Err(KStarError::InternalInvariant(format!(
                    "heap order violated: child delta {} below parent delta {}",
                    child_node.delta, current_delta
                )));
            }
            self.push(PathNode {
                sap: child_node.sap,
                heap_idx: child,
                g: current.g + weight,
                parent: Some(idx),
                via_cross: false,
            });
        }

        // Cross successor: commit this sidetrack and continue from its
        // source state's own best deviation.
        let from = saps.sap(current.sap).from;
        if let Some(top) = heaps.root(from, space, saps)? {
            let top_node = heaps.node(top);
            self.push(PathNode {
                sap: top_node.sap,
                heap_idx: top,
                g: current.g + top_node.delta,
                parent: Some(idx),
                via_cross: true,
            });
        }

        Ok(Some(idx))
    }

    fn push(&mut self, node: PathNode) {
        let id = self.nodes.len();
        let key = node.g;
        self.nodes.push(node);
        self.queue.push(Reverse((key, id)));
    }
}
