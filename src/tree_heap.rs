//! Persistent per-state sidetrack heaps.
//!
//! For a state `s`, the tree heap H_T(s) is a min-heap (keyed by detour
//! cost δ) over every sidetrack entering `s` or one of its tree
//! ancestors. H_T(s) is materialized lazily as the meld of
//! H_T(parent(s)) with a heap over the incoming sidetracks of `s`.
//!
//! Heaps are leftist and persistent: nodes live in an arena, are never
//! mutated after allocation, and `meld` allocates only the new spine.
//! Heaps for different states therefore share structure, which is what
//! keeps the total size proportional to the number of sidetracks times
//! a logarithmic factor. When the shortest-path tree changes, the whole
//! forest is dropped and rebuilt on demand.

use std::collections::HashMap;

use crate::error::KStarResult;
use crate::search_space::SearchSpace;
use crate::sidetrack::{SapId, SapStore};
use crate::task::{Cost, StateId};

/// Immutable node of a persistent leftist heap.
#[derive(Clone, Copy, Debug)]
pub struct HeapNode {
    pub sap: SapId,
    /// δ of the sidetrack at materialization time.
    pub delta: Cost,
    pub left: Option<usize>,
    pub right: Option<usize>,
    /// Leftist rank: length of the rightmost path to a missing child.
    rank: u32,
}

/// Arena of heap nodes plus the cache of materialized H_T roots.
#[derive(Debug, Default)]
pub struct TreeHeaps {
    nodes: Vec<HeapNode>,
    roots: HashMap<StateId, Option<usize>>,
}

impl TreeHeaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, idx: usize) -> &HeapNode {
        &self.nodes[idx]
    }

    /// Number of allocated heap nodes (for statistics).
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every materialized heap. Called whenever the tree or the
    /// sidetrack set changed; roots are rebuilt on next access.
    pub fn invalidate(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Root of H_T(`state`), materializing it (and any uncached
    /// ancestor heap) on first access. `None` means no sidetrack enters
    /// the tree path to `state`.
    pub fn root(
        &mut self,
        state: StateId,
        space: &SearchSpace,
        saps: &SapStore,
    ) -> KStarResult<Option<usize>> {
        if let Some(&cached) = self.roots.get(&state) {
            return Ok(cached);
        }

        // Climb to the nearest cached ancestor, then fold back down.
        let mut chain = Vec::new();
        let mut cur = state;
        let mut base = loop {
            if let Some(&cached) = self.roots.get(&cur) {
                break cached;
            }
            chain.push(cur);
            match space
                .node(cur)
                .and_then(|n| n.parent.map(|(parent, _)| parent))
            {
                Some(parent) => cur = parent,
                None => break None,
            }
        };

        for &st in chain.iter().rev() {
            let own = self.heapify_incoming(st, space, saps)?;
            base = self.meld(base, own);
            self.roots.insert(st, base);
        }
        Ok(base)
    }

    /// Build a heap over the sidetracks entering `state` alone.
    fn heapify_incoming(
        &mut self,
        state: StateId,
        space: &SearchSpace,
        saps: &SapStore,
    ) -> KStarResult<Option<usize>> {
        let mut entries: Vec<(Cost, SapId)> = Vec::new();
        for &id in saps.incoming(state) {
            entries.push((saps.delta(id, space)?, id));
        }
        // Fixed insertion order keeps the heap shape reproducible.
        entries.sort_unstable();
        let mut root = None;
        for (delta, sap) in entries {
            let single = Some(self.alloc(HeapNode {
                sap,
                delta,
                left: None,
                right: None,
                rank: 1,
            }));
            root = self.meld(root, single);
        }
        Ok(root)
    }

    /// Persistent leftist meld: the inputs are untouched, the merged
    /// spine is freshly allocated.
    fn meld(&mut self, a: Option<usize>, b: Option<usize>) -> Option<usize> {
        let (x, y) = match (a, b) {
            (None, other) | (other, None) => return other,
            (Some(x), Some(y)) => (x, y),
        };
        let (top, rest) = if self.key(x) <= self.key(y) {
            (x, y)
        } else {
            (y, x)
        };
        let HeapNode {
            sap,
            delta,
            left,
            right,
            ..
        } = self.nodes[top];
        let merged = self.meld(right, Some(rest));
        let (left, right) = if self.rank(left) >= self.rank(merged) {
            (left, merged)
        } else {
            (merged, left)
        };
        let rank = self.rank(right) + 1;
        Some(self.alloc(HeapNode {
            sap,
            delta,
            left,
            right,
            rank,
        }))
    }

    fn alloc(&mut self, node: HeapNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    #[inline]
    fn key(&self, idx: usize) -> (Cost, SapId) {
        let n = &self.nodes[idx];
        (n.delta, n.sap)
    }

    #[inline]
    fn rank(&self, idx: Option<usize>) -> u32 {
        idx.map_or(0, |i| self.nodes[i].rank)
    }
}
