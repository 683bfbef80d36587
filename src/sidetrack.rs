//! State–action pairs (sidetracks) and per-state incoming lists.
//!
//! Every relaxed edge that is not the tree edge of its target becomes a
//! sidetrack candidate: a `(from, action, to)` triple whose detour cost
//! δ = cost(action) + g(from) − g(to) measures how much worse taking the
//! edge is than staying on the tree. δ is computed on demand from the
//! current g-values, so a later re-parenting of either endpoint is
//! reflected automatically the next time the heaps are materialized.

use crate::error::{KStarError, KStarResult};
use crate::search_space::SearchSpace;
use crate::task::{ActionId, Cost, StateId};

/// Dense identifier of a sidetrack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SapId(pub u32);

impl SapId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A sidetrack edge. The action cost is recorded at creation time so δ
/// can be derived without consulting the task again.
#[derive(Clone, Copy, Debug)]
pub struct Sap {
    pub from: StateId,
    pub action: ActionId,
    pub to: StateId,
    pub cost: Cost,
}

/// Flat store of sidetracks plus one incoming list per state.
#[derive(Debug, Default)]
pub struct SapStore {
    saps: Vec<Sap>,
    incoming: Vec<Vec<SapId>>,
    dirty: bool,
}

impl SapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.saps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saps.is_empty()
    }

    pub fn sap(&self, id: SapId) -> &Sap {
        &self.saps[id.index()]
    }

    /// Sidetracks entering `state`.
    pub fn incoming(&self, state: StateId) -> &[SapId] {
        self.incoming
            .get(state.index())
            .map_or(&[], |list| list.as_slice())
    }

    /// Record the sidetrack `(from, action, to)`. Duplicate edges (same
    /// source and action) are ignored; re-relaxation after a reopening
    /// would otherwise register the same edge twice. Returns whether a
    /// new entry was created.
    pub fn insert(&mut self, from: StateId, action: ActionId, to: StateId, cost: Cost) -> bool {
        let idx = to.index();
        if idx >= self.incoming.len() {
            self.incoming.resize_with(idx + 1, Vec::new);
        }
        let exists = self.incoming[idx].iter().any(|&id| {
            let sap = &self.saps[id.index()];
            sap.from == from && sap.action == action
        });
        if exists {
            return false;
        }
        let id = SapId(self.saps.len() as u32);
        self.saps.push(Sap {
            from,
            action,
            to,
            cost,
        });
        self.incoming[idx].push(id);
        self.dirty = true;
        true
    }

    /// Drop the entry for `(from, action)` from the incoming list of
    /// `to`, if present. Used when a recorded sidetrack is promoted to
    /// the tree edge of its target.
    pub fn remove(&mut self, from: StateId, action: ActionId, to: StateId) {
        if let Some(list) = self.incoming.get_mut(to.index()) {
            if let Some(pos) = list.iter().position(|&id| {
                let sap = &self.saps[id.index()];
                sap.from == from && sap.action == action
            }) {
                list.swap_remove(pos);
                self.dirty = true;
            }
        }
    }

    /// Detour cost of `id` under the current g-values. Fails on a
    /// negative result, which would mean the tree invariant is broken.
    pub fn delta(&self, id: SapId, space: &SearchSpace) -> KStarResult<Cost> {
        let sap = &self.saps[id.index()];
        let delta = sap.cost + space.g(sap.from)? - space.g(sap.to)?;
        if delta < 0 {
            return Err(KStarError::InternalInvariant(format!(
                "negative detour cost {} on sidetrack {}",
                delta, id.0
            )));
        }
        Ok(delta)
    }

    /// Whether any sidetrack was added or removed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(id: u32) -> StateId {
        StateId(id)
    }
    fn a(id: u32) -> ActionId {
        ActionId(id)
    }

    #[test]
    fn insert_deduplicates_by_source_and_action() {
        let mut saps = SapStore::new();
        assert!(saps.insert(s(0), a(0), s(1), 2));
        assert!(!saps.insert(s(0), a(0), s(1), 2));
        assert!(saps.insert(s(0), a(1), s(1), 3));
        assert_eq!(saps.incoming(s(1)).len(), 2);
        assert!(saps.incoming(s(0)).is_empty());
    }

    #[test]
    fn remove_drops_promoted_tree_edge() {
        let mut saps = SapStore::new();
        saps.insert(s(0), a(0), s(1), 2);
        saps.insert(s(2), a(1), s(1), 1);
        saps.remove(s(0), a(0), s(1));
        let remaining = saps.incoming(s(1));
        assert_eq!(remaining.len(), 1);
        assert_eq!(saps.sap(remaining[0]).from, s(2));
    }

    #[test]
    fn delta_from_current_g_values() {
        let mut space = SearchSpace::with_capacity(2);
        space.open_new(s(0), 0, 0, None);
        space.open_new(s(1), 1, 0, Some((s(0), a(9))));
        let mut saps = SapStore::new();
        saps.insert(s(0), a(0), s(1), 3);
        let id = saps.incoming(s(1))[0];
        assert_eq!(saps.delta(id, &space).unwrap(), 2);
        // A cheaper path to s1 raises the detour cost of the sidetrack.
        space.reparent(s(1), 0, (s(0), a(8)));
        assert_eq!(saps.delta(id, &space).unwrap(), 3);
    }

    #[test]
    fn negative_delta_is_an_invariant_violation() {
        let mut space = SearchSpace::with_capacity(2);
        space.open_new(s(0), 0, 0, None);
        space.open_new(s(1), 5, 0, Some((s(0), a(9))));
        let mut saps = SapStore::new();
        saps.insert(s(0), a(0), s(1), 1);
        let id = saps.incoming(s(1))[0];
        assert!(saps.delta(id, &space).is_err());
    }

    #[test]
    fn dirty_tracks_mutations() {
        let mut saps = SapStore::new();
        assert!(!saps.take_dirty());
        saps.insert(s(0), a(0), s(1), 1);
        assert!(saps.take_dirty());
        saps.remove(s(0), a(0), s(1));
        assert!(saps.take_dirty());
        assert!(!saps.take_dirty());
    }
}
