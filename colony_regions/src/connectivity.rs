// Region-graph reachability and its memo table.
//
// `regions_connected()` is a plain BFS over the region adjacency graph. Edges
// are stored directionally (stairs go up), but reachability treats them as
// undirected: a creature that can climb a stair can also come back down it.
//
// `ConnectivityCache` memoizes verdicts per unordered region pair. The
// invalidation policy lives in `RegionMap`, which knows what each mutation
// did to the graph:
// - splits, and any net loss of an edge, clear the whole cache, because a
//   cached `true` may no longer hold;
// - merges, and any new edge, only drop cached `false` verdicts. A cached
//   `true` stays valid when connectivity grows.

use crate::region::{Region, RegionId};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// BFS from `start` until `goal` is seen or the frontier runs dry.
///
/// IDs past the end of `regions` are treated as isolated.
pub(crate) fn regions_connected(regions: &[Region], start: RegionId, goal: RegionId) -> bool {
    if start == goal {
        return true;
    }
    if start.index() >= regions.len() || goal.index() >= regions.len() {
        return false;
    }

    let mut visited = vec![false; regions.len()];
    let mut queue = VecDeque::new();
    visited[start.index()] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in regions[current.index()].neighbors() {
            if next == goal {
                return true;
            }
            match visited.get_mut(next.index()) {
                Some(seen) if !*seen => {
                    *seen = true;
                    queue.push_back(next);
                }
                _ => {}
            }
        }
    }
    false
}

/// Memoized reachability verdicts keyed by `(min, max)` region pair.
#[derive(Clone, Debug, Default)]
pub(crate) struct ConnectivityCache {
    verdicts: FxHashMap<(RegionId, RegionId), bool>,
    capacity: Option<usize>,
}

impl ConnectivityCache {
    pub fn with_capacity_limit(capacity: Option<usize>) -> Self {
        Self {
            verdicts: FxHashMap::default(),
            capacity,
        }
    }

    pub fn key(a: RegionId, b: RegionId) -> (RegionId, RegionId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn get(&self, key: (RegionId, RegionId)) -> Option<bool> {
        self.verdicts.get(&key).copied()
    }

    pub fn insert(&mut self, key: (RegionId, RegionId), connected: bool) {
        if self.capacity.is_some_and(|cap| self.verdicts.len() >= cap) {
            tracing::trace!(entries = self.verdicts.len(), "connectivity cache full, clearing");
            self.verdicts.clear();
        }
        self.verdicts.insert(key, connected);
    }

    pub fn clear(&mut self) {
        self.verdicts.clear();
    }

    /// Drop every cached `false`, keep every cached `true`.
    pub fn forget_disconnections(&mut self) {
        self.verdicts.retain(|_, connected| *connected);
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}
