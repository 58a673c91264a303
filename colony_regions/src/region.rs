// Region identity and vertical-connection bookkeeping.
//
// A `Region` is one maximal set of horizontally 4-connected passable tiles on
// a single z-level. The tiles themselves live in `RegionMap`'s dense
// tile-to-region array; a `Region` only carries its ID and its labeled edges
// to regions on other levels (created by stairs, ramps and scaffolds).
//
// Edges are stored twice: `connections_to` on the region that owns the
// originating tile, and `connections_from` on the target region. Each edge is
// annotated with the set of origin positions that create it. `Region` never
// touches another region; keeping the two sides mirrored is `RegionMap`'s
// job.
//
// All maps are `BTreeMap`/`BTreeSet` so iteration order (and therefore the
// order in which merges and splits rewrite edges) is deterministic.

use colony_tiles::TileCoord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Dense, never-reused region identifier. `RegionId::NONE` (0) marks an
/// unassigned tile and is never a valid region.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RegionId(pub u32);

impl RegionId {
    pub const NONE: RegionId = RegionId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-target edge sets: target region -> origin positions.
pub type ConnectionSet = BTreeMap<RegionId, BTreeSet<TileCoord>>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    id: RegionId,
    connections_to: ConnectionSet,
    connections_from: ConnectionSet,
}

impl Region {
    pub fn new(id: RegionId) -> Self {
        Self {
            id,
            connections_to: ConnectionSet::new(),
            connections_from: ConnectionSet::new(),
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Record that `origin` (a tile in this region) connects up to `target`.
    /// Idempotent.
    pub fn add_connection_to(&mut self, target: RegionId, origin: TileCoord) {
        self.connections_to.entry(target).or_default().insert(origin);
    }

    /// Record that `origin` (a tile in `source`) connects up into this region.
    /// Idempotent.
    pub fn add_connection_from(&mut self, source: RegionId, origin: TileCoord) {
        self.connections_from.entry(source).or_default().insert(origin);
    }

    /// Remove one origin from the edge to `target`. Drops the edge entirely
    /// once no origin is left. Returns whether the origin was present.
    pub fn remove_connection_to(&mut self, target: RegionId, origin: TileCoord) -> bool {
        remove_origin(&mut self.connections_to, target, origin)
    }

    /// Mirror of `remove_connection_to` for incoming edges.
    pub fn remove_connection_from(&mut self, source: RegionId, origin: TileCoord) -> bool {
        remove_origin(&mut self.connections_from, source, origin)
    }

    /// Drop the whole edge to `target`, returning its origins.
    pub fn remove_all_connections_to(&mut self, target: RegionId) -> Option<BTreeSet<TileCoord>> {
        self.connections_to.remove(&target)
    }

    /// Drop the whole edge from `source`, returning its origins.
    pub fn remove_all_connections_from(
        &mut self,
        source: RegionId,
    ) -> Option<BTreeSet<TileCoord>> {
        self.connections_from.remove(&source)
    }

    pub fn clear_connections_to(&mut self) {
        self.connections_to.clear();
    }

    pub fn clear_connections_from(&mut self) {
        self.connections_from.clear();
    }

    /// Remove and return all outgoing edges.
    pub(crate) fn take_connections_to(&mut self) -> ConnectionSet {
        std::mem::take(&mut self.connections_to)
    }

    /// Remove and return all incoming edges.
    pub(crate) fn take_connections_from(&mut self) -> ConnectionSet {
        std::mem::take(&mut self.connections_from)
    }

    pub fn connection_set_to(&self) -> &ConnectionSet {
        &self.connections_to
    }

    pub fn connection_set_from(&self) -> &ConnectionSet {
        &self.connections_from
    }

    /// Origin positions of the edge to `target`, if there is one.
    pub fn connections_to_region(&self, target: RegionId) -> Option<&BTreeSet<TileCoord>> {
        self.connections_to.get(&target)
    }

    /// Origin positions of the edge from `source`, if there is one.
    pub fn connections_from_region(&self, source: RegionId) -> Option<&BTreeSet<TileCoord>> {
        self.connections_from.get(&source)
    }

    /// Regions this region has an outgoing edge to.
    pub fn connections_to(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.connections_to.keys().copied()
    }

    /// Regions with an edge into this region.
    pub fn connections_from(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.connections_from.keys().copied()
    }

    /// Both directions, for undirected reachability. May repeat an ID.
    pub fn neighbors(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.connections_to().chain(self.connections_from())
    }

    pub fn has_connections(&self) -> bool {
        !self.connections_to.is_empty() || !self.connections_from.is_empty()
    }
}

fn remove_origin(set: &mut ConnectionSet, other: RegionId, origin: TileCoord) -> bool {
    let Some(origins) = set.get_mut(&other) else {
        return false;
    };
    let removed = origins.remove(&origin);
    if origins.is_empty() {
        set.remove(&other);
    }
    removed
}
