// The region map: tile-to-region partition plus the region adjacency graph.
//
// `RegionMap` owns a dense `Vec<RegionId>` with one entry per grid cell
// (same flat layout as `GridDims::index`) and a `Vec<Region>` indexed by
// `RegionId` (slot 0 is a sentinel that is never handed out). It is built in
// full by `init_regions()` and then kept current by `update_position()`,
// which the owner of the tiles calls after every walkability or wall change.
//
// Incremental protocol for one `update_position(pos)`:
// 1. Detach every vertical edge whose origin can involve `pos`: `pos`
//    itself, the tile below it, and the four horizontal neighbors of the tile
//    below (ramps fan out sideways).
// 2. Apply the walkability transition. Becoming walkable adopts the smallest
//    neighboring region ID and merges the other neighbors into it (or opens a
//    fresh region when there are none). Becoming unwalkable clears the label
//    and runs split detection over the six neighbor pairs.
// 3. Re-attach the edges of the same origins against the new labels.
// 4. Invalidate the connectivity cache according to what the graph lost or
//    gained (see `EdgeDelta`).
//
// Edges point upward only: an origin tile (stair, ramp or scaffold) on level
// z links to tiles on level z + 1. Edges whose target tile is unassigned are
// never recorded, so "region A has an edge to B" always means some tile of A
// really leads into some tile of B.
//
// Region IDs are never reused. Merged-away regions keep their slot with no
// tiles and no edges; `stats()` reports live vs allocated, and a fresh
// `init_regions()` compacts the numbering.
//
// See also: `flood.rs` for the per-level fills, `connectivity.rs` for the
// reachability BFS and its cache, `region.rs` for edge bookkeeping.
//
// **Critical constraint: determinism.** `init_regions` numbers regions in
// scan order (z, then y, then x) whether or not levels are labeled in
// parallel, and every incremental step iterates in a fixed order (neighbor
// order N, E, S, W; split pairs in table order; edges in `BTreeMap` order).
// The same sequence of updates on the same grid always yields the same IDs.

use crate::config::RegionConfig;
use crate::connectivity::{ConnectivityCache, regions_connected};
use crate::error::RegionError;
use crate::flood::{self, PlaneDims, VisitStamps};
use crate::region::{Region, RegionId};
use colony_tiles::{GridDims, TileCoord, TileFlags, TileSource, WallType};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Instant;

// ---------------------------------------------------------------------------
// Split detection table
// ---------------------------------------------------------------------------

type Offset = (i32, i32);

const N: Offset = (0, -1);
const E: Offset = (1, 0);
const S: Offset = (0, 1);
const W: Offset = (-1, 0);
const NE: Offset = (1, -1);
const SE: Offset = (1, 1);
const SW: Offset = (-1, 1);
const NW: Offset = (-1, -1);

/// Two neighbors of a cleared tile, plus the short detours that keep them
/// trivially connected without a search.
struct SplitPair {
    a: Offset,
    b: Offset,
    /// Each detour is a 4-connected path from `a` to `b` that avoids the
    /// cleared tile. Adjacent pairs have one detour (their shared corner);
    /// opposite pairs have two three-tile rows.
    detours: &'static [&'static [Offset]],
}

const SPLIT_PAIRS: [SplitPair; 6] = [
    SplitPair {
        a: W,
        b: E,
        detours: &[&[NW, N, NE], &[SW, S, SE]],
    },
    SplitPair {
        a: W,
        b: N,
        detours: &[&[NW]],
    },
    SplitPair {
        a: W,
        b: S,
        detours: &[&[SW]],
    },
    SplitPair {
        a: E,
        b: N,
        detours: &[&[NE]],
    },
    SplitPair {
        a: E,
        b: S,
        detours: &[&[SE]],
    },
    SplitPair {
        a: N,
        b: S,
        detours: &[&[NW, W, SW], &[NE, E, SE]],
    },
];

fn shifted(pos: TileCoord, (dx, dy): Offset) -> TileCoord {
    pos.offset(dx, dy, 0)
}

// ---------------------------------------------------------------------------
// Graph change tracking
// ---------------------------------------------------------------------------

/// What one update did to the region graph, for cache invalidation.
///
/// A cached `true` stays valid as long as no region pair lost its last edge
/// and no region split. A cached `false` stays valid as long as nothing was
/// added or merged.
#[derive(Debug, Default)]
struct EdgeDelta {
    /// (from, to) pairs whose last edge was removed, in the IDs of the
    /// moment of removal.
    lost: SmallVec<[(RegionId, RegionId); 4]>,
    /// A region pair gained its first edge.
    gained: bool,
    /// (absorbed, kept), in merge order.
    merged: SmallVec<[(RegionId, RegionId); 3]>,
    split: bool,
}

impl EdgeDelta {
    /// Follow merges forward from `id`.
    fn resolve(&self, mut id: RegionId) -> RegionId {
        for &(absorbed, kept) in &self.merged {
            if id == absorbed {
                id = kept;
            }
        }
        id
    }
}

/// Snapshot counters, mostly for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Region IDs handed out since the last rebuild.
    pub allocated: usize,
    /// Regions that currently own at least one tile.
    pub live: usize,
    /// Distinct (from, to) region pairs with at least one vertical edge.
    pub edges: usize,
    /// Memoized connectivity verdicts.
    pub cached_verdicts: usize,
}

// ---------------------------------------------------------------------------
// RegionMap
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct RegionMap {
    config: RegionConfig,
    dims: GridDims,
    /// One entry per grid cell, flat index `x + y * dims.x + z * dims.x * dims.y`.
    tile_regions: Vec<RegionId>,
    /// Indexed by `RegionId`. Slot 0 is the unused sentinel.
    regions: Vec<Region>,
    cache: ConnectivityCache,
    stamps: VisitStamps,
    touched: Vec<TileCoord>,
    initialized: bool,
}

impl Default for RegionMap {
    fn default() -> Self {
        Self::new(RegionConfig::default())
    }
}

impl RegionMap {
    /// An empty, uninitialized map. Call `init_regions` before querying.
    pub fn new(config: RegionConfig) -> Self {
        let cache = ConnectivityCache::with_capacity_limit(config.cache_capacity);
        Self {
            config,
            dims: GridDims::default(),
            tile_regions: Vec::new(),
            regions: vec![Region::new(RegionId::NONE)],
            cache,
            stamps: VisitStamps::default(),
            touched: Vec::new(),
            initialized: false,
        }
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Dimensions captured by the last `init_regions`.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Drop all regions, edges and cached answers. The map is uninitialized
    /// afterwards.
    pub fn clear(&mut self) {
        *self = Self::new(self.config.clone());
    }

    // -----------------------------------------------------------------------
    // Full rebuild
    // -----------------------------------------------------------------------

    /// Partition the whole grid from scratch and derive every vertical edge.
    ///
    /// Also the only way to pick up a change of grid dimensions, and the way
    /// to compact region IDs after a long session of merges and splits.
    pub fn init_regions<T: TileSource + Sync + ?Sized>(&mut self, tiles: &T) {
        let started = Instant::now();
        let dims = tiles.dims();
        let area = dims.level_area();
        let plane = PlaneDims {
            dim_x: dims.x as usize,
            dim_y: dims.y as usize,
        };

        self.dims = dims;
        self.tile_regions = vec![RegionId::NONE; dims.volume()];
        self.regions = vec![Region::new(RegionId::NONE)];
        self.cache.clear();
        self.touched.clear();

        let mut total = 0u32;
        if area > 0 {
            // Each level is labeled 1..n on its own, then shifted by the
            // number of regions on the levels below it. That reproduces the
            // serial scan-order numbering exactly.
            let passable = |z: usize, i: usize| tiles.is_passable(dims.coord(z * area + i));
            let counts: Vec<u32> = if self.config.parallel_init {
                self.tile_regions
                    .par_chunks_mut(area)
                    .enumerate()
                    .map(|(z, level)| flood::label_plane(level, plane, |i| passable(z, i)))
                    .collect()
            } else {
                self.tile_regions
                    .chunks_mut(area)
                    .enumerate()
                    .map(|(z, level)| flood::label_plane(level, plane, |i| passable(z, i)))
                    .collect()
            };

            let mut offsets = Vec::with_capacity(counts.len());
            for count in counts {
                offsets.push(total);
                total += count;
            }

            if self.config.parallel_init {
                self.tile_regions
                    .par_chunks_mut(area)
                    .zip(offsets.par_iter())
                    .for_each(|(level, &offset)| shift_level(level, offset));
            } else {
                self.tile_regions
                    .chunks_mut(area)
                    .zip(offsets.iter())
                    .for_each(|(level, &offset)| shift_level(level, offset));
            }
        }
        self.regions
            .extend((1..=total).map(|id| Region::new(RegionId(id))));

        let mut delta = EdgeDelta::default();
        for index in 0..self.tile_regions.len() {
            if self.tile_regions[index].is_none() {
                continue;
            }
            let origin = dims.coord(index);
            if tiles.tile(origin).links_upward() {
                self.attach_origin(tiles, origin, &mut delta);
            }
        }
        self.initialized = true;

        tracing::debug!(
            dims = %dims,
            regions = total,
            edges = self.edge_count(),
            parallel = self.config.parallel_init,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "region map rebuilt"
        );
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Region of the tile at `pos`.
    pub fn region_id(&self, pos: TileCoord) -> Result<RegionId, RegionError> {
        let index = self.checked_index(pos)?;
        let id = self.tile_regions[index];
        if id.is_none() {
            return Err(RegionError::NoRegion { coord: pos });
        }
        Ok(id)
    }

    /// Region of the tile at flat index `index`. `None` past the end of the
    /// grid; unassigned tiles report `RegionId::NONE`.
    pub fn region_id_by_index(&self, index: usize) -> Option<RegionId> {
        self.tile_regions.get(index).copied()
    }

    pub fn region(&self, id: RegionId) -> Result<&Region, RegionError> {
        if id.is_none() {
            return Err(RegionError::UnknownRegion { id });
        }
        self.regions
            .get(id.index())
            .ok_or(RegionError::UnknownRegion { id })
    }

    /// The region containing the tile at `pos`.
    pub fn region_at(&self, pos: TileCoord) -> Result<&Region, RegionError> {
        self.region(self.region_id(pos)?)
    }

    /// Every allocated region in ID order, including merged-away ones (which
    /// own no tiles and have no edges).
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter().skip(1)
    }

    /// Counters for the current state. O(cells).
    pub fn stats(&self) -> RegionStats {
        let mut owned = vec![false; self.regions.len()];
        for id in &self.tile_regions {
            owned[id.index()] = true;
        }
        RegionStats {
            allocated: self.regions.len() - 1,
            live: owned.iter().skip(1).filter(|&&o| o).count(),
            edges: self.edge_count(),
            cached_verdicts: self.cache.len(),
        }
    }

    /// Drain the tiles relabeled since the last call, sorted and without
    /// duplicates. Empty when `record_touched_tiles` is off.
    pub fn take_touched_tiles(&mut self) -> Vec<TileCoord> {
        let mut touched = std::mem::take(&mut self.touched);
        touched.sort_unstable();
        touched.dedup();
        touched
    }

    // -----------------------------------------------------------------------
    // Connectivity oracle
    // -----------------------------------------------------------------------

    /// Whether a creature in region `a` can reach region `b`, following
    /// vertical edges in either direction. Unassigned or unknown IDs are
    /// connected to nothing.
    pub fn check_connected_regions(&mut self, a: RegionId, b: RegionId) -> bool {
        let known = |id: RegionId| id.is_some() && id.index() < self.regions.len();
        if !known(a) || !known(b) {
            return false;
        }
        if a == b {
            return true;
        }
        if !self.config.cache_connectivity {
            return regions_connected(&self.regions, a, b);
        }

        let key = ConnectivityCache::key(a, b);
        if let Some(connected) = self.cache.get(key) {
            tracing::trace!(a = %key.0, b = %key.1, connected, "connectivity cache hit");
            return connected;
        }
        let connected = regions_connected(&self.regions, key.0, key.1);
        tracing::trace!(a = %key.0, b = %key.1, connected, "connectivity cache miss");
        self.cache.insert(key, connected);
        connected
    }

    /// Position overload of `check_connected_regions`. A tile that belongs
    /// to no region is connected to nothing.
    pub fn check_connected(&mut self, a: TileCoord, b: TileCoord) -> Result<bool, RegionError> {
        let ra = self.tile_regions[self.checked_index(a)?];
        let rb = self.tile_regions[self.checked_index(b)?];
        Ok(self.check_connected_regions(ra, rb))
    }

    // -----------------------------------------------------------------------
    // Vertical links
    // -----------------------------------------------------------------------

    /// Tiles on the level above that `pos` leads up to.
    ///
    /// A stair or scaffold links to the single tile directly above. A ramp
    /// links to each of the four tiles diagonally up (above, then one step
    /// N, E, S or W) that is walkable. Anything else links to nothing.
    pub fn connected_neighbors_up<T: TileSource + ?Sized>(
        tiles: &T,
        pos: TileCoord,
    ) -> SmallVec<[TileCoord; 4]> {
        let mut up = SmallVec::new();
        // Off-grid origins link nowhere, and stepping from them may overflow.
        if !tiles.in_bounds(pos) {
            return up;
        }
        let wall = tiles.tile(pos).wall;
        if wall.intersects(WallType::STAIR | WallType::SCAFFOLD) {
            let above = pos.above();
            if tiles.in_bounds(above) {
                up.push(above);
            }
        } else if wall.contains(WallType::RAMP) {
            for candidate in pos.above().horizontal_neighbors() {
                if tiles.in_bounds(candidate)
                    && tiles.tile(candidate).flags.contains(TileFlags::WALKABLE)
                {
                    up.push(candidate);
                }
            }
        }
        up
    }

    // -----------------------------------------------------------------------
    // Incremental updates
    // -----------------------------------------------------------------------

    /// Bring the map up to date after the tile at `pos` changed.
    ///
    /// Call after any change to a tile's walkability, no-pass flag or wall
    /// type. A no-op before the first `init_regions`.
    pub fn update_position<T: TileSource + ?Sized>(
        &mut self,
        tiles: &T,
        pos: TileCoord,
    ) -> Result<(), RegionError> {
        if !self.initialized {
            return Ok(());
        }
        self.check_source(tiles)?;
        let index = self.checked_index(pos)?;

        let current = self.tile_regions[index];
        let passable = tiles.is_passable(pos);
        tracing::trace!(%pos, region = %current, passable, "update_position");

        let mut delta = EdgeDelta::default();
        let origins = self.affected_origins(pos);
        for &origin in &origins {
            self.detach_origin(origin, &mut delta);
        }
        match (current.is_some(), passable) {
            (false, true) => self.set_walkable(pos, index, &mut delta),
            (true, false) => self.clear_walkable(tiles, pos, index, &mut delta),
            _ => {}
        }
        for &origin in &origins {
            self.attach_origin(tiles, origin, &mut delta);
        }
        self.apply_cache_policy(&delta);
        Ok(())
    }

    /// Re-derive the vertical edges that can involve `pos` without touching
    /// the partition. For wall changes on tiles whose walkability is
    /// unchanged (a stair built on an existing floor). `update_position`
    /// already does this as part of every update.
    pub fn update_connected_regions<T: TileSource + ?Sized>(
        &mut self,
        tiles: &T,
        pos: TileCoord,
    ) -> Result<(), RegionError> {
        if !self.initialized {
            return Ok(());
        }
        self.check_source(tiles)?;
        self.checked_index(pos)?;

        let mut delta = EdgeDelta::default();
        let origins = self.affected_origins(pos);
        for &origin in &origins {
            self.detach_origin(origin, &mut delta);
        }
        for &origin in &origins {
            self.attach_origin(tiles, origin, &mut delta);
        }
        self.apply_cache_policy(&delta);
        Ok(())
    }

    /// The tile becomes part of a region: adopt the smallest neighboring ID
    /// and merge every other neighboring region into it.
    fn set_walkable(&mut self, pos: TileCoord, index: usize, delta: &mut EdgeDelta) {
        let mut neighbors: SmallVec<[RegionId; 4]> = pos
            .horizontal_neighbors()
            .into_iter()
            .map(|n| self.label(n))
            .filter(|id| id.is_some())
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();

        let Some((&keep, others)) = neighbors.split_first() else {
            let id = self.alloc_region();
            self.tile_regions[index] = id;
            self.record_touched(pos);
            return;
        };
        self.tile_regions[index] = keep;
        self.record_touched(pos);
        for &absorbed in others {
            self.merge_regions(pos, absorbed, keep, delta);
        }
    }

    /// The tile leaves its region. Split detection decides whether the rest
    /// of the region is still in one piece.
    fn clear_walkable<T: TileSource + ?Sized>(
        &mut self,
        tiles: &T,
        pos: TileCoord,
        index: usize,
        delta: &mut EdgeDelta,
    ) {
        self.tile_regions[index] = RegionId::NONE;
        self.record_touched(pos);
        self.check_split(tiles, pos, delta);
    }

    /// Relabel `old`'s footprint to `new` (flooding from `pos`, which already
    /// carries `new`) and move every edge of `old` onto `new`.
    fn merge_regions(
        &mut self,
        pos: TileCoord,
        old: RegionId,
        new: RegionId,
        delta: &mut EdgeDelta,
    ) {
        self.flood_fill(old, new, pos);

        let outgoing = self.regions[old.index()].take_connections_to();
        for (target, origins) in outgoing {
            self.regions[target.index()].remove_all_connections_from(old);
            for origin in origins {
                self.regions[new.index()].add_connection_to(target, origin);
                self.regions[target.index()].add_connection_from(new, origin);
            }
        }
        let incoming = self.regions[old.index()].take_connections_from();
        for (source, origins) in incoming {
            self.regions[source.index()].remove_all_connections_to(old);
            for origin in origins {
                self.regions[source.index()].add_connection_to(new, origin);
                self.regions[new.index()].add_connection_from(source, origin);
            }
        }

        delta.merged.push((old, new));
        tracing::debug!(absorbed = %old, kept = %new, %pos, "merged regions");
    }

    /// Run the six pairwise neighbor checks around the cleared tile at `pos`.
    /// Each confirmed split moves the first neighbor's side to a new region,
    /// so later pairs see the updated labels and a junction can fall apart
    /// into up to four pieces.
    fn check_split<T: TileSource + ?Sized>(
        &mut self,
        tiles: &T,
        pos: TileCoord,
        delta: &mut EdgeDelta,
    ) {
        for pair in &SPLIT_PAIRS {
            let a = shifted(pos, pair.a);
            let b = shifted(pos, pair.b);
            let region = self.label(a);
            if region.is_none() || self.label(b) != region {
                continue;
            }
            let detoured = pair.detours.iter().any(|detour| {
                detour
                    .iter()
                    .all(|&step| self.label(shifted(pos, step)) == region)
            });
            if detoured || self.still_connected(a, b, region) {
                continue;
            }

            let into = self.alloc_region();
            self.flood_fill(region, into, a);
            self.split_regions(tiles, region, into);
            delta.split = true;
            tracing::debug!(from = %region, into = %into, %pos, "split region");
        }
    }

    /// Bounded search for `b` from `a` through tiles labeled `region`.
    fn still_connected(&mut self, a: TileCoord, b: TileCoord, region: RegionId) -> bool {
        let (Some(ai), Some(bi)) = (self.dims.index(a), self.dims.index(b)) else {
            return false;
        };
        let dims = self.plane_dims();
        let area = self.dims.level_area();
        let base = ai - ai % area;
        let plane = &self.tile_regions[base..base + area];
        flood::connected_within(
            plane,
            dims,
            ai - base,
            bi - base,
            region,
            &mut self.stamps,
        )
    }

    /// Redistribute `from`'s edges after part of its footprint was relabeled
    /// `into`. Outgoing edges follow the current label of their origin;
    /// incoming edges are re-derived from their origins.
    fn split_regions<T: TileSource + ?Sized>(&mut self, tiles: &T, from: RegionId, into: RegionId) {
        self.cache.clear();

        let outgoing = self.regions[from.index()].take_connections_to();
        for (target, origins) in outgoing {
            self.regions[target.index()].remove_all_connections_from(from);
            for origin in origins {
                let owner = self.label(origin);
                if owner != from && owner != into {
                    tracing::warn!(
                        %origin, %from, %into, %owner,
                        "edge origin outside split region, dropping"
                    );
                    continue;
                }
                self.regions[owner.index()].add_connection_to(target, origin);
                self.regions[target.index()].add_connection_from(owner, origin);
            }
        }

        let incoming = self.regions[from.index()].take_connections_from();
        let mut scratch = EdgeDelta::default();
        for (source, origins) in incoming {
            self.regions[source.index()].remove_all_connections_to(from);
            for origin in origins {
                self.attach_origin(tiles, origin, &mut scratch);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Vertical edge maintenance
    // -----------------------------------------------------------------------

    /// Origins whose edges may involve `pos`: `pos` itself, the tile below,
    /// and the tiles beside the one below (ramps reach diagonally up).
    fn affected_origins(&self, pos: TileCoord) -> SmallVec<[TileCoord; 6]> {
        let below = pos.below();
        let mut origins = SmallVec::new();
        origins.push(pos);
        origins.push(below);
        origins.extend(below.horizontal_neighbors());
        origins.retain(|o| self.dims.contains(*o));
        origins
    }

    /// Remove every edge annotated with `origin`, on both sides.
    fn detach_origin(&mut self, origin: TileCoord, delta: &mut EdgeDelta) {
        let from = self.label(origin);
        if from.is_none() {
            return;
        }
        let targets: SmallVec<[RegionId; 4]> = self.regions[from.index()]
            .connection_set_to()
            .iter()
            .filter(|(_, origins)| origins.contains(&origin))
            .map(|(&target, _)| target)
            .collect();
        for target in targets {
            self.regions[from.index()].remove_connection_to(target, origin);
            self.regions[target.index()].remove_connection_from(from, origin);
            if self.regions[from.index()]
                .connections_to_region(target)
                .is_none()
            {
                delta.lost.push((from, target));
            }
        }
    }

    /// Record an edge from `origin`'s region to the region of every tile it
    /// leads up to.
    fn attach_origin<T: TileSource + ?Sized>(
        &mut self,
        tiles: &T,
        origin: TileCoord,
        delta: &mut EdgeDelta,
    ) {
        let from = self.label(origin);
        if from.is_none() {
            return;
        }
        for up in Self::connected_neighbors_up(tiles, origin) {
            let target = self.label(up);
            if target.is_none() {
                continue;
            }
            if self.regions[from.index()]
                .connections_to_region(target)
                .is_none()
            {
                delta.gained = true;
            }
            self.regions[from.index()].add_connection_to(target, origin);
            self.regions[target.index()].add_connection_from(from, origin);
        }
    }

    fn apply_cache_policy(&mut self, delta: &EdgeDelta) {
        let disconnected = delta.split
            || delta.lost.iter().any(|&(from, to)| {
                let (from, to) = (delta.resolve(from), delta.resolve(to));
                self.regions[from.index()]
                    .connections_to_region(to)
                    .is_none()
            });
        if disconnected {
            if !self.cache.is_empty() {
                tracing::trace!(entries = self.cache.len(), "connectivity cache purged");
            }
            self.cache.clear();
        } else if delta.gained || !delta.merged.is_empty() {
            self.cache.forget_disconnections();
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn alloc_region(&mut self) -> RegionId {
        let id = RegionId(self.regions.len() as u32);
        self.regions.push(Region::new(id));
        id
    }

    /// Relabel the component of `seed` on its level from `old` to `new`.
    fn flood_fill(&mut self, old: RegionId, new: RegionId, seed: TileCoord) {
        let Some(index) = self.dims.index(seed) else {
            return;
        };
        let dims = self.dims;
        let plane_dims = self.plane_dims();
        let area = dims.level_area();
        let base = index - index % area;
        let record = self.config.record_touched_tiles;
        let touched = &mut self.touched;
        flood::scanline_fill(
            &mut self.tile_regions[base..base + area],
            plane_dims,
            index - base,
            old,
            new,
            |_| true,
            |i| {
                if record {
                    touched.push(dims.coord(base + i));
                }
            },
        );
    }

    fn label(&self, pos: TileCoord) -> RegionId {
        self.dims
            .index(pos)
            .map_or(RegionId::NONE, |i| self.tile_regions[i])
    }

    fn checked_index(&self, pos: TileCoord) -> Result<usize, RegionError> {
        self.dims.index(pos).ok_or(RegionError::InvalidCoordinate {
            coord: pos,
            dims: self.dims,
        })
    }

    fn check_source<T: TileSource + ?Sized>(&self, tiles: &T) -> Result<(), RegionError> {
        let actual = tiles.dims();
        if actual != self.dims {
            tracing::warn!(
                expected = %self.dims,
                %actual,
                "tile source dimensions changed, rebuild required"
            );
            return Err(RegionError::DimensionMismatch {
                expected: self.dims,
                actual,
            });
        }
        Ok(())
    }

    fn plane_dims(&self) -> PlaneDims {
        PlaneDims {
            dim_x: self.dims.x as usize,
            dim_y: self.dims.y as usize,
        }
    }

    fn record_touched(&mut self, pos: TileCoord) {
        if self.config.record_touched_tiles {
            self.touched.push(pos);
        }
    }

    fn edge_count(&self) -> usize {
        self.regions.iter().map(|r| r.connections_to().count()).sum()
    }
}

/// Turn one level's local labels 1..n into global ones.
fn shift_level(level: &mut [RegionId], offset: u32) {
    if offset == 0 {
        return;
    }
    for id in level.iter_mut().filter(|id| id.is_some()) {
        id.0 += offset;
    }
}
