// colony_regions: walkable-region partition and connectivity oracle.
//
// Partitions the walkable tiles of a 3D grid into regions (maximal
// horizontally 4-connected sets on one z-level), links regions on adjacent
// levels through stairs, ramps and scaffolds, and answers "can a creature
// in A ever reach B?" without a tile-level path search. A pathfinder asks
// this first to reject unreachable goals cheaply.
//
// Module overview:
// - `region_map.rs`:   RegionMap: full rebuild, incremental updates, merge/split, queries.
// - `region.rs`:       RegionId + Region: per-region vertical edge bookkeeping.
// - `flood.rs`:        Per-level scanline flood fill, level labeling, bounded split search.
// - `connectivity.rs`: Region-graph BFS and the memoized verdict cache.
// - `config.rs`:       RegionConfig: tunables loaded from JSON.
// - `error.rs`:        RegionError: everything a caller can get wrong.
//
// The tiles themselves come from `colony_tiles` through the `TileSource`
// trait. The map never stores tiles and is never persisted: after loading a
// saved grid, call `init_regions` again.
//
// **Critical constraint: determinism.** Region IDs depend only on the grid
// and the sequence of updates, never on thread scheduling or hash order.
// The connectivity cache uses a hash map, but only for lookups; nothing is
// ever derived from its iteration order.

pub mod config;
mod connectivity;
pub mod error;
mod flood;
pub mod region;
pub mod region_map;

pub use config::RegionConfig;
pub use error::RegionError;
pub use region::{ConnectionSet, Region, RegionId};
pub use region_map::{RegionMap, RegionStats};
