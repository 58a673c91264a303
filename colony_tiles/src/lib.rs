// colony_tiles: the tile-provider side of the region subsystem.
//
// This crate holds everything the region map reads but does not own: grid
// coordinates, per-tile flag sets, and the `TileSource` trait through which
// a world exposes its tiles. It has no knowledge of regions.
//
// Module overview:
// - `types.rs`:  TileCoord, GridDims, TileFlags, WallType, Tile.
// - `source.rs`: TileSource: read-only dims + per-coordinate tile lookup.
// - `grid.rs`:   TileGrid: dense flat-Vec implementation of TileSource.
//
// **Critical constraint: determinism.** Iteration over a grid is always in
// scan order (z, then y, then x). Region IDs downstream are assigned in this
// order, so two identical grids must yield identical region maps.

pub mod grid;
pub mod source;
pub mod types;

pub use grid::TileGrid;
pub use source::TileSource;
pub use types::{GridDims, Tile, TileCoord, TileFlags, WallType};
