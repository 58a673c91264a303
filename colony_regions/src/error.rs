// Error type for the public region-map API.
//
// Internal algorithms operate on indices that were validated at the public
// boundary, so they never return errors. Everything a caller can get wrong
// (coordinates outside the grid, asking for the region of an unassigned
// tile, a tile source whose dimensions changed under the map) surfaces here.

use crate::region::RegionId;
use colony_tiles::{GridDims, TileCoord};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// The coordinate lies outside `[0, dims.x) x [0, dims.y) x [0, dims.z)`.
    #[error("coordinate {coord} is outside the {dims} grid")]
    InvalidCoordinate { coord: TileCoord, dims: GridDims },

    /// The tile is unwalkable (or no-pass) and belongs to no region.
    #[error("tile {coord} is not part of any region")]
    NoRegion { coord: TileCoord },

    /// The id is the reserved 0 or was never allocated.
    #[error("region {id} does not exist")]
    UnknownRegion { id: RegionId },

    /// The tile source's dimensions differ from the ones captured by the
    /// last `init_regions`. The map needs a full rebuild.
    #[error("tile source is {actual} but the region map was built for {expected}")]
    DimensionMismatch { expected: GridDims, actual: GridDims },
}
