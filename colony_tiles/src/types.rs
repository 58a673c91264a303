// Core tile types shared between the tile provider and the region map.
//
// Defines grid coordinates (`TileCoord`), the per-tile flag sets
// (`TileFlags`, `WallType`), and the `Tile` record read through
// `TileSource`. All types derive `Serialize` and `Deserialize` so an
// embedding simulation can persist its grid; the region map itself is
// never persisted (it is rebuilt from the grid on load).
//
// See also: `source.rs` for the `TileSource` trait, `grid.rs` for the dense
// `TileGrid` implementation.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position in the 3D tile grid.
///
/// Axis conventions:
/// - X: east  (positive) / west  (negative)
/// - Y: south (positive) / north (negative)
/// - Z: up    (positive) / down  (negative), one z step per level
///
/// Components are signed so neighbor arithmetic at the grid edge produces
/// an out-of-bounds coordinate rather than wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub const fn north(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub const fn east(self) -> Self {
        self.offset(1, 0, 0)
    }

    pub const fn south(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub const fn west(self) -> Self {
        self.offset(-1, 0, 0)
    }

    pub const fn above(self) -> Self {
        self.offset(0, 0, 1)
    }

    pub const fn below(self) -> Self {
        self.offset(0, 0, -1)
    }

    /// The four horizontal neighbors in N, E, S, W order.
    pub const fn horizontal_neighbors(self) -> [Self; 4] {
        [self.north(), self.east(), self.south(), self.west()]
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Grid extents along each axis. Fixed for the lifetime of a grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GridDims {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total number of cells.
    pub fn volume(self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Number of cells on one z-level.
    pub fn level_area(self) -> usize {
        self.x as usize * self.y as usize
    }

    pub fn contains(self, coord: TileCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.x
            && (coord.y as u32) < self.y
            && (coord.z as u32) < self.z
    }

    /// Flat index `x + y * dim_x + z * dim_x * dim_y`. Returns `None` if out
    /// of bounds.
    ///
    /// The y-stride of `dim_x` is what lets the region flood fill step to the
    /// row above or below with `index -/+ dim_x`.
    pub fn index(self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let sx = self.x as usize;
        let sy = self.y as usize;
        Some(coord.x as usize + coord.y as usize * sx + coord.z as usize * sx * sy)
    }

    /// Inverse of `index`. The caller guarantees `index < volume()`.
    pub fn coord(self, index: usize) -> TileCoord {
        let sx = self.x as usize;
        let area = self.level_area();
        let z = index / area;
        let rem = index % area;
        TileCoord::new((rem % sx) as i32, (rem / sx) as i32, z as i32)
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Tile flags
// ---------------------------------------------------------------------------

bitflags::bitflags! {
    /// Per-tile state bits relevant to movement.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TileFlags: u32 {
        /// Something can stand here.
        const WALKABLE = 0x01;
        /// Player-designated no-go area. Physically walkable, but excluded
        /// from regions.
        const NOPASS = 0x20;
        /// Standing water. Passable by default; providers with swimming
        /// rules may exclude it.
        const WATER = 0x8000;
    }
}

bitflags::bitflags! {
    /// Wall construction bits. Only `STAIR`, `RAMP` and `SCAFFOLD` create
    /// connections between z-levels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct WallType: u16 {
        const SOLID = 0x01;
        const ROUGH = 0x02;
        const CONSTRUCTED = 0x04;
        const STAIR = 0x20;
        const RAMP = 0x40;
        const SCAFFOLD = 0x100;

        /// Any wall that links a tile to the level above.
        const VERTICAL_LINK = Self::STAIR.bits() | Self::RAMP.bits() | Self::SCAFFOLD.bits();
    }
}

/// The movement-relevant view of one grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub flags: TileFlags,
    pub wall: WallType,
}

impl Tile {
    /// A plain walkable floor tile.
    pub const FLOOR: Tile = Tile {
        flags: TileFlags::WALKABLE,
        wall: WallType::empty(),
    };

    /// A solid, unwalkable wall.
    pub const WALL: Tile = Tile {
        flags: TileFlags::empty(),
        wall: WallType::SOLID,
    };

    pub const fn with_wall(flags: TileFlags, wall: WallType) -> Self {
        Self { flags, wall }
    }

    /// Walkable and not designated no-pass.
    pub fn is_passable(&self) -> bool {
        self.flags.contains(TileFlags::WALKABLE) && !self.flags.contains(TileFlags::NOPASS)
    }

    /// Stair, ramp or scaffold.
    pub fn links_upward(&self) -> bool {
        self.wall.intersects(WallType::VERTICAL_LINK)
    }
}
