// Dense 3D tile grid.
//
// The grid is stored as a flat `Vec<Tile>` indexed by
// `x + y * dim_x + z * dim_x * dim_y`, giving O(1) read/write access.
// Out-of-bounds reads return the empty tile; out-of-bounds writes are no-ops.
//
// `TileGrid` is the reference `TileSource`: tests, benches and small
// embedding simulations use it directly. A game with its own world storage
// implements `TileSource` on that instead.
//
// Writing a tile does NOT update any region map. The owner of both must call
// `RegionMap::update_position` after each walkability or wall change.

use crate::source::TileSource;
use crate::types::{GridDims, Tile, TileCoord, TileFlags, WallType};
use serde::{Deserialize, Serialize};

/// Dense 3D tile grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Flat storage: index = x + y * dims.x + z * dims.x * dims.y.
    tiles: Vec<Tile>,
    dims: GridDims,
}

impl TileGrid {
    /// Create a grid filled with empty (unwalkable) tiles.
    pub fn new(dim_x: u32, dim_y: u32, dim_z: u32) -> Self {
        Self::filled(GridDims::new(dim_x, dim_y, dim_z), Tile::default())
    }

    /// Create a grid with every cell set to `tile`.
    pub fn filled(dims: GridDims, tile: Tile) -> Self {
        Self {
            tiles: vec![tile; dims.volume()],
            dims,
        }
    }

    /// Build a single-level grid from rows of characters. `.` is floor, `#`
    /// is wall, `x` is a no-pass floor. Rows must be equal length.
    ///
    /// Handy for tests: the picture reads north-up, west-left.
    pub fn from_ascii(rows: &[&str]) -> Self {
        Self::from_ascii_levels(&[rows])
    }

    /// Multi-level variant of `from_ascii`. Additional glyphs: `S` stair,
    /// `R` ramp, `H` scaffold (all walkable).
    pub fn from_ascii_levels(levels: &[&[&str]]) -> Self {
        let dim_z = levels.len() as u32;
        let dim_y = levels.first().map_or(0, |l| l.len()) as u32;
        let dim_x = levels
            .first()
            .and_then(|l| l.first())
            .map_or(0, |r| r.len()) as u32;
        let mut grid = Self::new(dim_x, dim_y, dim_z);
        for (z, level) in levels.iter().enumerate() {
            for (y, row) in level.iter().enumerate() {
                for (x, glyph) in row.chars().enumerate() {
                    let tile = match glyph {
                        '.' => Tile::FLOOR,
                        'x' => Tile::with_wall(
                            TileFlags::WALKABLE | TileFlags::NOPASS,
                            WallType::empty(),
                        ),
                        'S' => Tile::with_wall(TileFlags::WALKABLE, WallType::STAIR),
                        'R' => Tile::with_wall(TileFlags::WALKABLE, WallType::RAMP),
                        'H' => Tile::with_wall(TileFlags::WALKABLE, WallType::SCAFFOLD),
                        _ => Tile::WALL,
                    };
                    grid.set_tile(TileCoord::new(x as i32, y as i32, z as i32), tile);
                }
            }
        }
        grid
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Read a tile. Returns the empty tile for out-of-bounds coordinates.
    pub fn get(&self, coord: TileCoord) -> Tile {
        self.dims
            .index(coord)
            .map(|i| self.tiles[i])
            .unwrap_or_default()
    }

    /// Write a tile. No-op for out-of-bounds coordinates.
    pub fn set_tile(&mut self, coord: TileCoord, tile: Tile) {
        if let Some(i) = self.dims.index(coord) {
            self.tiles[i] = tile;
        }
    }

    fn update(&mut self, coord: TileCoord, f: impl FnOnce(&mut Tile)) {
        if let Some(i) = self.dims.index(coord) {
            f(&mut self.tiles[i]);
        }
    }

    pub fn set_walkable(&mut self, coord: TileCoord, walkable: bool) {
        self.update(coord, |t| t.flags.set(TileFlags::WALKABLE, walkable));
    }

    pub fn set_no_pass(&mut self, coord: TileCoord, no_pass: bool) {
        self.update(coord, |t| t.flags.set(TileFlags::NOPASS, no_pass));
    }

    pub fn set_wall(&mut self, coord: TileCoord, wall: WallType) {
        self.update(coord, |t| t.wall = wall);
    }

    /// Overwrite every tile on level `z`.
    pub fn fill_level(&mut self, z: i32, tile: Tile) {
        for y in 0..self.dims.y as i32 {
            for x in 0..self.dims.x as i32 {
                self.set_tile(TileCoord::new(x, y, z), tile);
            }
        }
    }

    /// Iterate every coordinate in scan order (z, then y, then x).
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.dims.volume()).map(|i| self.dims.coord(i))
    }
}

impl TileSource for TileGrid {
    fn dims(&self) -> GridDims {
        self.dims
    }

    fn tile(&self, coord: TileCoord) -> Tile {
        self.get(coord)
    }
}
