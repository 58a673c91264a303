// Read-only tile provider interface.
//
// `TileSource` is the single capability the region map needs from whatever
// owns the world's tiles: grid dimensions plus a per-coordinate `Tile`
// lookup. The region map borrows a `TileSource` for the duration of each
// call and never holds on to it, so the world can keep mutating between
// calls (it then reports the change through `RegionMap::update_position`).
//
// Providers with richer movement rules (fluid depth, swimming) override
// `is_passable`; the default is WALKABLE && !NOPASS.

use crate::types::{GridDims, Tile, TileCoord};

pub trait TileSource {
    /// Grid extents. Must stay constant between region-map rebuilds.
    fn dims(&self) -> GridDims;

    /// Read one tile. Implementations return `Tile::default()` (empty,
    /// unwalkable) for out-of-bounds coordinates.
    fn tile(&self, coord: TileCoord) -> Tile;

    fn in_bounds(&self, coord: TileCoord) -> bool {
        self.dims().contains(coord)
    }

    /// Whether creatures may stand on this tile for region purposes.
    fn is_passable(&self, coord: TileCoord) -> bool {
        self.tile(coord).is_passable()
    }
}

impl<T: TileSource + ?Sized> TileSource for &T {
    fn dims(&self) -> GridDims {
        (**self).dims()
    }

    fn tile(&self, coord: TileCoord) -> Tile {
        (**self).tile(coord)
    }

    fn in_bounds(&self, coord: TileCoord) -> bool {
        (**self).in_bounds(coord)
    }

    fn is_passable(&self, coord: TileCoord) -> bool {
        (**self).is_passable(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TileFlags, WallType};

    /// Treats water tiles as impassable on top of the default rule.
    struct NoSwimming {
        tiles: Vec<Tile>,
    }

    impl TileSource for NoSwimming {
        fn dims(&self) -> GridDims {
            GridDims::new(self.tiles.len() as u32, 1, 1)
        }

        fn tile(&self, coord: TileCoord) -> Tile {
            self.dims()
                .index(coord)
                .map(|i| self.tiles[i])
                .unwrap_or_default()
        }

        fn is_passable(&self, coord: TileCoord) -> bool {
            let tile = self.tile(coord);
            tile.is_passable() && !tile.flags.contains(TileFlags::WATER)
        }
    }

    #[test]
    fn override_is_passable() {
        let src = NoSwimming {
            tiles: vec![
                Tile::FLOOR,
                Tile::with_wall(TileFlags::WALKABLE | TileFlags::WATER, WallType::empty()),
            ],
        };
        assert!(src.is_passable(TileCoord::new(0, 0, 0)));
        assert!(!src.is_passable(TileCoord::new(1, 0, 0)));
        // Out of bounds reads as the empty tile.
        assert!(!src.is_passable(TileCoord::new(5, 0, 0)));
    }

    #[test]
    fn references_forward_overrides() {
        let src = NoSwimming {
            tiles: vec![Tile::with_wall(
                TileFlags::WALKABLE | TileFlags::WATER,
                WallType::empty(),
            )],
        };
        let by_ref: &NoSwimming = &src;
        assert!(!TileSource::is_passable(&by_ref, TileCoord::new(0, 0, 0)));
        assert!(by_ref.in_bounds(TileCoord::new(0, 0, 0)));
    }
}
