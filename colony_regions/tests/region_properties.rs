// Property tests for the region map against a brute-force reference.
//
// Every test builds a grid (hand-drawn or from a seeded fastrand RNG),
// drives a RegionMap through it, and compares the result with an
// independent tile-level computation:
// - the partition must equal a fresh `init_regions` of the same grid up to
//   a bijective renaming of region IDs, edges included;
// - `check_connected` must agree with a BFS over tiles that follows
//   horizontal adjacency and every stair/ramp/scaffold link in either
//   direction.
//
// The reference deliberately ignores region IDs, so it cannot share a bug
// with the incremental merge/split code.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use colony_regions::{RegionConfig, RegionId, RegionMap};
use colony_tiles::{GridDims, Tile, TileCoord, TileFlags, TileGrid, TileSource, WallType};

/// Serial init so failures are reproducible under a debugger. Parallel init
/// has its own test below.
fn serial_config() -> RegionConfig {
    RegionConfig {
        parallel_init: false,
        ..RegionConfig::default()
    }
}

fn build(grid: &TileGrid) -> RegionMap {
    let mut map = RegionMap::new(serial_config());
    map.init_regions(grid);
    map
}

/// Random tile: mostly floor, some walls, the occasional vertical link or
/// no-pass designation.
fn random_tile(rng: &mut fastrand::Rng) -> Tile {
    match rng.u32(0..100) {
        0..=24 => Tile::WALL,
        25..=29 => Tile::with_wall(TileFlags::WALKABLE | TileFlags::NOPASS, WallType::empty()),
        30..=34 => Tile::with_wall(TileFlags::WALKABLE, WallType::STAIR),
        35..=39 => Tile::with_wall(TileFlags::WALKABLE, WallType::RAMP),
        40..=42 => Tile::with_wall(TileFlags::WALKABLE, WallType::SCAFFOLD),
        _ => Tile::FLOOR,
    }
}

fn random_grid(seed: u64, dims: GridDims) -> TileGrid {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut grid = TileGrid::filled(dims, Tile::FLOOR);
    for coord in grid.coords().collect::<Vec<_>>() {
        grid.set_tile(coord, random_tile(&mut rng));
    }
    grid
}

fn random_coord(rng: &mut fastrand::Rng, dims: GridDims) -> TileCoord {
    TileCoord::new(
        rng.i32(0..dims.x as i32),
        rng.i32(0..dims.y as i32),
        rng.i32(0..dims.z as i32),
    )
}

/// Component index per tile (`usize::MAX` for impassable tiles), computed
/// by BFS over tiles with undirected vertical links.
fn reference_components(grid: &TileGrid) -> Vec<usize> {
    let dims = grid.dims();
    let mut links: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for origin in grid.coords() {
        if !grid.is_passable(origin) {
            continue;
        }
        for up in RegionMap::connected_neighbors_up(grid, origin) {
            if grid.is_passable(up) {
                let (a, b) = (dims.index(origin).unwrap(), dims.index(up).unwrap());
                links.entry(a).or_default().push(b);
                links.entry(b).or_default().push(a);
            }
        }
    }

    let mut component = vec![usize::MAX; dims.volume()];
    let mut next = 0;
    for start in 0..dims.volume() {
        if component[start] != usize::MAX || !grid.is_passable(dims.coord(start)) {
            continue;
        }
        component[start] = next;
        let mut queue = VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            let coord = dims.coord(i);
            let horizontal = coord
                .horizontal_neighbors()
                .into_iter()
                .filter(|&n| grid.is_passable(n))
                .filter_map(|n| dims.index(n));
            let vertical = links.get(&i).into_iter().flatten().copied();
            for n in horizontal.chain(vertical) {
                if component[n] == usize::MAX {
                    component[n] = next;
                    queue.push_back(n);
                }
            }
        }
        next += 1;
    }
    component
}

/// Mapping from `map`'s region IDs to `fresh`'s. Panics unless the two
/// partitions are identical up to renaming.
fn bijection(map: &RegionMap, fresh: &RegionMap) -> BTreeMap<RegionId, RegionId> {
    let mut forward = BTreeMap::new();
    let mut backward = BTreeMap::new();
    for i in 0..map.dims().volume() {
        let ours = map.region_id_by_index(i).unwrap();
        let theirs = fresh.region_id_by_index(i).unwrap();
        assert_eq!(
            ours.is_none(),
            theirs.is_none(),
            "tile {} assigned in only one map",
            map.dims().coord(i)
        );
        if ours.is_none() {
            continue;
        }
        assert_eq!(*forward.entry(ours).or_insert(theirs), theirs);
        assert_eq!(*backward.entry(theirs).or_insert(ours), ours);
    }
    forward
}

/// Full structural check of `map` against the grid it claims to describe.
fn assert_consistent(map: &RegionMap, grid: &TileGrid) {
    let dims = grid.dims();

    // Assigned exactly when passable; no two adjacent passable tiles differ.
    for coord in grid.coords() {
        let label = map.region_id_by_index(dims.index(coord).unwrap()).unwrap();
        assert_eq!(label.is_some(), grid.is_passable(coord), "tile {coord}");
        for n in coord.horizontal_neighbors() {
            if grid.is_passable(coord) && grid.is_passable(n) {
                assert_eq!(map.region_id(n).unwrap(), label, "{coord} vs {n}");
            }
        }
    }

    let fresh = build(grid);
    let rename = bijection(map, &fresh);

    for region in map.regions() {
        // Mirrored bookkeeping on both sides of every edge.
        for (target, origins) in region.connection_set_to() {
            let back = map.region(*target).unwrap();
            assert_eq!(back.connections_from_region(region.id()), Some(origins));
        }
        for (source, origins) in region.connection_set_from() {
            let back = map.region(*source).unwrap();
            assert_eq!(back.connections_to_region(region.id()), Some(origins));
        }

        let Some(&renamed) = rename.get(&region.id()) else {
            assert!(
                !region.has_connections(),
                "dead region {} still has edges",
                region.id()
            );
            continue;
        };
        // Same edges as a rebuild, under the renaming.
        let expected: BTreeMap<RegionId, BTreeSet<TileCoord>> = region
            .connection_set_to()
            .iter()
            .map(|(target, origins)| (rename[target], origins.clone()))
            .collect();
        assert_eq!(
            &expected,
            fresh.region(renamed).unwrap().connection_set_to(),
            "edges of {}",
            region.id()
        );
    }
    assert_eq!(map.stats().live, fresh.stats().live);
    assert_eq!(map.stats().edges, fresh.stats().edges);
}

fn assert_oracle_agrees(
    map: &mut RegionMap,
    grid: &TileGrid,
    reference: &[usize],
    rng: &mut fastrand::Rng,
    samples: usize,
) {
    let dims = grid.dims();
    let passable: Vec<TileCoord> = grid.coords().filter(|&c| grid.is_passable(c)).collect();
    if passable.is_empty() {
        return;
    }
    for _ in 0..samples {
        let p = passable[rng.usize(..passable.len())];
        let q = passable[rng.usize(..passable.len())];
        let expected = reference[dims.index(p).unwrap()] == reference[dims.index(q).unwrap()];
        assert_eq!(
            map.check_connected(p, q).unwrap(),
            expected,
            "connectivity of {p} and {q}"
        );
    }
}

#[test]
fn initial_partition_matches_reference() {
    for seed in 0..6 {
        let grid = random_grid(seed, GridDims::new(10, 10, 3));
        let mut map = build(&grid);
        assert_consistent(&map, &grid);

        let reference = reference_components(&grid);
        let mut rng = fastrand::Rng::with_seed(seed + 100);
        assert_oracle_agrees(&mut map, &grid, &reference, &mut rng, 200);
    }
}

#[test]
fn random_edits_keep_map_consistent() {
    let dims = GridDims::new(10, 10, 3);
    for seed in 0..8 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut grid = random_grid(seed ^ 0x5eed, dims);
        let mut map = build(&grid);

        for step in 0..150 {
            let pos = random_coord(&mut rng, dims);
            let tile = random_tile(&mut rng);
            grid.set_tile(pos, tile);
            map.update_position(&grid, pos).unwrap();

            // Query every step so stale cache entries would be caught.
            let reference = reference_components(&grid);
            assert_oracle_agrees(&mut map, &grid, &reference, &mut rng, 20);
            if step % 10 == 9 {
                assert_consistent(&map, &grid);
            }
        }
        assert_consistent(&map, &grid);
    }
}

#[test]
fn uncached_oracle_agrees_with_reference() {
    let config =
        RegionConfig::from_json(r#"{ "cache_connectivity": false, "parallel_init": false }"#)
            .unwrap();
    let dims = GridDims::new(10, 10, 3);
    let mut rng = fastrand::Rng::with_seed(7);
    let mut grid = random_grid(7, dims);
    let mut map = RegionMap::new(config);
    map.init_regions(&grid);

    for _ in 0..60 {
        let pos = random_coord(&mut rng, dims);
        grid.set_tile(pos, random_tile(&mut rng));
        map.update_position(&grid, pos).unwrap();
        let reference = reference_components(&grid);
        assert_oracle_agrees(&mut map, &grid, &reference, &mut rng, 20);
    }
    assert_eq!(map.stats().cached_verdicts, 0);
}

#[test]
fn rebuilding_unchanged_grid_is_identical() {
    let grid = random_grid(11, GridDims::new(12, 9, 4));
    let first = build(&grid);
    let mut second = build(&grid);
    second.init_regions(&grid);
    for i in 0..grid.dims().volume() {
        assert_eq!(first.region_id_by_index(i), second.region_id_by_index(i));
    }
    assert!(first.regions().eq(second.regions()));
}

#[test]
fn clearing_then_restoring_any_tile_is_an_inverse() {
    let dims = GridDims::new(10, 10, 2);
    let original = random_grid(3, dims);
    let baseline = build(&original);

    let level0: Vec<TileCoord> = original
        .coords()
        .filter(|c| c.z == 0 && original.is_passable(*c))
        .collect();
    for pos in level0 {
        let mut grid = original.clone();
        let mut map = build(&grid);

        let saved = grid.get(pos);
        grid.set_tile(pos, Tile::WALL);
        map.update_position(&grid, pos).unwrap();
        assert_consistent(&map, &grid);

        grid.set_tile(pos, saved);
        map.update_position(&grid, pos).unwrap();
        // Same membership as before the removal, whatever the IDs are now.
        bijection(&map, &baseline);
        assert_consistent(&map, &grid);
    }
}

#[test]
fn bottleneck_split_and_restore() {
    let mut grid = TileGrid::from_ascii(&[
        "....#....", //
        "....#....", //
        ".........", //
        "....#....", //
        "....#....",
    ]);
    let mut map = build(&grid);
    let gap = TileCoord::new(4, 2, 0);
    let west = TileCoord::new(0, 0, 0);
    let east = TileCoord::new(8, 4, 0);
    assert!(map.check_connected(west, east).unwrap());

    grid.set_tile(gap, Tile::WALL);
    map.update_position(&grid, gap).unwrap();
    assert_eq!(map.stats().live, 2);
    assert!(!map.check_connected(west, east).unwrap());

    grid.set_tile(gap, Tile::FLOOR);
    map.update_position(&grid, gap).unwrap();
    assert_eq!(map.stats().live, 1);
    assert!(map.check_connected(west, east).unwrap());
    assert_eq!(map.region_id(west), map.region_id(east));
}

#[test]
fn scaffold_links_levels_like_a_stair() {
    let grid = TileGrid::from_ascii_levels(&[&["H#."], &["..#"], &["..."]]);
    let mut map = build(&grid);
    let bottom = map.region_id(TileCoord::new(0, 0, 0)).unwrap();
    let middle = map.region_id(TileCoord::new(1, 0, 1)).unwrap();
    assert!(map.region(bottom).unwrap().connections_to_region(middle).is_some());
    assert!(
        map.check_connected(TileCoord::new(0, 0, 0), TileCoord::new(1, 0, 1))
            .unwrap()
    );
    // Nothing on the middle level leads up to the top one.
    assert!(
        !map.check_connected(TileCoord::new(0, 0, 0), TileCoord::new(2, 0, 2))
            .unwrap()
    );
    assert!(
        !map.check_connected(TileCoord::new(2, 0, 0), TileCoord::new(0, 0, 0))
            .unwrap()
    );
}

#[test]
fn saved_grid_rebuilds_the_same_partition() {
    let grid = random_grid(21, GridDims::new(10, 10, 3));
    let map = build(&grid);

    let bytes = bincode::serialize(&grid).unwrap();
    let restored: TileGrid = bincode::deserialize(&bytes).unwrap();
    let rebuilt = build(&restored);

    for i in 0..grid.dims().volume() {
        assert_eq!(map.region_id_by_index(i), rebuilt.region_id_by_index(i));
    }
    assert!(map.regions().eq(rebuilt.regions()));
}

#[test]
fn parallel_rebuild_is_bit_identical() {
    for seed in 0..4 {
        let grid = random_grid(seed, GridDims::new(24, 24, 6));
        let serial = build(&grid);
        let mut parallel = RegionMap::default();
        parallel.init_regions(&grid);

        for i in 0..grid.dims().volume() {
            assert_eq!(serial.region_id_by_index(i), parallel.region_id_by_index(i));
        }
        assert!(serial.regions().eq(parallel.regions()));
        assert_eq!(serial.stats(), parallel.stats());
    }
}

#[test]
fn out_of_grid_coordinates_are_rejected() {
    let mut grid = TileGrid::from_ascii(&["..."]);
    let mut map = build(&grid);
    let outside = TileCoord::new(3, 0, 0);
    grid.set_tile(outside, Tile::FLOOR);
    assert!(map.update_position(&grid, outside).is_err());
    assert!(map.update_connected_regions(&grid, outside).is_err());
    assert!(map.check_connected(outside, TileCoord::new(0, 0, 0)).is_err());
    assert!(map.region_at(TileCoord::new(0, -1, 0)).is_err());
}
