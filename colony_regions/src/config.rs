// Region-map configuration.
//
// All tunables for the region subsystem live in `RegionConfig`, loaded from
// JSON alongside the rest of a game's config. None of the fields change the
// partition itself: a map built with any config yields the same region IDs
// and the same connectivity answers. They only trade memory and CPU.
//
// See also: `region_map.rs`, which reads the config on every rebuild and
// query.

use serde::{Deserialize, Serialize};

/// Region-map tunables. Loaded from JSON, never mutated by the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Label z-levels on the rayon pool during `init_regions`. The result is
    /// bit-identical to the serial path.
    pub parallel_init: bool,
    /// Memoize `check_connected_regions` answers.
    pub cache_connectivity: bool,
    /// Clear the connectivity cache once it holds this many entries.
    /// `None` lets it grow without bound.
    pub cache_capacity: Option<usize>,
    /// Record every tile relabeled by an incremental flood fill so the
    /// owner can drain them with `take_touched_tiles` (render invalidation).
    /// The list is unbounded: a host that turns this on must drain it every
    /// tick.
    pub record_touched_tiles: bool,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            parallel_init: true,
            cache_connectivity: true,
            cache_capacity: Some(65_536),
            record_touched_tiles: false,
        }
    }
}

impl RegionConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
