// Flood fills over a single z-level of the tile-to-region array.
//
// Regions never span levels (vertical links are explicit edges), so every
// flood here works on one level's contiguous slice of the flat array,
// addressed by level-local index `x + y * dim_x`. Stepping to the row above
// or below is `index -/+ dim_x`.
//
// - `scanline_fill()`: relabel a connected component from one RegionId to
//   another, row span by row span. Used for the initial partition, merges,
//   and the new half of a split.
// - `label_plane()`: partition one whole level into components, numbering
//   them 1, 2, 3... in scan order. `init_regions` runs it per level (possibly
//   in parallel) and then offsets the numbers into global IDs.
// - `connected_within()`: bounded BFS answering "can `from` still reach `to`
//   inside this region?". Stops the moment the target is seen.
//
// **Critical constraint: determinism.** Seeds are visited in FIFO order and
// levels are scanned y-major, x-minor, so the same input always yields the
// same labels.

use crate::region::RegionId;
use std::collections::VecDeque;

/// Dimensions of one z-level.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlaneDims {
    pub dim_x: usize,
    pub dim_y: usize,
}

impl PlaneDims {
    pub fn area(self) -> usize {
        self.dim_x * self.dim_y
    }

    fn row_above(self, i: usize) -> Option<usize> {
        (i >= self.dim_x).then(|| i - self.dim_x)
    }

    fn row_below(self, i: usize) -> Option<usize> {
        (i + self.dim_x < self.area()).then(|| i + self.dim_x)
    }

    /// Up to four horizontal neighbors of `i`, without wrapping across rows.
    fn neighbors(self, i: usize) -> impl Iterator<Item = usize> {
        let x = i % self.dim_x;
        let west = (x > 0).then(|| i - 1);
        let east = (x + 1 < self.dim_x).then(|| i + 1);
        [self.row_above(i), east, self.row_below(i), west]
            .into_iter()
            .flatten()
    }
}

/// Relabel the component containing `seed` from `old` to `new`.
///
/// The seed itself is set to `new` unconditionally. A row span continues
/// through cells labeled `old` or already `new` (so a seed that was labeled
/// ahead of time does not stop the span) and only `old` cells are relabeled
/// and spread from. Cells of any third region are never touched.
/// `passable` is an extra gate on each cell; incremental callers pass
/// `|_| true` because labels already encode passability.
///
/// `touched` is called once for every cell whose label changed.
pub(crate) fn scanline_fill(
    plane: &mut [RegionId],
    dims: PlaneDims,
    seed: usize,
    old: RegionId,
    new: RegionId,
    passable: impl Fn(usize) -> bool,
    mut touched: impl FnMut(usize),
) {
    debug_assert_ne!(old, new);
    if plane[seed] != new {
        plane[seed] = new;
        touched(seed);
    }

    let mut queue = VecDeque::new();
    queue.push_back(seed);

    while let Some(start) = queue.pop_front() {
        let row_start = start - start % dims.dim_x;
        let row_end = row_start + dims.dim_x;

        // East from the seed (inclusive), then west from just before it.
        let mut span = Span {
            plane: &mut *plane,
            dims,
            old,
            new,
            passable: &passable,
            touched: &mut touched,
            queue: &mut queue,
        };
        span.run(start..row_end);
        span.run((row_start..start).rev());
    }
}

/// One horizontal pass of `scanline_fill`.
struct Span<'a, P, T> {
    plane: &'a mut [RegionId],
    dims: PlaneDims,
    old: RegionId,
    new: RegionId,
    passable: &'a P,
    touched: &'a mut T,
    queue: &'a mut VecDeque<usize>,
}

impl<P: Fn(usize) -> bool, T: FnMut(usize)> Span<'_, P, T> {
    fn run(&mut self, cells: impl Iterator<Item = usize>) {
        let mut above_added = false;
        let mut below_added = false;
        for i in cells {
            let label = self.plane[i];
            if (label != self.old && label != self.new) || !(self.passable)(i) {
                break;
            }
            if label == self.old {
                self.plane[i] = self.new;
                (self.touched)(i);
            }
            above_added = self.spread(self.dims.row_above(i), above_added);
            below_added = self.spread(self.dims.row_below(i), below_added);
        }
    }

    /// Seed the adjacent row at `next` unless this stretch of it was
    /// already seeded. Returns the new "already seeded" flag.
    fn spread(&mut self, next: Option<usize>, added: bool) -> bool {
        match next {
            Some(n) if self.plane[n] == self.old && (self.passable)(n) => {
                if !added {
                    self.plane[n] = self.new;
                    (self.touched)(n);
                    self.queue.push_back(n);
                }
                true
            }
            _ => false,
        }
    }
}

/// Partition a whole level into 4-connected components of passable cells.
///
/// Expects every cell to start as `RegionId::NONE`. Components are numbered
/// from 1 in scan order. Returns the number of components.
pub(crate) fn label_plane(
    plane: &mut [RegionId],
    dims: PlaneDims,
    passable: impl Fn(usize) -> bool,
) -> u32 {
    let mut count = 0u32;
    for i in 0..plane.len() {
        if plane[i].is_none() && passable(i) {
            count += 1;
            scanline_fill(plane, dims, i, RegionId::NONE, RegionId(count), &passable, |_| {});
        }
    }
    count
}

/// Reusable visited marks for `connected_within`.
///
/// Each search bumps the generation instead of clearing the buffer, so a
/// split check costs O(cells visited), not O(level area).
#[derive(Clone, Debug, Default)]
pub(crate) struct VisitStamps {
    stamps: Vec<u32>,
    generation: u32,
}

impl VisitStamps {
    fn begin(&mut self, len: usize) {
        if self.stamps.len() < len {
            self.stamps.resize(len, 0);
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamps.fill(0);
            self.generation = 1;
        }
    }

    /// Mark `i` visited. Returns `false` if it already was.
    fn visit(&mut self, i: usize) -> bool {
        if self.stamps[i] == self.generation {
            return false;
        }
        self.stamps[i] = self.generation;
        true
    }
}

/// Whether `to` is reachable from `from` through cells labeled `region`.
pub(crate) fn connected_within(
    plane: &[RegionId],
    dims: PlaneDims,
    from: usize,
    to: usize,
    region: RegionId,
    stamps: &mut VisitStamps,
) -> bool {
    if from == to {
        return true;
    }
    stamps.begin(plane.len());
    stamps.visit(from);
    let mut queue = VecDeque::new();
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for n in dims.neighbors(current) {
            if plane[n] != region || !stamps.visit(n) {
                continue;
            }
            if n == to {
                return true;
            }
            queue.push_back(n);
        }
    }
    false
}
