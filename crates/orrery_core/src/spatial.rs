//! Uniform grid index over body positions.
//!
//! The index is a snapshot: it records which cell every body occupied at
//! build time and is never patched afterwards. The engine rebuilds it after
//! each tick so that it always matches the committed positions.
//!
//! Neighbor queries scan the 3×3 block of cells around a body. With a cell
//! size on the order of the interaction range, that keeps per-body work
//! proportional to local density instead of population size.
//!
//! Bodies are always filed under their true cell. Cells covering the plane
//! live in a dense row-major grid; a body that has drifted past an edge is
//! filed in a sparse side map under its real coordinates, so it only ever
//! meets bodies in the adjacent cells.

use std::collections::HashMap;

use glam::DVec2;

use crate::body::{Body, BodyId};
use crate::config::{validate_grid, Plane};
use crate::error::Result;

/// Upper bound on the number of buckets a grid may allocate.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Number of columns and rows covering `plane`, including the far edges.
pub fn grid_dimensions(cell_size: f64, plane: Plane) -> (usize, usize) {
    let cols = (plane.width / cell_size).floor() as usize;
    let rows = (plane.height / cell_size).floor() as usize;
    (cols.saturating_add(1), rows.saturating_add(1))
}

/// Grid cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i64,
    pub y: i64,
}

impl CellCoord {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// This cell and its 8 surrounding cells, row by row.
    pub fn block(&self) -> [CellCoord; 9] {
        let (left, right) = (self.x.saturating_sub(1), self.x.saturating_add(1));
        let (below, above) = (self.y.saturating_sub(1), self.y.saturating_add(1));
        [
            CellCoord::new(left, below),
            CellCoord::new(self.x, below),
            CellCoord::new(right, below),
            CellCoord::new(left, self.y),
            CellCoord::new(self.x, self.y),
            CellCoord::new(right, self.y),
            CellCoord::new(left, above),
            CellCoord::new(self.x, above),
            CellCoord::new(right, above),
        ]
    }
}

/// Bucket occupancy summary, logged by the runtime's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Occupancy {
    pub occupied_cells: usize,
    pub largest_bucket: usize,
    /// Bodies filed outside the plane's grid.
    pub off_grid: usize,
}

/// Spatial grid of body ids, keyed by cell.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cols: usize,
    rows: usize,
    /// Row-major buckets: `cells[y * cols + x]`.
    cells: Vec<Vec<BodyId>>,
    /// Buckets for cells past the plane edges, keyed by true coordinates.
    off_grid: HashMap<CellCoord, Vec<BodyId>>,
    /// Cell each body was filed under, by body index.
    homes: Vec<CellCoord>,
}

impl SpatialIndex {
    /// Build an index of `bodies` over `plane`.
    ///
    /// Fails if the cell size or plane is non-positive, or if the grid would
    /// be unreasonably large.
    pub fn build(bodies: &[Body], cell_size: f64, plane: Plane) -> Result<Self> {
        validate_grid(cell_size, plane)?;
        let (cols, rows) = grid_dimensions(cell_size, plane);
        let mut index = Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            off_grid: HashMap::new(),
            homes: Vec::with_capacity(bodies.len()),
        };
        index.rebuild(bodies);
        Ok(index)
    }

    /// Replace the snapshot with `bodies`, keeping the grid geometry and
    /// bucket allocations.
    pub fn rebuild(&mut self, bodies: &[Body]) {
        for bucket in &mut self.cells {
            bucket.clear();
        }
        self.off_grid.clear();
        self.homes.clear();

        for (i, body) in bodies.iter().enumerate() {
            let cell = self.cell_of(body.position);
            match self.slot(cell) {
                Some(slot) => self.cells[slot].push(BodyId(i)),
                None => self.off_grid.entry(cell).or_default().push(BodyId(i)),
            }
            self.homes.push(cell);
        }
    }

    /// Cell containing `position`, by floor division. Positions off the plane
    /// give coordinates outside the grid.
    pub fn cell_of(&self, position: DVec2) -> CellCoord {
        let x = (position.x / self.cell_size).floor() as i64;
        let y = (position.y / self.cell_size).floor() as i64;
        CellCoord::new(x, y)
    }

    /// Cell `id` was filed under when the snapshot was taken.
    pub fn home_cell(&self, id: BodyId) -> Option<CellCoord> {
        self.homes.get(id.0).copied()
    }

    /// Bodies filed under `cell`; empty for cells nobody occupies.
    pub fn bucket(&self, cell: CellCoord) -> &[BodyId] {
        match self.slot(cell) {
            Some(slot) => &self.cells[slot],
            None => match self.off_grid.get(&cell) {
                Some(bucket) => bucket,
                None => &[],
            },
        }
    }

    /// Every body in the 3×3 block around `id`'s cell, except `id` itself.
    ///
    /// Each call starts a fresh scan. Unknown ids yield nothing.
    pub fn neighbors_of(&self, id: BodyId) -> Neighbors<'_> {
        match self.home_cell(id) {
            Some(cell) => Neighbors::new(self, cell, Some(id)),
            None => Neighbors::exhausted(self),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// `(columns, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Number of indexed bodies.
    pub fn len(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }

    pub fn occupancy(&self) -> Occupancy {
        let off_grid = self.off_grid.values().map(Vec::len).sum();
        self.cells
            .iter()
            .chain(self.off_grid.values())
            .filter(|bucket| !bucket.is_empty())
            .fold(
                Occupancy {
                    off_grid,
                    ..Occupancy::default()
                },
                |acc, bucket| Occupancy {
                    occupied_cells: acc.occupied_cells + 1,
                    largest_bucket: acc.largest_bucket.max(bucket.len()),
                    ..acc
                },
            )
    }

    fn slot(&self, cell: CellCoord) -> Option<usize> {
        let in_bounds =
            (0..self.cols as i64).contains(&cell.x) && (0..self.rows as i64).contains(&cell.y);
        in_bounds.then(|| cell.y as usize * self.cols + cell.x as usize)
    }
}

/// Lazy neighbor scan over a 3×3 cell block.
pub struct Neighbors<'a> {
    index: &'a SpatialIndex,
    exclude: Option<BodyId>,
    block: [CellCoord; 9],
    next_cell: usize,
    current: std::slice::Iter<'a, BodyId>,
}

impl<'a> Neighbors<'a> {
    fn new(index: &'a SpatialIndex, center: CellCoord, exclude: Option<BodyId>) -> Self {
        let empty: &'a [BodyId] = &[];
        Self {
            index,
            exclude,
            block: center.block(),
            next_cell: 0,
            current: empty.iter(),
        }
    }

    fn exhausted(index: &'a SpatialIndex) -> Self {
        let mut neighbors = Self::new(index, CellCoord::new(0, 0), None);
        neighbors.next_cell = neighbors.block.len();
        neighbors
    }
}

impl Iterator for Neighbors<'_> {
    type Item = BodyId;

    fn next(&mut self) -> Option<BodyId> {
        loop {
            for &id in self.current.by_ref() {
                if Some(id) != self.exclude {
                    return Some(id);
                }
            }
            let cell = *self.block.get(self.next_cell)?;
            self.next_cell += 1;
            self.current = self.index.bucket(cell).iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f64, y: f64) -> Body {
        Body::at_rest(DVec2::new(x, y), 1.0).unwrap()
    }

    fn index(bodies: &[Body]) -> SpatialIndex {
        SpatialIndex::build(bodies, 100.0, Plane::new(800.0, 500.0)).unwrap()
    }

    fn sorted(neighbors: Neighbors<'_>) -> Vec<usize> {
        let mut ids: Vec<_> = neighbors.map(BodyId::index).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn dimensions_cover_far_edges() {
        let idx = index(&[]);
        assert_eq!(idx.dimensions(), (9, 6));
        assert!(idx.is_empty());

        let idx = SpatialIndex::build(&[], 30.0, Plane::new(100.0, 100.0)).unwrap();
        assert_eq!(idx.dimensions(), (4, 4));
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(SpatialIndex::build(&[], 0.0, Plane::default()).is_err());
        assert!(SpatialIndex::build(&[], -5.0, Plane::default()).is_err());
        assert!(SpatialIndex::build(&[], 10.0, Plane::new(0.0, 10.0)).is_err());
    }

    #[test]
    fn same_and_adjacent_cells_are_neighbors_exactly_once() {
        // cells (0,0), (1,0), (1,1) and (2,0)
        let bodies = [
            body(10.0, 50.0),
            body(190.0, 50.0),
            body(150.0, 150.0),
            body(250.0, 50.0),
        ];
        let idx = index(&bodies);

        assert_eq!(sorted(idx.neighbors_of(BodyId(0))), vec![1, 2]);
        assert_eq!(sorted(idx.neighbors_of(BodyId(1))), vec![0, 2, 3]);
        assert_eq!(sorted(idx.neighbors_of(BodyId(3))), vec![1, 2]);
    }

    #[test]
    fn bodies_two_cells_away_are_excluded() {
        let bodies = [body(50.0, 50.0), body(250.0, 50.0), body(50.0, 250.0)];
        let idx = index(&bodies);
        assert!(sorted(idx.neighbors_of(BodyId(0))).is_empty());
    }

    #[test]
    fn coincident_bodies_see_each_other_but_not_themselves() {
        let bodies = [body(420.0, 240.0), body(420.0, 240.0)];
        let idx = index(&bodies);
        assert_eq!(sorted(idx.neighbors_of(BodyId(0))), vec![1]);
        assert_eq!(sorted(idx.neighbors_of(BodyId(1))), vec![0]);
    }

    #[test]
    fn corner_queries_skip_missing_cells() {
        let bodies = [
            body(0.0, 0.0),
            body(150.0, 150.0),
            body(799.0, 499.0),
            body(700.0, 400.0),
        ];
        let idx = index(&bodies);
        assert_eq!(sorted(idx.neighbors_of(BodyId(0))), vec![1]);
        assert_eq!(sorted(idx.neighbors_of(BodyId(2))), vec![3]);
    }

    #[test]
    fn boundary_positions_use_floor() {
        let idx = index(&[body(100.0, 200.0)]);
        assert_eq!(idx.home_cell(BodyId(0)), Some(CellCoord::new(1, 2)));
        assert_eq!(idx.cell_of(DVec2::new(99.999, 0.0)), CellCoord::new(0, 0));
        assert_eq!(idx.cell_of(DVec2::new(800.0, 500.0)), CellCoord::new(8, 5));
    }

    #[test]
    fn off_plane_positions_keep_their_true_cell() {
        let bodies = [body(-40.0, 250.0), body(30.0, 250.0), body(900.0, -10.0)];
        let idx = index(&bodies);
        assert_eq!(idx.home_cell(BodyId(0)), Some(CellCoord::new(-1, 2)));
        assert_eq!(idx.home_cell(BodyId(2)), Some(CellCoord::new(9, -1)));
        assert_eq!(idx.bucket(CellCoord::new(9, -1)), &[BodyId(2)]);
        assert_eq!(sorted(idx.neighbors_of(BodyId(0))), vec![1]);
        assert!(sorted(idx.neighbors_of(BodyId(2))).is_empty());
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.occupancy().off_grid, 2);
    }

    #[test]
    fn body_below_the_plane_only_meets_the_bottom_row() {
        // rows -1, 1 and 0
        let bodies = [body(50.0, -0.5), body(50.0, 199.0), body(50.0, 50.0)];
        let idx = index(&bodies);
        assert_eq!(sorted(idx.neighbors_of(BodyId(0))), vec![2]);
        assert_eq!(sorted(idx.neighbors_of(BodyId(1))), vec![2]);
        assert_eq!(sorted(idx.neighbors_of(BodyId(2))), vec![0, 1]);
    }

    #[test]
    fn far_off_positions_do_not_overflow() {
        let bodies = [body(f64::MAX, -f64::MAX), body(10.0, 10.0)];
        let idx = index(&bodies);
        assert!(sorted(idx.neighbors_of(BodyId(0))).is_empty());
        assert!(sorted(idx.neighbors_of(BodyId(1))).is_empty());
    }

    #[test]
    fn queries_are_restartable() {
        let bodies = [body(10.0, 10.0), body(20.0, 20.0), body(30.0, 30.0)];
        let idx = index(&bodies);
        let first = sorted(idx.neighbors_of(BodyId(1)));
        let second = sorted(idx.neighbors_of(BodyId(1)));
        assert_eq!(first, vec![0, 2]);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_id_yields_nothing() {
        let idx = index(&[body(10.0, 10.0)]);
        assert_eq!(idx.neighbors_of(BodyId(7)).count(), 0);
        assert_eq!(idx.neighbors_of(BodyId(0)).count(), 0);
    }

    #[test]
    fn rebuild_replaces_snapshot() {
        let mut bodies = vec![body(10.0, 10.0), body(20.0, 20.0)];
        let mut idx = index(&bodies);
        assert_eq!(idx.neighbors_of(BodyId(0)).count(), 1);

        bodies[1].position = DVec2::new(500.0, 400.0);
        idx.rebuild(&bodies);
        assert_eq!(idx.neighbors_of(BodyId(0)).count(), 0);
        assert_eq!(idx.home_cell(BodyId(1)), Some(CellCoord::new(5, 4)));
        assert_eq!(
            idx.occupancy(),
            Occupancy {
                occupied_cells: 2,
                largest_bucket: 1,
                off_grid: 0,
            }
        );
    }
}
