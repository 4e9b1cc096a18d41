//! Coarse junction graph carved before any tiles are touched.

use std::collections::BTreeSet;

use heartwood_core::{CellCoord, Direction};
use rand::{seq::SliceRandom, Rng};

/// Junction of the coarse maze graph addressed by column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct MazeCell {
    column: u32,
    row: u32,
}

impl MazeCell {
    pub(crate) const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Undirected corridor between two adjacent junctions.
///
/// Endpoints are stored in ascending order so `A–B` and `B–A` compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct MazeEdge {
    first: MazeCell,
    second: MazeCell,
}

impl MazeEdge {
    pub(crate) fn new(a: MazeCell, b: MazeCell) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub(crate) const fn endpoints(&self) -> (MazeCell, MazeCell) {
        (self.first, self.second)
    }
}

/// Spanning tree plus loop edges over a `columns × rows` lattice of junctions.
#[derive(Clone, Debug)]
pub(crate) struct CoarseMaze {
    columns: u32,
    rows: u32,
    spacing: u32,
    last_tile: (u32, u32),
    edges: BTreeSet<MazeEdge>,
    entrances: Vec<MazeCell>,
}

impl CoarseMaze {
    /// Lays out the junction lattice for a raster of the given size.
    ///
    /// Junctions sit `spacing` tiles apart, centred inside their coarse cell
    /// and inset by one tile from the raster border. A lone junction on a
    /// raster narrower than one coarse cell is pulled back onto the raster.
    pub(crate) fn new(width: u32, height: u32, spacing: u32) -> Self {
        let spacing = spacing.max(1);
        Self {
            columns: (width.saturating_sub(2) / spacing).max(1),
            rows: (height.saturating_sub(2) / spacing).max(1),
            spacing,
            last_tile: (width.saturating_sub(1), height.saturating_sub(1)),
            edges: BTreeSet::new(),
            entrances: Vec::new(),
        }
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = &MazeEdge> {
        self.edges.iter()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn entrances(&self) -> &[MazeCell] {
        &self.entrances
    }

    /// Junctions in row-major order.
    pub(crate) fn junctions(&self) -> impl Iterator<Item = MazeCell> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| MazeCell::new(column, row))
        })
    }

    /// Fine-raster position of a junction.
    pub(crate) fn position(&self, cell: MazeCell) -> CellCoord {
        let half = self.spacing / 2;
        let x = 1_u32
            .saturating_add(cell.column.saturating_mul(self.spacing))
            .saturating_add(half);
        let y = 1_u32
            .saturating_add(cell.row.saturating_mul(self.spacing))
            .saturating_add(half);
        let (x, y) = (x.min(self.last_tile.0), y.min(self.last_tile.1));
        CellCoord::new(
            i32::try_from(x).unwrap_or(i32::MAX),
            i32::try_from(y).unwrap_or(i32::MAX),
        )
    }

    /// Carves a spanning tree with a randomised depth-first search.
    ///
    /// Each visited junction shuffles its unvisited neighbors once and
    /// descends into them in that order, skipping any visited meanwhile.
    pub(crate) fn carve_spanning_tree<R: Rng>(&mut self, rng: &mut R) {
        let mut visited = vec![false; self.junction_count()];
        let start = self.random_junction(rng);
        self.mark(&mut visited, start);

        let mut stack = vec![Frame {
            cell: start,
            neighbors: self.shuffled_unvisited(start, &visited, rng),
            cursor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&candidate) = frame.neighbors.get(frame.cursor) else {
                let _ = stack.pop();
                continue;
            };
            frame.cursor += 1;
            let parent = frame.cell;

            if self.is_visited(&visited, candidate) {
                continue;
            }

            self.mark(&mut visited, candidate);
            let _ = self.edges.insert(MazeEdge::new(parent, candidate));
            let neighbors = self.shuffled_unvisited(candidate, &visited, rng);
            stack.push(Frame {
                cell: candidate,
                neighbors,
                cursor: 0,
            });
        }
    }

    /// Adds `max(1, junctions / 10)` random edges between adjacent junctions.
    ///
    /// Picks that fall off the lattice or repeat an existing edge are absorbed.
    pub(crate) fn add_loop_edges<R: Rng>(&mut self, rng: &mut R) {
        let attempts = (self.junction_count() / 10).max(1);
        for _ in 0..attempts {
            let cell = self.random_junction(rng);
            let direction = Direction::ALL[rng.gen_range(0..4_u32) as usize];
            if let Some(neighbor) = self.neighbor(cell, direction) {
                let _ = self.edges.insert(MazeEdge::new(cell, neighbor));
            }
        }
    }

    /// Chooses up to `requested` distinct border junctions as entrances.
    pub(crate) fn choose_entrances<R: Rng>(&mut self, requested: u32, rng: &mut R) {
        let mut border: Vec<MazeCell> = self
            .junctions()
            .filter(|cell| {
                cell.column == 0
                    || cell.row == 0
                    || cell.column + 1 == self.columns
                    || cell.row + 1 == self.rows
            })
            .collect();
        border.shuffle(rng);

        let count = usize::try_from(requested).unwrap_or(usize::MAX).min(border.len());
        border.truncate(count);
        self.entrances = border;
    }

    fn random_junction<R: Rng>(&self, rng: &mut R) -> MazeCell {
        MazeCell::new(rng.gen_range(0..self.columns), rng.gen_range(0..self.rows))
    }

    fn junction_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    fn offset(&self, cell: MazeCell) -> usize {
        let row = usize::try_from(cell.row).unwrap_or(usize::MAX);
        let column = usize::try_from(cell.column).unwrap_or(usize::MAX);
        let columns = usize::try_from(self.columns).unwrap_or(usize::MAX);
        row.saturating_mul(columns).saturating_add(column)
    }

    fn mark(&self, visited: &mut [bool], cell: MazeCell) {
        if let Some(slot) = visited.get_mut(self.offset(cell)) {
            *slot = true;
        }
    }

    fn is_visited(&self, visited: &[bool], cell: MazeCell) -> bool {
        visited.get(self.offset(cell)).copied().unwrap_or(true)
    }

    fn neighbor(&self, cell: MazeCell, direction: Direction) -> Option<MazeCell> {
        let (dx, dy) = direction.offset();
        let column = cell.column.checked_add_signed(dx)?;
        let row = cell.row.checked_add_signed(dy)?;
        (column < self.columns && row < self.rows).then_some(MazeCell::new(column, row))
    }

    fn shuffled_unvisited<R: Rng>(
        &self,
        cell: MazeCell,
        visited: &[bool],
        rng: &mut R,
    ) -> Vec<MazeCell> {
        let mut neighbors: Vec<MazeCell> = Direction::ALL
            .iter()
            .filter_map(|direction| self.neighbor(cell, *direction))
            .filter(|neighbor| !self.is_visited(visited, *neighbor))
            .collect();
        neighbors.shuffle(rng);
        neighbors
    }
}

#[derive(Debug)]
struct Frame {
    cell: MazeCell,
    neighbors: Vec<MazeCell>,
    cursor: usize,
}
