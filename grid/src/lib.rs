#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative spatial map for Heartwood mazes.
//!
//! The [`Grid`] owns one [`Cell`] per tile and answers the high-frequency
//! queries issued by pathfinding and prop placement: bounds checks, cell
//! lookups, movement costs that fold in the attraction field, neighbor
//! expansion, and bounded flood fills. Invalid coordinates are an expected
//! outcome at the grid boundary, so every accessor degrades to `None`, an
//! empty collection, [`IMPASSABLE_COST`], or a silent no-op.

mod flood;

use std::collections::{BTreeSet, HashSet};

use heartwood_core::{
    CellCoord, Direction, TerrainKind, TerrainRaster, IMPASSABLE_COST, MIN_MOVE_COST,
};
use thiserror::Error;
use tracing::debug;

/// Errors raised when a grid cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Both dimensions must be at least one cell.
    #[error("grid dimensions must be positive (received {width}x{height})")]
    EmptyDimensions {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// Dimensions must be addressable with signed 32-bit coordinates.
    #[error("grid dimensions {width}x{height} exceed the addressable range")]
    TooLarge {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
}

/// A single tile of the grid with its walkability, costs and attraction.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    coord: CellCoord,
    walkable: bool,
    base_cost: f32,
    speed_multiplier: f32,
    attraction: f32,
    terrain: TerrainKind,
    links: Vec<CellCoord>,
}

impl Cell {
    fn with_terrain(coord: CellCoord, terrain: TerrainKind) -> Self {
        let mut cell = Self {
            coord,
            walkable: true,
            base_cost: 1.0,
            speed_multiplier: 1.0,
            attraction: 0.0,
            terrain,
            links: Vec::new(),
        };
        cell.apply_terrain(terrain);
        cell
    }

    fn apply_terrain(&mut self, terrain: TerrainKind) {
        let properties = terrain.properties();
        self.terrain = terrain;
        self.walkable = properties.walkable();
        self.base_cost = properties.base_cost();
        self.speed_multiplier = properties.speed_multiplier();
    }

    /// Coordinate of the cell within its grid.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Whether visitors may enter the cell.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Intrinsic traversal cost before attraction is applied.
    #[must_use]
    pub const fn base_cost(&self) -> f32 {
        self.base_cost
    }

    /// Terrain-derived movement speed scalar consumed by movement code.
    #[must_use]
    pub const fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Accumulated attraction; negative values repel.
    #[must_use]
    pub const fn attraction(&self) -> f32 {
        self.attraction
    }

    /// Terrain classification that produced the cell's properties.
    #[must_use]
    pub const fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    /// Custom adjacency links leaving this cell.
    #[must_use]
    pub fn links(&self) -> &[CellCoord] {
        &self.links
    }

    /// Effective cost of entering the cell under the provided attraction multiplier.
    ///
    /// Walkable cells always cost a finite amount in `[MIN_MOVE_COST, f32::MAX]`.
    /// An undefined product, such as infinite attraction under a zero
    /// multiplier, falls back to the base cost.
    #[must_use]
    pub fn move_cost(&self, attraction_multiplier: f32) -> f32 {
        if !self.walkable {
            return IMPASSABLE_COST;
        }

        let cost = self.base_cost - self.attraction * attraction_multiplier;
        if cost.is_nan() {
            return self.base_cost.clamp(MIN_MOVE_COST, f32::MAX);
        }
        cost.clamp(MIN_MOVE_COST, f32::MAX)
    }
}

/// Dense two-dimensional map of cells indexed by `(x, y)`.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    attraction_range: (f32, f32),
    cheapest_walkable_base: f32,
    link_sources: BTreeSet<CellCoord>,
}

impl Grid {
    /// Creates a grid of the provided dimensions with every cell set to [`TerrainKind::Path`].
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        Self::build(width, height, |_| TerrainKind::Path)
    }

    /// Creates a grid whose cells take their terrain from the provided raster.
    pub fn from_raster(raster: &TerrainRaster) -> Result<Self, GridError> {
        let grid = Self::build(raster.width(), raster.height(), |coord| {
            raster.get(coord).unwrap_or(TerrainKind::TreeBramble)
        })?;
        debug!(
            width = grid.width,
            height = grid.height,
            walkable = grid.cells.iter().filter(|cell| cell.walkable).count(),
            "built grid from terrain raster"
        );
        Ok(grid)
    }

    fn build<F>(width: u32, height: u32, mut terrain_at: F) -> Result<Self, GridError>
    where
        F: FnMut(CellCoord) -> TerrainKind,
    {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }

        let too_large = GridError::TooLarge { width, height };
        let columns = i32::try_from(width).map_err(|_| too_large)?;
        let rows = i32::try_from(height).map_err(|_| too_large)?;
        let capacity = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| too_large)?;

        let mut cells = Vec::with_capacity(capacity);
        for y in 0..rows {
            for x in 0..columns {
                let coord = CellCoord::new(x, y);
                cells.push(Cell::with_terrain(coord, terrain_at(coord)));
            }
        }

        let cheapest_walkable_base = cells
            .iter()
            .filter(|cell| cell.walkable)
            .map(|cell| cell.base_cost)
            .fold(f32::INFINITY, f32::min);

        Ok(Self {
            width,
            height,
            cells,
            attraction_range: (0.0, 0.0),
            cheapest_walkable_base,
            link_sources: BTreeSet::new(),
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells stored by the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid holds no cells. Constructed grids never do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether `(x, y)` lies inside `[0, width) × [0, height)`.
    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// Returns the cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).and_then(|index| self.cells.get(index))
    }

    /// Returns the cell at the provided coordinate, or `None` when out of bounds.
    #[must_use]
    pub fn cell_at(&self, coord: CellCoord) -> Option<&Cell> {
        self.cell(coord.x(), coord.y())
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let index = self.index(x, y)?;
        self.cells.get_mut(index)
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Flat row-major index of `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        let column = u32::try_from(x).ok()?;
        let row = u32::try_from(y).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Marks the cell walkable or blocked. No-op when out of bounds.
    pub fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) {
        let Some(cell) = self.cell_mut(x, y) else {
            return;
        };
        cell.walkable = walkable;
        let base_cost = cell.base_cost;
        if walkable {
            self.cheapest_walkable_base = self.cheapest_walkable_base.min(base_cost);
        }
    }

    /// Reclassifies the cell, deriving walkability, cost and speed from the terrain.
    pub fn set_terrain(&mut self, x: i32, y: i32, terrain: TerrainKind) {
        let Some(cell) = self.cell_mut(x, y) else {
            return;
        };
        cell.apply_terrain(terrain);
        if cell.walkable {
            let base_cost = cell.base_cost;
            self.cheapest_walkable_base = self.cheapest_walkable_base.min(base_cost);
        }
    }

    /// Adds `value` to the cell's attraction. No-op when out of bounds.
    pub fn add_attraction(&mut self, x: i32, y: i32, value: f32) {
        let Some(cell) = self.cell_mut(x, y) else {
            return;
        };
        cell.attraction += value;
        let attraction = cell.attraction;
        let (low, high) = self.attraction_range;
        self.attraction_range = (low.min(attraction), high.max(attraction));
    }

    /// Resets the attraction of every cell to zero.
    pub fn clear_all_attraction(&mut self) {
        for cell in &mut self.cells {
            cell.attraction = 0.0;
        }
        self.attraction_range = (0.0, 0.0);
    }

    /// Sum of the attraction stored across all cells.
    #[must_use]
    pub fn attraction_sum(&self) -> f32 {
        self.cells.iter().map(|cell| cell.attraction).sum()
    }

    /// Effective cost of entering `(x, y)`.
    ///
    /// Returns [`IMPASSABLE_COST`] for unwalkable or out-of-bounds cells and
    /// otherwise `max(base_cost - attraction * attraction_multiplier, MIN_MOVE_COST)`.
    /// A multiplier of zero ignores attraction and a negative multiplier turns
    /// lures into repellers.
    #[must_use]
    pub fn move_cost(&self, x: i32, y: i32, attraction_multiplier: f32) -> f32 {
        self.cell(x, y)
            .map_or(IMPASSABLE_COST, |cell| cell.move_cost(attraction_multiplier))
    }

    /// Lower bound on the cost of entering any walkable cell.
    ///
    /// Runs in constant time from bookkeeping kept by the mutators. The bound
    /// may trail the true minimum after cells are reclassified or attraction
    /// is overwritten, but it never exceeds it.
    #[must_use]
    pub fn move_cost_floor(&self, attraction_multiplier: f32) -> f32 {
        let (low, high) = self.attraction_range;
        let strongest_pull = (low * attraction_multiplier).max(high * attraction_multiplier);
        let floor = self.cheapest_walkable_base - strongest_pull;
        if floor.is_nan() {
            return MIN_MOVE_COST;
        }
        floor.clamp(MIN_MOVE_COST, f32::MAX)
    }

    /// Cells with at least one custom link leaving them, in coordinate order.
    pub fn linked_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.link_sources.iter().copied()
    }

    /// Connects `from` to `to` with a custom link, and `to` back to `from` when
    /// `bidirectional` is set. Links touching out-of-bounds cells are ignored.
    pub fn add_link(&mut self, from: CellCoord, to: CellCoord, bidirectional: bool) {
        if !self.in_bounds(from.x(), from.y()) || !self.in_bounds(to.x(), to.y()) || from == to {
            debug!(%from, %to, "ignoring custom link outside the grid");
            return;
        }

        self.push_link(from, to);
        if bidirectional {
            self.push_link(to, from);
        }
    }

    fn push_link(&mut self, from: CellCoord, to: CellCoord) {
        if let Some(cell) = self.cell_mut(from.x(), from.y()) {
            if !cell.links.contains(&to) {
                cell.links.push(to);
            }
            let _ = self.link_sources.insert(from);
        }
    }

    /// Removes every custom link leaving `(x, y)`.
    pub fn clear_links(&mut self, x: i32, y: i32) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.links.clear();
            let _ = self.link_sources.remove(&CellCoord::new(x, y));
        }
    }

    /// Walkable cells adjacent to `coord`.
    ///
    /// The four orthogonal neighbors come first in north, east, south, west
    /// order, followed by the cell's custom links when `include_custom_links`
    /// is set. Duplicates and unwalkable cells are never returned.
    #[must_use]
    pub fn neighbors(&self, coord: CellCoord, include_custom_links: bool) -> Vec<CellCoord> {
        let mut neighbors = Vec::with_capacity(4);
        self.for_each_neighbor(coord, include_custom_links, |neighbor| {
            neighbors.push(neighbor);
        });
        neighbors
    }

    /// Visits the same cells as [`Grid::neighbors`] without allocating.
    pub fn for_each_neighbor<F>(&self, coord: CellCoord, include_custom_links: bool, mut visit: F)
    where
        F: FnMut(CellCoord),
    {
        let Some(cell) = self.cell_at(coord) else {
            return;
        };

        let mut orthogonal = [None; 4];
        for (slot, direction) in orthogonal.iter_mut().zip(Direction::ALL) {
            let neighbor = coord.step(direction);
            if self.is_walkable(neighbor) {
                *slot = Some(neighbor);
                visit(neighbor);
            }
        }

        if !include_custom_links {
            return;
        }

        for (position, link) in cell.links.iter().enumerate() {
            if !self.is_walkable(*link) {
                continue;
            }
            if orthogonal.contains(&Some(*link)) || cell.links[..position].contains(link) {
                continue;
            }
            visit(*link);
        }
    }

    /// Cells reachable from the origin within `radius` Manhattan distance and
    /// `max_steps` breadth-first steps, following walkable cells and custom links.
    ///
    /// Returns an empty set when the origin is out of bounds or unwalkable.
    #[must_use]
    pub fn flood_fill_reachable(
        &self,
        origin_x: i32,
        origin_y: i32,
        radius: u32,
        max_steps: u32,
    ) -> HashSet<CellCoord> {
        flood::reachable(self, CellCoord::new(origin_x, origin_y), radius, max_steps)
    }

    /// Convenience form of [`Grid::flood_fill_reachable`] using one bound for
    /// both the radius and the step budget.
    #[must_use]
    pub fn flood_fill(&self, origin_x: i32, origin_y: i32, bound: u32) -> HashSet<CellCoord> {
        self.flood_fill_reachable(origin_x, origin_y, bound, bound)
    }

    fn is_walkable(&self, coord: CellCoord) -> bool {
        self.cell_at(coord).is_some_and(Cell::walkable)
    }
}
