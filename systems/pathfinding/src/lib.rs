#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* search over a Heartwood [`Grid`].
//!
//! The [`Pathfinder`] keeps a flat workspace with one search node per grid
//! cell. Each call to [`Pathfinder::find_path`] bumps a generation counter
//! instead of clearing the workspace, so nodes left over from an earlier
//! search are recognised as stale and reset the first time they are touched.
//! The grid is passed to every search, which lets attraction writers mutate
//! it between searches.

use std::{cmp::Ordering, collections::BinaryHeap};

use heartwood_core::CellCoord;
use heartwood_grid::Grid;
use tracing::trace;

/// Minimum-cost route between two cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    cells: Vec<CellCoord>,
    cost: f32,
}

impl Route {
    /// Cells from the start to the end, both inclusive.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Sum of the move costs of every cell entered along the route.
    #[must_use]
    pub const fn cost(&self) -> f32 {
        self.cost
    }

    /// Number of cells on the route, including the start.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the route holds no cells. Found routes never do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Consumes the route, yielding the ordered cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<CellCoord> {
        self.cells
    }
}

/// Stateful A* engine with a reusable per-cell workspace.
#[derive(Debug)]
pub struct Pathfinder {
    dimensions: (u32, u32),
    nodes: Vec<SearchNode>,
    open: BinaryHeap<OpenEntry>,
    neighbors: Vec<CellCoord>,
    portals: Vec<CellCoord>,
    generation: u32,
    sequence: u64,
    last_expanded: usize,
}

impl Pathfinder {
    /// Creates a pathfinder whose workspace is sized for the provided grid.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let mut pathfinder = Self {
            dimensions: (0, 0),
            nodes: Vec::new(),
            open: BinaryHeap::new(),
            neighbors: Vec::with_capacity(8),
            portals: Vec::new(),
            generation: 0,
            sequence: 0,
            last_expanded: 0,
        };
        pathfinder.prepare_workspace(grid);
        pathfinder
    }

    /// Number of nodes closed by the most recent search.
    #[must_use]
    pub const fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    /// Searches for the cheapest route from `start` to `end`.
    ///
    /// Entering a cell costs [`Grid::move_cost`] of that cell under the given
    /// attraction multiplier. Returns `None` when either endpoint is out of
    /// bounds or unwalkable, or when no route connects them. Among routes of
    /// equal cost the search prefers open nodes closer to the goal, then the
    /// earliest discovered, so results are deterministic.
    ///
    /// The heuristic is the Manhattan distance scaled by
    /// [`Grid::move_cost_floor`], which the grid answers in constant time.
    /// Custom links cap the estimate at one step past the nearest linked
    /// cell, so each touched node pays one distance check per linked cell.
    pub fn find_path(
        &mut self,
        grid: &Grid,
        start: CellCoord,
        end: CellCoord,
        attraction_multiplier: f32,
    ) -> Option<Route> {
        self.prepare_workspace(grid);
        self.begin_search();

        let start_index = walkable_index(grid, start)?;
        let end_index = walkable_index(grid, end)?;

        if start_index == end_index {
            return Some(Route {
                cells: vec![start],
                cost: 0.0,
            });
        }

        let mut portals = std::mem::take(&mut self.portals);
        portals.clear();
        portals.extend(grid.linked_cells());
        let estimate = Heuristic {
            goal: end,
            scale: heuristic_scale(grid, attraction_multiplier),
            portals: &portals,
        };

        let start_h = estimate.towards_goal(start);
        let generation = self.generation;
        self.nodes[start_index] = SearchNode {
            g: 0.0,
            h: start_h,
            parent: None,
            generation,
            closed: false,
        };
        self.push_open(start_index, start_h, start_h);

        let mut neighbors = std::mem::take(&mut self.neighbors);
        let mut found = false;

        while let Some(entry) = self.open.pop() {
            let current = entry.index;
            if self.nodes[current].closed {
                continue;
            }

            self.nodes[current].closed = true;
            self.last_expanded += 1;

            if current == end_index {
                found = true;
                break;
            }

            let current_g = self.nodes[current].g;
            let coord = self.coord_of(current);

            neighbors.clear();
            grid.for_each_neighbor(coord, true, |neighbor| neighbors.push(neighbor));

            for &neighbor in &neighbors {
                let Some(neighbor_index) = grid.index(neighbor.x(), neighbor.y()) else {
                    continue;
                };

                let step_cost = grid.move_cost(neighbor.x(), neighbor.y(), attraction_multiplier);
                if !step_cost.is_finite() {
                    continue;
                }

                let node = self.touch(neighbor_index, || estimate.towards_goal(neighbor));
                if node.closed {
                    continue;
                }

                let tentative = current_g + step_cost;
                if tentative < node.g {
                    node.g = tentative;
                    node.parent = Some(current);
                    let h = node.h;
                    self.push_open(neighbor_index, tentative + h, h);
                }
            }
        }

        self.neighbors = neighbors;
        self.portals = portals;
        trace!(
            start = %start,
            end = %end,
            expanded = self.last_expanded,
            found,
            "a* search finished"
        );

        if !found {
            return None;
        }

        Some(self.reconstruct(end_index))
    }

    fn prepare_workspace(&mut self, grid: &Grid) {
        let dimensions = (grid.width(), grid.height());
        if self.dimensions == dimensions && self.nodes.len() == grid.len() {
            return;
        }

        self.dimensions = dimensions;
        self.nodes.clear();
        self.nodes.resize(grid.len(), SearchNode::default());
        self.generation = 0;
    }

    fn begin_search(&mut self) {
        self.open.clear();
        self.sequence = 0;
        self.last_expanded = 0;
        self.generation = match self.generation.checked_add(1) {
            Some(next) => next,
            None => {
                for node in &mut self.nodes {
                    node.generation = 0;
                }
                1
            }
        };
    }

    fn touch<F>(&mut self, index: usize, heuristic: F) -> &mut SearchNode
    where
        F: FnOnce() -> f32,
    {
        let generation = self.generation;
        let node = &mut self.nodes[index];
        if node.generation != generation {
            *node = SearchNode {
                g: f32::INFINITY,
                h: heuristic(),
                parent: None,
                generation,
                closed: false,
            };
        }
        node
    }

    fn push_open(&mut self, index: usize, f: f32, h: f32) {
        self.open.push(OpenEntry {
            f,
            h,
            sequence: self.sequence,
            index,
        });
        self.sequence += 1;
    }

    fn reconstruct(&self, end_index: usize) -> Route {
        let mut cells = Vec::new();
        let mut cursor = Some(end_index);
        while let Some(index) = cursor {
            cells.push(self.coord_of(index));
            cursor = self.nodes[index].parent;
        }
        cells.reverse();

        Route {
            cells,
            cost: self.nodes[end_index].g,
        }
    }

    fn coord_of(&self, index: usize) -> CellCoord {
        let width = usize::try_from(self.dimensions.0).unwrap_or(1).max(1);
        let x = i32::try_from(index % width).unwrap_or(i32::MAX);
        let y = i32::try_from(index / width).unwrap_or(i32::MAX);
        CellCoord::new(x, y)
    }
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    g: f32,
    h: f32,
    parent: Option<usize>,
    generation: u32,
    closed: bool,
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            g: f32::INFINITY,
            h: 0.0,
            parent: None,
            generation: 0,
            closed: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    h: f32,
    sequence: u64,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the lowest f, then the lowest h.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

fn walkable_index(grid: &Grid, coord: CellCoord) -> Option<usize> {
    let cell = grid.cell_at(coord)?;
    if !cell.walkable() {
        return None;
    }
    grid.index(coord.x(), coord.y())
}

/// Consistent lower bound on the remaining cost to one goal.
struct Heuristic<'a> {
    goal: CellCoord,
    scale: f32,
    portals: &'a [CellCoord],
}

impl Heuristic<'_> {
    /// Manhattan steps to the goal, or to the nearest linked cell plus the
    /// jump out of it when that is shorter, times the per-step floor.
    fn towards_goal(&self, from: CellCoord) -> f32 {
        let steps = self
            .portals
            .iter()
            .map(|portal| from.manhattan_distance(*portal).saturating_add(1))
            .fold(from.manhattan_distance(self.goal), u32::min);
        steps as f32 * self.scale
    }
}

/// Per-step lower bound applied to the Manhattan heuristic.
///
/// Unit-cost grids keep the plain Manhattan distance. Attraction can push
/// step costs below one, so the scale shrinks to the grid's move cost floor.
fn heuristic_scale(grid: &Grid, attraction_multiplier: f32) -> f32 {
    grid.move_cost_floor(attraction_multiplier).min(1.0)
}
