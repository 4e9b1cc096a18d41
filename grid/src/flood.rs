//! Bounded breadth-first reachability used by the grid.

use std::collections::{HashSet, VecDeque};

use heartwood_core::CellCoord;

use crate::Grid;

/// Collects the cells reachable from `origin` with a breadth-first search.
///
/// Expansion stops at cells whose Manhattan distance from the origin exceeds
/// `radius` and at cells that would need more than `max_steps` moves to reach.
/// Custom links are followed, so a linked cell may be reached in fewer steps
/// than its Manhattan distance suggests.
pub(crate) fn reachable(
    grid: &Grid,
    origin: CellCoord,
    radius: u32,
    max_steps: u32,
) -> HashSet<CellCoord> {
    let mut visited = HashSet::new();
    if !grid.cell_at(origin).is_some_and(|cell| cell.walkable()) {
        return visited;
    }

    let _ = visited.insert(origin);
    let mut queue = VecDeque::new();
    queue.push_back((origin, 0_u32));

    while let Some((cell, steps)) = queue.pop_front() {
        if steps >= max_steps {
            continue;
        }

        let next_steps = steps + 1;
        grid.for_each_neighbor(cell, true, |neighbor| {
            if origin.manhattan_distance(neighbor) > radius {
                return;
            }

            if visited.insert(neighbor) {
                queue.push_back((neighbor, next_steps));
            }
        });
    }

    visited
}
