//! Water features grown inside the solid mass left between corridors.

use heartwood_core::{CellCoord, Direction, TerrainKind, TerrainRaster};
use rand::Rng;

const WALK_LENGTH_MIN: u32 = 10;
const WALK_LENGTH_MAX: u32 = 40;
const SHORE_PROBABILITY: f64 = 0.02;

/// Converts about `coverage` of the remaining solid tiles into water.
///
/// Random walks of 10 to 39 steps start from random solid tiles and turn
/// every solid tile they visit into water. Walks only move through solid or
/// water tiles, so corridors are never crossed or flooded. Returns the
/// number of tiles converted, which never exceeds the target.
pub(crate) fn grow_water<R: Rng>(raster: &mut TerrainRaster, coverage: f32, rng: &mut R) -> usize {
    let mut candidates: Vec<CellCoord> = raster
        .iter()
        .filter(|(_, kind)| kind.is_solid())
        .map(|(cell, _)| cell)
        .collect();
    let target = (f64::from(coverage) * candidates.len() as f64) as usize;

    let mut converted = 0;
    while converted < target && !candidates.is_empty() {
        let bound = u32::try_from(candidates.len()).unwrap_or(u32::MAX);
        let pick = rng.gen_range(0..bound) as usize;
        let start = candidates[pick];
        if !is_solid(raster, start) {
            let _ = candidates.swap_remove(pick);
            continue;
        }

        let length = rng.gen_range(WALK_LENGTH_MIN..WALK_LENGTH_MAX);
        let mut cursor = start;
        for _ in 0..length {
            if is_solid(raster, cursor) {
                raster.set(cursor, TerrainKind::Water);
                converted += 1;
                if converted >= target {
                    break;
                }
            }

            let mut options = [cursor; 4];
            let mut count = 0;
            for direction in Direction::ALL {
                let next = cursor.step(direction);
                if matches!(
                    raster.get(next),
                    Some(TerrainKind::TreeBramble | TerrainKind::Water)
                ) {
                    options[count] = next;
                    count += 1;
                }
            }
            if count == 0 {
                break;
            }

            let bound = u32::try_from(count).unwrap_or(1);
            cursor = options[rng.gen_range(0..bound) as usize];
        }
    }

    converted
}

/// Lets water hug corridor edges by flooding a few solid tiles next to open ground.
///
/// Every solid tile orthogonally adjacent to a path or undergrowth tile turns
/// into water with a small independent probability. Returns the number of
/// tiles converted.
pub(crate) fn scatter_shoreline<R: Rng>(raster: &mut TerrainRaster, rng: &mut R) -> usize {
    let shore: Vec<CellCoord> = raster
        .iter()
        .filter(|(cell, kind)| kind.is_solid() && touches_open_ground(raster, *cell))
        .map(|(cell, _)| cell)
        .collect();

    let mut converted = 0;
    for cell in shore {
        if rng.gen_bool(SHORE_PROBABILITY) {
            raster.set(cell, TerrainKind::Water);
            converted += 1;
        }
    }
    converted
}

fn is_solid(raster: &TerrainRaster, cell: CellCoord) -> bool {
    raster.get(cell).is_some_and(TerrainKind::is_solid)
}

fn touches_open_ground(raster: &TerrainRaster, cell: CellCoord) -> bool {
    Direction::ALL.iter().any(|direction| {
        matches!(
            raster.get(cell.step(*direction)),
            Some(TerrainKind::Path | TerrainKind::Undergrowth)
        )
    })
}
