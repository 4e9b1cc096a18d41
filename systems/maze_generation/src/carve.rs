//! Raster carving primitives: disks, thick corridors and entrance tunnels.

use heartwood_core::{CellCoord, TerrainKind, TerrainRaster};

/// Carves a disk of the given corridor width centred on `center`.
///
/// Tiles within half the width become [`TerrainKind::Path`]. Tiles in the one
/// tile ring beyond that become [`TerrainKind::Undergrowth`], but only when
/// they are still solid or water; an existing path is never downgraded.
pub(crate) fn carve_disk(raster: &mut TerrainRaster, center: CellCoord, width: u32) {
    let inner = f64::from(width) / 2.0;
    let outer = inner + 1.0;
    let reach = outer.ceil() as i32;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let cell = CellCoord::new(center.x().saturating_add(dx), center.y().saturating_add(dy));
            let Some(current) = raster.get(cell) else {
                continue;
            };

            let distance = f64::from(dx * dx + dy * dy).sqrt();
            if distance <= inner {
                raster.set(cell, TerrainKind::Path);
            } else if distance <= outer
                && matches!(current, TerrainKind::TreeBramble | TerrainKind::Water)
            {
                raster.set(cell, TerrainKind::Undergrowth);
            }
        }
    }
}

/// Carves a thick corridor by stamping disks along the segment `from → to`.
///
/// Intermediate points are linearly interpolated and rounded, one per tile
/// of the longer axis, so consecutive stamps are always adjacent.
pub(crate) fn carve_corridor(
    raster: &mut TerrainRaster,
    from: CellCoord,
    to: CellCoord,
    width: u32,
) {
    let dx = i64::from(to.x()) - i64::from(from.x());
    let dy = i64::from(to.y()) - i64::from(from.y());
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        carve_disk(raster, from, width);
        return;
    }

    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        let x = f64::from(from.x()) + (dx as f64 * t).round();
        let y = f64::from(from.y()) + (dy as f64 * t).round();
        carve_disk(raster, CellCoord::new(x as i32, y as i32), width);
    }
}

/// Border tile closest to `junction`, checking left, right, top, then bottom.
///
/// A junction outside the raster is first clamped onto it, so the result is
/// always a raster tile.
pub(crate) fn nearest_border(raster: &TerrainRaster, junction: CellCoord) -> CellCoord {
    let right_edge = i32::try_from(raster.width())
        .unwrap_or(i32::MAX)
        .saturating_sub(1)
        .max(0);
    let bottom_edge = i32::try_from(raster.height())
        .unwrap_or(i32::MAX)
        .saturating_sub(1)
        .max(0);
    let junction = CellCoord::new(
        junction.x().clamp(0, right_edge),
        junction.y().clamp(0, bottom_edge),
    );

    let candidates = [
        (junction.x(), CellCoord::new(0, junction.y())),
        (right_edge - junction.x(), CellCoord::new(right_edge, junction.y())),
        (junction.y(), CellCoord::new(junction.x(), 0)),
        (bottom_edge - junction.y(), CellCoord::new(junction.x(), bottom_edge)),
    ];

    candidates
        .into_iter()
        .min_by_key(|(distance, _)| *distance)
        .map_or(junction, |(_, border)| border)
}
