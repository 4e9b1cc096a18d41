use heartwood_core::{CellCoord, TerrainKind, TerrainRaster, IMPASSABLE_COST, MIN_MOVE_COST};
use heartwood_grid::{Grid, GridError};

const TERRAINS: [TerrainKind; 4] = [
    TerrainKind::Path,
    TerrainKind::Undergrowth,
    TerrainKind::TreeBramble,
    TerrainKind::Water,
];

fn mixed_grid() -> Grid {
    let mut grid = Grid::new(8, 8).expect("valid dimensions");
    for y in 0..8 {
        for x in 0..8 {
            grid.set_terrain(x, y, TERRAINS[((x * 3 + y) % 4) as usize]);
        }
    }
    grid
}

#[test]
fn move_cost_never_drops_below_floor() {
    let attractions = [
        -1.0e38, -1.0e6, -25.0, -1.0, -0.3, 0.0, 0.25, 0.9, 1.0, 7.5, 1.0e6, 1.0e38,
    ];
    let multipliers = [-10.0, -2.0, -1.0, 0.0, 0.5, 1.0, 3.0, 10.0];

    for attraction in attractions {
        let mut grid = mixed_grid();
        for y in 0..8 {
            for x in 0..8 {
                grid.add_attraction(x, y, attraction);
            }
        }

        for multiplier in multipliers {
            for cell in grid.cells() {
                let coord = cell.coord();
                let cost = grid.move_cost(coord.x(), coord.y(), multiplier);
                if cell.walkable() {
                    assert!(
                        cost >= MIN_MOVE_COST,
                        "cost {cost} at {coord} with attraction {attraction} x {multiplier}"
                    );
                    assert!(cost.is_finite());
                } else {
                    assert_eq!(cost, IMPASSABLE_COST);
                }
            }
        }
    }
}

#[test]
fn overflowing_attraction_keeps_costs_finite() {
    let mut grid = Grid::new(3, 1).expect("valid dimensions");
    grid.add_attraction(0, 0, 1.0e38);
    grid.add_attraction(1, 0, 1.0e38);
    grid.add_attraction(1, 0, 1.0e38);
    grid.add_attraction(1, 0, 1.0e38);
    grid.add_attraction(1, 0, 1.0e38);
    grid.add_attraction(2, 0, f32::NAN);

    assert_eq!(grid.move_cost(0, 0, -10.0), f32::MAX);
    assert_eq!(grid.move_cost(0, 0, 10.0), MIN_MOVE_COST);
    assert!(grid.cell(1, 0).expect("in bounds").attraction().is_infinite());
    assert_eq!(grid.move_cost(1, 0, 0.0), 1.0);
    assert_eq!(grid.move_cost(1, 0, -1.0), f32::MAX);
    assert_eq!(grid.move_cost(2, 0, 1.0), 1.0);
    assert!(grid.move_cost_floor(-10.0) <= grid.move_cost(2, 0, -10.0));
}

#[test]
fn out_of_bounds_queries_are_inert() {
    let mut grid = Grid::new(4, 3).expect("valid dimensions");
    let outside = [(-1, 0), (0, -1), (4, 0), (0, 3), (i32::MIN, i32::MAX)];

    for (x, y) in outside {
        assert!(!grid.in_bounds(x, y));
        assert!(grid.cell(x, y).is_none());
        assert!(grid.index(x, y).is_none());
        assert_eq!(grid.move_cost(x, y, 1.0), IMPASSABLE_COST);
        assert!(grid.flood_fill(x, y, 10).is_empty());

        grid.set_walkable(x, y, false);
        grid.set_terrain(x, y, TerrainKind::Water);
        grid.add_attraction(x, y, 5.0);
    }

    assert_eq!(grid.cells().filter(|cell| cell.walkable()).count(), 12);
    assert_eq!(grid.attraction_sum(), 0.0);
}

#[test]
fn clearing_attraction_restores_fresh_costs() {
    let fresh = mixed_grid();
    let mut lured = mixed_grid();
    lured.add_attraction(1, 1, 0.7);
    lured.add_attraction(1, 1, 0.7);
    lured.add_attraction(5, 2, -4.0);
    lured.add_attraction(6, 6, 100.0);

    lured.clear_all_attraction();
    lured.clear_all_attraction();

    for (before, after) in fresh.cells().zip(lured.cells()) {
        let coord = before.coord();
        for multiplier in [-1.0, 0.0, 1.0, 2.5] {
            assert_eq!(
                fresh.move_cost(coord.x(), coord.y(), multiplier),
                lured.move_cost(coord.x(), coord.y(), multiplier)
            );
        }
        assert_eq!(after.attraction(), 0.0);
    }
    assert_eq!(lured.attraction_sum(), 0.0);
}

#[test]
fn raster_construction_mirrors_terrain_table() {
    let mut raster = TerrainRaster::filled(4, 1, TerrainKind::Path);
    raster.set(CellCoord::new(1, 0), TerrainKind::Undergrowth);
    raster.set(CellCoord::new(2, 0), TerrainKind::TreeBramble);
    raster.set(CellCoord::new(3, 0), TerrainKind::Water);

    let grid = Grid::from_raster(&raster).expect("valid raster");

    for (x, terrain) in (0..4).zip(TERRAINS) {
        let cell = grid.cell(x, 0).expect("in bounds");
        let properties = terrain.properties();
        assert_eq!(cell.terrain(), terrain);
        assert_eq!(cell.walkable(), properties.walkable());
        assert_eq!(cell.base_cost(), properties.base_cost());
        assert_eq!(cell.speed_multiplier(), properties.speed_multiplier());
    }
    assert_eq!(grid.move_cost(1, 0, 1.0), 2.0);
}

#[test]
fn zero_sized_grids_are_rejected() {
    assert_eq!(
        Grid::new(0, 5).err(),
        Some(GridError::EmptyDimensions {
            width: 0,
            height: 5
        })
    );
    assert!(Grid::from_raster(&TerrainRaster::filled(0, 0, TerrainKind::Path)).is_err());
}

#[test]
fn flood_fill_stops_at_walls_and_crosses_links() {
    let mut grid = Grid::new(9, 3).expect("valid dimensions");
    for y in 0..3 {
        grid.set_terrain(4, y, TerrainKind::TreeBramble);
    }

    let left = grid.flood_fill(0, 1, 20);
    assert_eq!(left.len(), 12);
    assert!(!left.contains(&CellCoord::new(5, 1)));

    grid.add_link(CellCoord::new(3, 1), CellCoord::new(5, 1), false);
    let bridged = grid.flood_fill(0, 1, 20);
    assert_eq!(bridged.len(), 24);

    let back = grid.flood_fill(8, 1, 20);
    assert_eq!(back.len(), 12, "one-way link does not lead back");
}
