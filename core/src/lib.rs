#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Heartwood maze crates.
//!
//! This crate defines the value types that flow between the procedural
//! generator, the authoritative grid, and the pathfinding system. The
//! generator produces a [`TerrainRaster`], grid construction translates each
//! [`TerrainKind`] into walkability and cost through [`TerrainProperties`],
//! and searches report routes as sequences of [`CellCoord`] values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest effective cost a walkable cell may report, regardless of attraction.
pub const MIN_MOVE_COST: f32 = 0.1;

/// Smallest intrinsic traversal cost a terrain may carry.
pub const MIN_BASE_COST: f32 = 0.1;

/// Sentinel cost reported for unwalkable or out-of-bounds cells.
pub const IMPASSABLE_COST: f32 = f32::INFINITY;

/// Location of a single grid cell expressed as signed x and y coordinates.
///
/// Coordinates are signed so that lookups just outside the grid, such as
/// `(-1, 0)`, are representable and can be answered with "not found".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the orthogonal neighbor one step away in the given direction.
    ///
    /// The result saturates instead of wrapping at the extremes of `i32`.
    #[must_use]
    pub fn step(self, direction: Direction) -> CellCoord {
        let (dx, dy) = direction.offset();
        CellCoord::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal movement directions available to visitors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in the fixed order used for neighbor expansion.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset applied to a coordinate when stepping in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Terrain classification applied to every tile of a maze.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Cleared corridor floor.
    #[default]
    Path,
    /// Walkable but slow transition band along corridor edges.
    Undergrowth,
    /// Solid thicket that forms the maze walls.
    TreeBramble,
    /// Standing water carved out of the solid mass.
    Water,
}

impl TerrainKind {
    /// Looks up the movement properties derived from this terrain.
    #[must_use]
    pub fn properties(self) -> TerrainProperties {
        match self {
            Self::Path => TerrainProperties::new(true, 1.0, 1.0),
            Self::Undergrowth => TerrainProperties::new(true, 2.0, 0.6),
            Self::TreeBramble => TerrainProperties::new(false, 10.0, 0.0),
            Self::Water => TerrainProperties::new(false, 5.0, 0.3),
        }
    }

    /// Reports whether the terrain is part of the solid wall mass.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::TreeBramble)
    }

    /// ASCII glyph used when rendering or loading text layouts.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Path => '.',
            Self::Undergrowth => ',',
            Self::TreeBramble => '#',
            Self::Water => '~',
        }
    }

    /// Resolves a terrain from its ASCII glyph.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Path),
            ',' => Some(Self::Undergrowth),
            '#' => Some(Self::TreeBramble),
            '~' => Some(Self::Water),
            _ => None,
        }
    }
}

/// Movement properties derived from a [`TerrainKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainProperties {
    walkable: bool,
    base_cost: f32,
    speed_multiplier: f32,
}

impl TerrainProperties {
    /// Creates a new property record, flooring the base cost at [`MIN_BASE_COST`].
    #[must_use]
    pub fn new(walkable: bool, base_cost: f32, speed_multiplier: f32) -> Self {
        Self {
            walkable,
            base_cost: base_cost.max(MIN_BASE_COST),
            speed_multiplier,
        }
    }

    /// Whether visitors may enter tiles with this terrain.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Intrinsic traversal cost before attraction is applied.
    #[must_use]
    pub const fn base_cost(&self) -> f32 {
        self.base_cost
    }

    /// Scalar applied to movement speed by external movement code.
    #[must_use]
    pub const fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }
}

/// Dense row-major raster of terrain classifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainRaster {
    width: u32,
    height: u32,
    tiles: Vec<TerrainKind>,
}

impl TerrainRaster {
    /// Creates a raster of the provided dimensions filled with a single terrain.
    #[must_use]
    pub fn filled(width: u32, height: u32, kind: TerrainKind) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![kind; capacity],
        }
    }

    /// Width of the raster in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the raster in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the coordinate lies inside the raster.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Terrain stored at the provided coordinate, if it lies inside the raster.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<TerrainKind> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Overwrites the terrain at the provided coordinate. Out-of-range writes are ignored.
    pub fn set(&mut self, cell: CellCoord, kind: TerrainKind) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = kind;
            }
        }
    }

    /// Counts the tiles carrying the provided terrain.
    #[must_use]
    pub fn count(&self, kind: TerrainKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    /// Iterates over every tile in row-major order alongside its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TerrainKind)> + '_ {
        let width = usize::try_from(self.width).unwrap_or(0).max(1);
        self.tiles.iter().enumerate().map(move |(index, kind)| {
            let x = i32::try_from(index % width).unwrap_or(i32::MAX);
            let y = i32::try_from(index / width).unwrap_or(i32::MAX);
            (CellCoord::new(x, y), *kind)
        })
    }

    /// Raw tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[TerrainKind] {
        &self.tiles
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.x()).ok()?;
        let row = u32::try_from(cell.y()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl fmt::Display for TerrainRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::try_from(self.width).unwrap_or(0);
        if width == 0 {
            return Ok(());
        }

        for row in self.tiles.chunks(width) {
            for kind in row {
                write!(f, "{}", kind.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Direction, TerrainKind, TerrainRaster, MIN_BASE_COST};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
        assert_eq!(CellCoord::new(-2, 0).manhattan_distance(origin), 4);
    }

    #[test]
    fn step_follows_direction_offsets() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(origin.step(Direction::North), CellCoord::new(3, 2));
        assert_eq!(origin.step(Direction::East), CellCoord::new(4, 3));
        assert_eq!(origin.step(Direction::South), CellCoord::new(3, 4));
        assert_eq!(origin.step(Direction::West), CellCoord::new(2, 3));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(-4, 17));
    }

    #[test]
    fn raster_round_trips_through_bincode() {
        let mut raster = TerrainRaster::filled(3, 2, TerrainKind::TreeBramble);
        raster.set(CellCoord::new(1, 1), TerrainKind::Water);
        assert_round_trip(&raster);
    }

    #[test]
    fn only_open_terrain_is_walkable() {
        assert!(TerrainKind::Path.properties().walkable());
        assert!(TerrainKind::Undergrowth.properties().walkable());
        assert!(!TerrainKind::TreeBramble.properties().walkable());
        assert!(!TerrainKind::Water.properties().walkable());
    }

    #[test]
    fn base_cost_never_drops_below_floor() {
        let properties = super::TerrainProperties::new(true, 0.0, 1.0);
        assert!((properties.base_cost() - MIN_BASE_COST).abs() < f32::EPSILON);
    }

    #[test]
    fn glyphs_resolve_back_to_terrain() {
        for kind in [
            TerrainKind::Path,
            TerrainKind::Undergrowth,
            TerrainKind::TreeBramble,
            TerrainKind::Water,
        ] {
            assert_eq!(TerrainKind::from_glyph(kind.glyph()), Some(kind));
        }
        assert_eq!(TerrainKind::from_glyph('?'), None);
    }

    #[test]
    fn raster_ignores_out_of_range_access() {
        let mut raster = TerrainRaster::filled(2, 2, TerrainKind::Path);
        raster.set(CellCoord::new(-1, 0), TerrainKind::Water);
        raster.set(CellCoord::new(2, 0), TerrainKind::Water);
        assert_eq!(raster.count(TerrainKind::Water), 0);
        assert_eq!(raster.get(CellCoord::new(0, 2)), None);
        assert_eq!(raster.get(CellCoord::new(1, 1)), Some(TerrainKind::Path));
    }

    #[test]
    fn raster_renders_one_line_per_row() {
        let mut raster = TerrainRaster::filled(3, 2, TerrainKind::TreeBramble);
        raster.set(CellCoord::new(1, 0), TerrainKind::Path);
        raster.set(CellCoord::new(2, 1), TerrainKind::Water);
        assert_eq!(raster.to_string(), "#.#\n##~\n");
    }

    #[test]
    fn raster_iter_reports_row_major_coordinates() {
        let raster = TerrainRaster::filled(2, 2, TerrainKind::Path);
        let cells: Vec<CellCoord> = raster.iter().map(|(cell, _)| cell).collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
            ]
        );
    }
}
