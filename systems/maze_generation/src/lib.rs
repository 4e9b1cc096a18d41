#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic procedural maze generation for Heartwood.
//!
//! A [`MazeGenerator`] first lays out a coarse lattice of junctions, carves a
//! random spanning tree through it with a depth-first search, sprinkles in a
//! few loop edges and picks entrance junctions on the lattice border. Only
//! then is the fine [`TerrainRaster`] touched: junctions and edges are
//! stamped as thick corridors, entrances are tunnelled out to the raster
//! border and finally some of the remaining solid mass is flooded with water.
//! Every random decision is drawn from a single seeded ChaCha stream, so the
//! same configuration always yields the same raster.

mod carve;
mod layout;
mod water;

use heartwood_core::{CellCoord, TerrainKind, TerrainRaster};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::CoarseMaze;

/// Smallest raster edge the generator will produce.
pub const MIN_DIMENSION: u32 = 3;

/// Largest raster edge the generator will produce.
pub const MAX_DIMENSION: u32 = 8192;

/// Tunable inputs to the maze generator.
///
/// Every field has a default, so configuration files may list only the
/// values they want to change. Out-of-range values are clamped by
/// [`MazeConfig::normalized`] rather than rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Raster width in tiles.
    pub width: u32,
    /// Raster height in tiles.
    pub height: u32,
    /// Requested entrance count; capped at the number of border junctions.
    pub num_entrances: u32,
    /// Narrowest corridor width in tiles.
    pub min_path_width: u32,
    /// Widest corridor width in tiles.
    pub max_path_width: u32,
    /// Fraction of leftover solid tiles to convert into water.
    pub water_coverage: f32,
    /// Seed for the deterministic random stream.
    pub random_seed: u64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            num_entrances: 3,
            min_path_width: 2,
            max_path_width: 4,
            water_coverage: 0.1,
            random_seed: 1,
        }
    }
}

impl MazeConfig {
    /// Returns a copy with every field clamped into its usable range.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let min_path_width = self.min_path_width.max(1);
        let water_coverage = if self.water_coverage.is_nan() {
            0.0
        } else {
            self.water_coverage.clamp(0.0, 1.0)
        };
        Self {
            width: self.width.clamp(MIN_DIMENSION, MAX_DIMENSION),
            height: self.height.clamp(MIN_DIMENSION, MAX_DIMENSION),
            num_entrances: self.num_entrances,
            min_path_width,
            max_path_width: self.max_path_width.max(min_path_width),
            water_coverage,
            random_seed: self.random_seed,
        }
    }

    /// Distance in tiles between neighbouring junctions.
    ///
    /// Wide enough that two corridors at maximum width never merge.
    #[must_use]
    pub fn cell_spacing(&self) -> u32 {
        self.max_path_width
            .saturating_add(1)
            .max(self.min_path_width.saturating_add(2))
    }
}

/// Finished maze raster with the positions callers need to place it in a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMaze {
    raster: TerrainRaster,
    entrances: Vec<CellCoord>,
    junctions: Vec<CellCoord>,
}

impl GeneratedMaze {
    /// Terrain classification of every tile.
    #[must_use]
    pub const fn raster(&self) -> &TerrainRaster {
        &self.raster
    }

    /// Border tiles where entrance tunnels open, in selection order.
    #[must_use]
    pub fn entrances(&self) -> &[CellCoord] {
        &self.entrances
    }

    /// Centres of every coarse junction in row-major order.
    #[must_use]
    pub fn junctions(&self) -> &[CellCoord] {
        &self.junctions
    }

    /// Consumes the maze and returns its raster.
    #[must_use]
    pub fn into_raster(self) -> TerrainRaster {
        self.raster
    }
}

/// Seeded procedural maze generator.
#[derive(Clone, Debug, Default)]
pub struct MazeGenerator {
    config: MazeConfig,
}

impl MazeGenerator {
    /// Creates a generator that will use a normalized copy of `config`.
    #[must_use]
    pub fn new(config: MazeConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    /// Effective configuration after normalization.
    #[must_use]
    pub const fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Runs the full generation pipeline.
    ///
    /// Calling this repeatedly on the same generator yields identical mazes.
    #[must_use]
    pub fn generate(&self) -> GeneratedMaze {
        let config = &self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);
        let mut raster =
            TerrainRaster::filled(config.width, config.height, TerrainKind::TreeBramble);

        let mut maze = CoarseMaze::new(config.width, config.height, config.cell_spacing());
        maze.carve_spanning_tree(&mut rng);
        maze.add_loop_edges(&mut rng);
        maze.choose_entrances(config.num_entrances, &mut rng);
        debug!(
            columns = maze.columns(),
            rows = maze.rows(),
            edges = maze.edge_count(),
            entrances = maze.entrances().len(),
            "coarse maze laid out"
        );

        let junctions: Vec<CellCoord> = maze.junctions().map(|cell| maze.position(cell)).collect();
        for junction in &junctions {
            let width = self.corridor_width(&mut rng);
            carve::carve_disk(&mut raster, *junction, width);
        }

        for edge in maze.edges() {
            let (first, second) = edge.endpoints();
            let width = self.corridor_width(&mut rng);
            carve::carve_corridor(&mut raster, maze.position(first), maze.position(second), width);
        }

        let mut entrances = Vec::with_capacity(maze.entrances().len());
        for cell in maze.entrances() {
            let junction = maze.position(*cell);
            let border = carve::nearest_border(&raster, junction);
            let width = self.corridor_width(&mut rng);
            carve::carve_corridor(&mut raster, border, junction, width);
            entrances.push(border);
        }

        let flooded = water::grow_water(&mut raster, config.water_coverage, &mut rng);
        let shoreline = if config.water_coverage > 0.0 {
            water::scatter_shoreline(&mut raster, &mut rng)
        } else {
            0
        };
        debug!(
            seed = config.random_seed,
            flooded,
            shoreline,
            path = raster.count(TerrainKind::Path),
            undergrowth = raster.count(TerrainKind::Undergrowth),
            "maze raster generated"
        );

        GeneratedMaze {
            raster,
            entrances,
            junctions,
        }
    }

    fn corridor_width(&self, rng: &mut ChaCha8Rng) -> u32 {
        rng.gen_range(self.config.min_path_width..=self.config.max_path_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_clamps_every_field() {
        let config = MazeConfig {
            width: 0,
            height: 100_000,
            num_entrances: 0,
            min_path_width: 0,
            max_path_width: 0,
            water_coverage: 3.5,
            random_seed: 9,
        }
        .normalized();

        assert_eq!(config.width, MIN_DIMENSION);
        assert_eq!(config.height, MAX_DIMENSION);
        assert_eq!(config.min_path_width, 1);
        assert_eq!(config.max_path_width, 1);
        assert!((config.water_coverage - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.random_seed, 9);
    }

    #[test]
    fn nan_coverage_disables_water() {
        let config = MazeConfig {
            water_coverage: f32::NAN,
            ..MazeConfig::default()
        }
        .normalized();
        assert_eq!(config.water_coverage, 0.0);
    }

    #[test]
    fn spacing_keeps_walls_between_widest_corridors() {
        let config = MazeConfig {
            min_path_width: 2,
            max_path_width: 4,
            ..MazeConfig::default()
        };
        assert_eq!(config.cell_spacing(), 5);

        let narrow = MazeConfig {
            min_path_width: 3,
            max_path_width: 3,
            ..MazeConfig::default()
        };
        assert_eq!(narrow.cell_spacing(), 5);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: MazeConfig =
            toml::from_str("width = 30\nrandom_seed = 77\n").expect("valid toml");
        assert_eq!(config.width, 30);
        assert_eq!(config.random_seed, 77);
        assert_eq!(config.height, MazeConfig::default().height);
        assert_eq!(config.num_entrances, MazeConfig::default().num_entrances);
    }

    #[test]
    fn zero_coverage_produces_no_water() {
        let maze = MazeGenerator::new(MazeConfig {
            water_coverage: 0.0,
            ..MazeConfig::default()
        })
        .generate();
        assert_eq!(maze.raster().count(TerrainKind::Water), 0);
    }

    #[test]
    fn junction_centres_are_always_path() {
        let maze = MazeGenerator::default().generate();
        for junction in maze.junctions() {
            assert_eq!(maze.raster().get(*junction), Some(TerrainKind::Path));
        }
    }
}
