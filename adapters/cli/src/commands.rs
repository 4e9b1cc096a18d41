//! Subcommand implementations for the `heartwood` binary.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Args;
use heartwood_core::CellCoord;
use heartwood_grid::Grid;
use heartwood_system_maze_generation::{MazeConfig, MazeGenerator};
use heartwood_system_pathfinding::Pathfinder;
use tracing::{info, warn};

use crate::layout_file::{overlay, Layout};

const ROUTE_GLYPH: char = '*';

/// Arguments accepted by `heartwood generate`.
#[derive(Debug, Args)]
pub(crate) struct GenerateArgs {
    /// TOML file with maze configuration; missing keys use defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the configured raster width.
    #[arg(long)]
    width: Option<u32>,
    /// Overrides the configured raster height.
    #[arg(long)]
    height: Option<u32>,
    /// Writes the layout to this file instead of standard output.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl GenerateArgs {
    fn apply(&self, config: &mut MazeConfig) {
        if let Some(seed) = self.seed {
            config.random_seed = seed;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
    }
}

/// Arguments accepted by `heartwood route`.
#[derive(Debug, Args)]
pub(crate) struct RouteArgs {
    /// Layout file to route through.
    #[arg(long)]
    layout: PathBuf,
    /// Attraction added to a tile, as `X,Y,VALUE`. May be repeated.
    #[arg(long = "attraction", value_parser = parse_lure, allow_hyphen_values = true)]
    attractions: Vec<Lure>,
    /// Scales how strongly attraction lowers movement cost.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    multiplier: f32,
    /// Start tile as `X,Y`; defaults to the first entrance.
    #[arg(long, value_parser = parse_coord)]
    from: Option<CellCoord>,
    /// Destination tile as `X,Y`; defaults to the heart.
    #[arg(long, value_parser = parse_coord)]
    to: Option<CellCoord>,
}

/// Arguments accepted by `heartwood reach`.
#[derive(Debug, Args)]
pub(crate) struct ReachArgs {
    /// Layout file to explore.
    #[arg(long)]
    layout: PathBuf,
    /// Origin column.
    #[arg(long)]
    x: i32,
    /// Origin row.
    #[arg(long)]
    y: i32,
    /// Maximum Manhattan distance from the origin.
    #[arg(long)]
    radius: u32,
    /// Maximum number of moves; defaults to the radius.
    #[arg(long)]
    max_steps: Option<u32>,
}

/// Attraction placed on one tile before routing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Lure {
    x: i32,
    y: i32,
    value: f32,
}

/// Generates a maze and prints or writes its layout.
pub(crate) fn generate(args: &GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => MazeConfig::default(),
    };
    args.apply(&mut config);

    let generator = MazeGenerator::new(config);
    let maze = generator.generate();
    let config = generator.config();
    info!(
        seed = config.random_seed,
        width = config.width,
        height = config.height,
        entrances = maze.entrances().len(),
        "generated maze"
    );

    let text = Layout::render(maze.raster(), maze.entrances());
    match &args.output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("failed to write layout to {}", path.display()))?;
            info!(path = %path.display(), "wrote layout");
        }
        None => print!("{text}"),
    }
    for (index, entrance) in maze.entrances().iter().enumerate() {
        println!("entrance {index}: {entrance}");
    }
    Ok(())
}

/// Routes through a layout and prints the route overlay and its cost.
pub(crate) fn route(args: &RouteArgs) -> Result<()> {
    let layout = load_layout(&args.layout)?;
    let mut grid = Grid::from_raster(layout.raster()).context("layout cannot form a grid")?;
    for lure in &args.attractions {
        grid.add_attraction(lure.x, lure.y, lure.value);
    }

    let start = args
        .from
        .or_else(|| layout.primary_entrance())
        .context("layout has no entrance; pass --from")?;
    let end = args
        .to
        .or_else(|| layout.heart())
        .context("layout has no heart; pass --to")?;

    let mut pathfinder = Pathfinder::new(&grid);
    let Some(route) = pathfinder.find_path(&grid, start, end, args.multiplier) else {
        bail!("no route from {start} to {end}");
    };
    info!(
        expanded = pathfinder.last_expanded(),
        attraction = grid.attraction_sum(),
        "route found"
    );

    print!("{}", render_route(&layout, route.cells()));
    println!("route of {} tiles costs {:.2}", route.len(), route.cost());
    Ok(())
}

/// Prints how many tiles can be reached from an origin within the given bounds.
pub(crate) fn reach(args: &ReachArgs) -> Result<()> {
    let layout = load_layout(&args.layout)?;
    let grid = Grid::from_raster(layout.raster()).context("layout cannot form a grid")?;
    let max_steps = args.max_steps.unwrap_or(args.radius);

    let reachable = grid.flood_fill_reachable(args.x, args.y, args.radius, max_steps);
    println!(
        "{} tiles reachable from {} within radius {} and {} steps",
        reachable.len(),
        CellCoord::new(args.x, args.y),
        args.radius,
        max_steps
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<MazeConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read maze config at {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid maze config {}", path.display()))
}

fn parse_config(contents: &str) -> Result<MazeConfig> {
    toml::from_str(contents).context("failed to parse maze config toml contents")
}

fn load_layout(path: &Path) -> Result<Layout> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout at {}", path.display()))?;
    let layout =
        Layout::parse(&contents).with_context(|| format!("invalid layout {}", path.display()))?;
    if layout.unknown_glyphs() > 0 {
        warn!(
            count = layout.unknown_glyphs(),
            path = %path.display(),
            "layout contained unknown glyphs"
        );
    }
    Ok(layout)
}

fn render_route(layout: &Layout, cells: &[CellCoord]) -> String {
    let route: HashSet<CellCoord> = cells.iter().copied().collect();
    overlay(layout.raster(), |cell| {
        if layout.heart() == Some(cell) {
            Some('H')
        } else if layout.entrances().contains(&cell) {
            Some('E')
        } else {
            route.contains(&cell).then_some(ROUTE_GLYPH)
        }
    })
}

fn parse_lure(text: &str) -> Result<Lure, String> {
    let mut parts = text.split(',').map(str::trim);
    let (Some(x), Some(y), Some(value), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected X,Y,VALUE but received `{text}`"));
    };

    Ok(Lure {
        x: x.parse().map_err(|_| format!("invalid column `{x}`"))?,
        y: y.parse().map_err(|_| format!("invalid row `{y}`"))?,
        value: value
            .parse()
            .map_err(|_| format!("invalid attraction `{value}`"))?,
    })
}

fn parse_coord(text: &str) -> Result<CellCoord, String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but received `{text}`"))?;
    let x = x.trim().parse().map_err(|_| format!("invalid column `{x}`"))?;
    let y = y.trim().parse().map_err(|_| format!("invalid row `{y}`"))?;
    Ok(CellCoord::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lures_parse_from_triples() {
        assert_eq!(
            parse_lure("3, 4, -0.5"),
            Ok(Lure {
                x: 3,
                y: 4,
                value: -0.5
            })
        );
        assert!(parse_lure("3,4").is_err());
        assert!(parse_lure("3,4,1,9").is_err());
        assert!(parse_lure("a,4,1").is_err());
    }

    #[test]
    fn coords_parse_from_pairs() {
        assert_eq!(parse_coord("7,-2"), Ok(CellCoord::new(7, -2)));
        assert!(parse_coord("7").is_err());
    }

    #[test]
    fn config_file_overrides_only_listed_keys() {
        let config = parse_config("num_entrances = 5\nwater_coverage = 0.0\n").expect("valid toml");
        assert_eq!(config.num_entrances, 5);
        assert_eq!(config.water_coverage, 0.0);
        assert_eq!(config.width, MazeConfig::default().width);
        assert!(parse_config("width = \"wide\"").is_err());
    }

    #[test]
    fn command_line_overrides_config_values() {
        let args = GenerateArgs {
            config: None,
            seed: Some(99),
            width: None,
            height: Some(20),
            output: None,
        };
        let mut config = MazeConfig::default();
        args.apply(&mut config);

        assert_eq!(config.random_seed, 99);
        assert_eq!(config.height, 20);
        assert_eq!(config.width, MazeConfig::default().width);
    }

    #[test]
    fn route_overlay_keeps_markers_and_stars_path() {
        let layout = Layout::parse("E...#\n##.##\n#...H\n").expect("valid layout");
        let grid = Grid::from_raster(layout.raster()).expect("valid grid");
        let mut pathfinder = Pathfinder::new(&grid);
        let start = layout.primary_entrance().expect("entrance");
        let end = layout.heart().expect("heart");

        let route = pathfinder
            .find_path(&grid, start, end, 1.0)
            .expect("layout is connected");

        assert_eq!(
            render_route(&layout, route.cells()),
            "E**.#\n##*##\n#.**H\n"
        );
        assert!((route.cost() - 6.0).abs() < 1e-5);
    }
}
