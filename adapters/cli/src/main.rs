#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates Heartwood mazes and routes visitors through them.

mod commands;
mod layout_file;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{GenerateArgs, ReachArgs, RouteArgs};

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "heartwood", version, about = "Heartwood maze generator and router")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a maze and print its layout.
    Generate(GenerateArgs),
    /// Route from the first entrance of a layout to its heart.
    Route(RouteArgs),
    /// Count the tiles reachable from an origin tile.
    Reach(ReachArgs),
}

/// Entry point for the Heartwood command-line interface.
fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match &cli.command {
        Command::Generate(args) => commands::generate(args),
        Command::Route(args) => commands::route(args),
        Command::Reach(args) => commands::reach(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_line_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn route_accepts_repeated_and_negative_values() {
        let cli = Cli::try_parse_from([
            "heartwood",
            "route",
            "--layout",
            "maze.txt",
            "--attraction",
            "1,2,0.5",
            "--attraction",
            "-1,0,2",
            "--multiplier",
            "-1",
        ])
        .expect("arguments parse");

        assert!(matches!(cli.command, Command::Route(_)));
    }

    #[test]
    fn reach_requires_origin_and_radius() {
        assert!(Cli::try_parse_from(["heartwood", "reach", "--layout", "maze.txt"]).is_err());
        assert!(Cli::try_parse_from([
            "heartwood", "reach", "--layout", "maze.txt", "--x", "1", "--y", "2", "--radius", "4",
        ])
        .is_ok());
    }
}
