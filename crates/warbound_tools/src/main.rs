//! Warbound - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warbound_core::game::Game;
use warbound_core::grid::Cell;
use warbound_core::pathfinding::parse_budget;
use warbound_tools::error::Result;
use warbound_tools::{inspect, validate};

#[derive(Parser)]
#[command(name = "warbound-tools")]
#[command(about = "Development tools for Warbound")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file, or every .ron file in a directory
    Validate {
        /// Config file or data directory
        #[arg(default_value = "crates/warbound_tools/data")]
        path: PathBuf,
    },
    /// Show where a unit can move
    Reach {
        /// Config file describing the board and armies
        config: PathBuf,
        /// Row of the unit
        #[arg(long)]
        row: i32,
        /// Column of the unit
        #[arg(long)]
        col: i32,
        /// Movement budget, defaults to the unit's range
        #[arg(long)]
        budget: Option<String>,
        /// Print JSON instead of a grid
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { path } => run_validate(&path),
        Commands::Reach {
            config,
            row,
            col,
            budget,
            json,
        } => run_reach(&config, Cell::new(row, col), budget.as_deref(), json),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run_validate(path: &std::path::Path) -> Result<()> {
    if path.is_dir() {
        tracing::info!("Validating data files in: {}", path.display());
        let mut failed = 0usize;
        for (file, outcome) in validate::validate_data_directory(path)? {
            match outcome {
                Ok(report) => tracing::info!("{report}"),
                Err(e) => {
                    failed += 1;
                    tracing::error!("{}: {e}", file.display());
                }
            }
        }
        if failed > 0 {
            tracing::error!("{failed} file(s) failed validation");
            std::process::exit(1);
        }
    } else {
        let report = validate::validate_config_file(path)?;
        tracing::info!("{report}");
    }
    tracing::info!("Validation passed");
    Ok(())
}

fn run_reach(config: &std::path::Path, start: Cell, budget: Option<&str>, json: bool) -> Result<()> {
    let config = validate::load_config(config)?;
    let game = Game::from_config(&config)?;
    let budget = budget.map(parse_budget).transpose()?;
    let report = inspect::reach_report(&game, start, budget)?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", inspect::render_grid(&game, &report));
        println!("{} cells reachable from {start}", report.cells.len());
    }
    Ok(())
}
