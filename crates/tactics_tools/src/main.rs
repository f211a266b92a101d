//! Grid Tactics - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tactics_core::grid::Field;
use tactics_core::units::UnitId;
use tactics_tools::ascii::AsciiConfig;
use tactics_tools::{commands, validate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tactics-tools")]
#[command(about = "Development tools for Grid Tactics")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Engine config file (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn field_arg(text: &str) -> Result<Field, String> {
    commands::parse_field(text).map_err(|e| e.to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Validate map and config files
    Validate {
        /// Data file or directory
        #[arg(default_value = "assets")]
        path: PathBuf,
    },
    /// Find the shortest path between two fields
    Path {
        /// Map file
        #[arg(long)]
        map: PathBuf,
        /// Start field as x,y
        #[arg(long, value_parser = field_arg)]
        from: Field,
        /// Goal field as x,y
        #[arg(long, value_parser = field_arg)]
        to: Field,
    },
    /// List the move or attack range of a unit
    Range {
        /// Map file
        #[arg(long)]
        map: PathBuf,
        /// Unit id
        #[arg(long)]
        unit: UnitId,
        /// Show the attack range instead of the move range
        #[arg(long)]
        attack: bool,
    },
    /// Resolve a fight between two units
    Fight {
        /// Map file
        #[arg(long)]
        map: PathBuf,
        /// Attacking unit id
        #[arg(long)]
        attacker: UnitId,
        /// Defending unit id
        #[arg(long)]
        defender: UnitId,
    },
    /// Draw the board as ASCII
    Show {
        /// Map file
        #[arg(long)]
        map: PathBuf,
        /// Highlight the ranges of this unit
        #[arg(long)]
        unit: Option<UnitId>,
        /// Use ANSI colors
        #[arg(long)]
        color: bool,
    },
}

fn run(cli: Cli) -> tactics_tools::Result<String> {
    let config = commands::load_config(cli.config.as_deref())?;
    let game = |map: &Path| commands::load_game(map, config);

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            let reports = validate::validate_data_directory(&path, config)?;
            let output = if cli.json {
                serde_json::to_string_pretty(&reports)?
            } else {
                reports
                    .iter()
                    .map(|r| match &r.error {
                        Some(error) => format!("FAIL {}: {error}", r.path.display()),
                        None => format!(
                            "ok   {} ({}x{}, {} units, {} warnings)",
                            r.path.display(),
                            r.width,
                            r.height,
                            r.units,
                            r.warnings.len()
                        ),
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            println!("{output}");
            validate::check_reports(&reports)?;
            Ok("Validation passed".to_string())
        }
        Commands::Path { map, from, to } => commands::path(&game(&map)?, from, to, cli.json),
        Commands::Range { map, unit, attack } => {
            commands::range(&game(&map)?, unit, attack, cli.json)
        }
        Commands::Fight {
            map,
            attacker,
            defender,
        } => commands::fight_units(&game(&map)?, attacker, defender, cli.json),
        Commands::Show { map, unit, color } => commands::show(
            &game(&map)?,
            unit,
            AsciiConfig {
                use_color: color,
                ..AsciiConfig::default()
            },
        ),
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
