#![deny(missing_docs)]

//! # Goalesce CLI
//!
//! Command Line Interface over the model introspection and mapping pipeline.
//!
//! Supported Commands:
//! - `inspect`: Prints the introspected models of a source file.
//! - `project`: Prints the wire type of every field.
//! - `plan`: Prints the field conversions between domain and wire models.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::GoalesceConfig;
use crate::error::CliResult;

mod config;
mod error;
mod input;
mod inspect;
mod plan;
mod project;

#[derive(Parser, Debug)]
#[clap(author, version, about = "GORM model <-> OpenAPI DTO mapping toolchain")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). `RUST_LOG` takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML configuration with `domain` and `wire` option sections.
    #[clap(long, global = true, env = "GOALESCE_CONFIG")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Introspect a model file and print its models.
    Inspect(inspect::InspectArgs),
    /// Print the wire type of every model field.
    Project(project::ProjectArgs),
    /// Plan the mappers between a domain and a wire model file.
    Plan(plan::PlanArgs),
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = GoalesceConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Inspect(args) => inspect::execute(args, &config)?,
        Commands::Project(args) => project::execute(args, &config)?,
        Commands::Plan(args) => plan::execute(args, &config)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
