#![deny(missing_docs)]

//! # Inspect Command
//!
//! Prints the introspected batch of a model file: models with their fields and
//! embedded bases, plus every rejected input.

use crate::config::GoalesceConfig;
use crate::error::CliResult;
use crate::input::{load_batch, OutputFormat};
use std::path::PathBuf;

/// Arguments for the inspect command.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// Go model source (or a JSON/YAML structural description).
    pub models: PathBuf,

    /// Output encoding.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Introspect with the wire options instead of the domain options.
    #[clap(long)]
    pub wire: bool,
}

/// Renders the batch.
pub fn render(args: &InspectArgs, config: &GoalesceConfig) -> CliResult<String> {
    let options = if args.wire { &config.wire } else { &config.domain };
    let batch = load_batch(&args.models, options)?;
    args.format.render(&batch)
}

/// Executes the inspect command.
pub fn execute(args: &InspectArgs, config: &GoalesceConfig) -> CliResult<()> {
    println!("{}", render(args, config)?);
    Ok(())
}
