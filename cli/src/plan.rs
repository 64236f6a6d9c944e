#![deny(missing_docs)]

//! # Plan Command
//!
//! Introspects a domain file and a wire file, binds overrides on each, and prints
//! the mapper plan of every model pair.

use crate::config::GoalesceConfig;
use crate::error::CliResult;
use crate::input::{load_batch, OutputFormat};
use goalesce_core::plan_mappers;
use std::path::PathBuf;

/// Arguments for the plan command.
#[derive(clap::Args, Debug, Clone)]
pub struct PlanArgs {
    /// Domain model source.
    pub models: PathBuf,

    /// Generated wire model source.
    pub wire: PathBuf,

    /// Output encoding.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Renders the mapper plans.
pub fn render(args: &PlanArgs, config: &GoalesceConfig) -> CliResult<String> {
    let domain = load_batch(&args.models, &config.domain)?;
    let wire = load_batch(&args.wire, &config.wire)?;
    let plans = plan_mappers(&domain, &wire)?;
    args.format.render(&plans)
}

/// Executes the plan command.
pub fn execute(args: &PlanArgs, config: &GoalesceConfig) -> CliResult<()> {
    println!("{}", render(args, config)?);
    Ok(())
}
