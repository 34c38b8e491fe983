//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vg_core::OutputFormat;

/// viewgen - render CQL block plans to eSQL and command trees
#[derive(Parser, Debug)]
#[command(name = "vg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: vg.yml next to the plan)
    #[arg(short, long, global = true, env = "VG_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a plan and render it
    Render(RenderArgs),

    /// Build a plan and report whether it is well formed
    Check(CheckArgs),
}

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Plan document (YAML, or JSON with a .json extension)
    pub plan: PathBuf,

    /// Render target (default: output.format from config)
    #[arg(short, long, value_enum)]
    pub format: Option<RenderFormat>,

    /// Render the root as a nested block (no VALUE, aliased columns)
    #[arg(long)]
    pub nested: bool,
}

/// Render targets
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    /// eSQL text
    Esql,
    /// Command tree dump
    Cqt,
    /// Command tree as JSON
    Json,
}

impl From<RenderFormat> for OutputFormat {
    fn from(format: RenderFormat) -> Self {
        match format {
            RenderFormat::Esql => OutputFormat::Esql,
            RenderFormat::Cqt => OutputFormat::Cqt,
            RenderFormat::Json => OutputFormat::Json,
        }
    }
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Plan document (YAML, or JSON with a .json extension)
    pub plan: PathBuf,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
