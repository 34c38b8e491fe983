//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use vg_core::{Config, CqlIdentifiers};
use vg_cql::{CqlBlock, PlanDocument};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command has already reported the failure
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A plan document together with the block tree built from it
pub(crate) struct LoadedPlan {
    pub(crate) document: PlanDocument,
    pub(crate) config: Config,
    pub(crate) block: CqlBlock,
}

impl LoadedPlan {
    /// Display name: the document's name, else the file stem
    pub(crate) fn display_name(&self, plan_path: &Path) -> String {
        self.document.name.clone().unwrap_or_else(|| {
            plan_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| plan_path.display().to_string())
        })
    }
}

/// Load the configuration for a plan: `--config` when given, otherwise
/// `vg.yml` / `vg.yaml` in the plan's directory, otherwise the defaults.
pub(crate) fn load_config(plan_path: &Path, global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => {
            let dir = plan_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            Config::load_from_dir(dir)
                .with_context(|| format!("Failed to load config from {}", dir.display()))
        }
    }
}

/// Load a plan document and build its block tree.
pub(crate) fn load_plan(plan_path: &Path, global: &GlobalArgs) -> Result<LoadedPlan> {
    let config = load_config(plan_path, global)?;
    log::debug!(
        "Identifier prefixes: block '{}', from '{}'",
        config.identifiers.block_prefix,
        config.identifiers.from_prefix
    );

    let document = PlanDocument::load(plan_path)
        .with_context(|| format!("Failed to load plan: {}", plan_path.display()))?;

    let mut identifiers = CqlIdentifiers::from_config(&config.identifiers);
    let block = document
        .build(&mut identifiers)
        .with_context(|| format!("Failed to build plan: {}", plan_path.display()))?;

    if global.verbose {
        eprintln!(
            "[verbose] Built {} blocks from {}: {}",
            block.aliases().len(),
            plan_path.display(),
            block.aliases().join(", ")
        );
    }

    Ok(LoadedPlan {
        document,
        config,
        block,
    })
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
