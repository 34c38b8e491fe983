//! Render command implementation

use anyhow::{Context, Result};
use vg_core::OutputFormat;
use vg_cql::{CqlBlock, DbQueryCommandTree, ProviderCommandInfo};

use crate::cli::{GlobalArgs, RenderArgs};
use crate::commands::common::load_plan;

/// Execute the render command
pub(crate) fn execute(args: &RenderArgs, global: &GlobalArgs) -> Result<()> {
    let plan = load_plan(&args.plan, global)?;

    let format = args
        .format
        .map(OutputFormat::from)
        .unwrap_or(plan.config.output.format);
    let is_top_level = plan.config.output.top_level && !args.nested;

    if global.verbose {
        eprintln!(
            "[verbose] Rendering {} as {} ({})",
            plan.display_name(&args.plan),
            format,
            if is_top_level { "top level" } else { "nested" }
        );
    }

    let output = render_output(&plan.block, format, is_top_level)
        .with_context(|| format!("Failed to render plan: {}", args.plan.display()))?;
    println!("{}", output);
    Ok(())
}

/// Render `block` to the requested target.
///
/// A top-level command tree is wrapped as a provider command before it is
/// printed; a nested one is printed as a bare expression.
pub(crate) fn render_output(
    block: &CqlBlock,
    format: OutputFormat,
    is_top_level: bool,
) -> Result<String> {
    match format {
        OutputFormat::Esql => Ok(block.to_esql(is_top_level)?),
        OutputFormat::Cqt | OutputFormat::Json if is_top_level => {
            let info = ProviderCommandInfo::new(DbQueryCommandTree::from_block(block)?);
            let tree = info.command_tree();
            if format == OutputFormat::Json {
                serde_json::to_string_pretty(tree).context("Failed to serialize to JSON")
            } else {
                Ok(tree.query().to_string())
            }
        }
        OutputFormat::Cqt => Ok(block.render_structural(false)?.to_string()),
        OutputFormat::Json => {
            let tree = block.render_structural(false)?;
            serde_json::to_string_pretty(&tree).context("Failed to serialize to JSON")
        }
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
