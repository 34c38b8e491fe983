//! Check command implementation
//!
//! Builds the plan and renders it with both targets, reporting the first
//! malformed-plan error instead of any output.

use anyhow::Result;
use vg_core::OutputFormat;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::{load_plan, ExitCode};
use crate::commands::render::render_output;

/// Execute the check command
pub(crate) fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let plan = match load_plan(&args.plan, global) {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("FAIL {}: {:#}", args.plan.display(), err);
            return Err(ExitCode(1).into());
        }
    };

    let is_top_level = plan.config.output.top_level;
    for format in [OutputFormat::Esql, OutputFormat::Cqt] {
        if let Err(err) = render_output(&plan.block, format, is_top_level) {
            eprintln!("FAIL {} ({}): {:#}", args.plan.display(), format, err);
            return Err(ExitCode(1).into());
        }
        if global.verbose {
            eprintln!("[verbose] {} render OK", format);
        }
    }

    println!(
        "OK {}: {} blocks ({})",
        plan.display_name(&args.plan),
        plan.block.aliases().len(),
        plan.block.aliases().join(", ")
    );
    Ok(())
}
