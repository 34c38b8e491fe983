//! viewgen CLI - render CQL block plans to eSQL and command trees

use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{check, render};

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Render(args) => render::execute(args, &cli.global),
        cli::Commands::Check(args) => check::execute(args, &cli.global),
    };

    if let Err(err) = result {
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
