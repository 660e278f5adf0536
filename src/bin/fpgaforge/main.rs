//! fpgaforge CLI - render FPGA build scripts from Fpga.toml

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fpgaforge::core::errors::BuildError;
use fpgaforge::util::diagnostic::emit;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("fpgaforge=debug")
    } else {
        EnvFilter::new("fpgaforge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Transfer(args) => commands::transfer::execute(args),
        Commands::Context(args) => commands::context::execute(args),
        Commands::Part(args) => commands::part::execute(args),
        Commands::Backend(args) => commands::backend::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, as a diagnostic when it comes from the build description.
fn report(e: &anyhow::Error, color: bool) {
    match e.downcast_ref::<BuildError>() {
        Some(err) => {
            let mut diagnostic = err.to_diagnostic();
            for cause in e.chain().take_while(|c| !c.is::<BuildError>()) {
                diagnostic = diagnostic.with_context(cause.to_string());
            }
            emit(&diagnostic, color);
        }
        None => eprintln!("error: {:#}", e),
    }
}
