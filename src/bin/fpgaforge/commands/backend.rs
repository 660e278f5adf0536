//! `fpgaforge backend` command
//!
//! List, show, and check backends.

use anyhow::{bail, Result};

use crate::cli::{BackendArgs, BackendCommands};
use crate::commands::parse_backend;
use fpgaforge::builder::shim::{get_backend_summaries, BackendAvailability, BackendRegistry};

pub fn execute(args: BackendArgs) -> Result<()> {
    match args.command {
        BackendCommands::List => list_backends(),
        BackendCommands::Show(show_args) => show_backend(&show_args.backend),
        BackendCommands::Check(check_args) => check_backend(&check_args.backend),
    }
}

fn list_backends() -> Result<()> {
    let registry = BackendRegistry::new();

    println!("Backends:");
    println!();

    for summary in get_backend_summaries(&registry) {
        let caps = &summary.capabilities;
        let transfer = if caps.supports_transfer() {
            caps.devtypes()
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            "no".to_string()
        };

        println!("  {} - {}", caps.id, caps.description);
        println!("    Status:     {}", summary.availability_label());
        println!("    Kind:       {}", caps.kind.as_str());
        println!("    Transfer:   {}", transfer);
        println!();
    }

    Ok(())
}

fn show_backend(name: &str) -> Result<()> {
    let registry = BackendRegistry::new();
    let id = parse_backend(name)?;
    let Some(shim) = registry.get(id) else {
        bail!("backend '{}' not found in registry", name);
    };
    let caps = shim.capabilities();

    println!("Backend: {}", caps.id);
    println!("  {}", caps.description);
    println!();

    println!("Build:");
    println!("  Kind:          {}", caps.kind.as_str());
    println!("  Tool:          {}", caps.tool);
    println!("  Script:        {}", caps.script);
    println!("  Command:       {}", caps.command);
    println!("  Default part:  {}", caps.default_part);
    println!("  Bitstream:     *.{}", caps.bitstream_ext);
    println!();

    println!("Transfer:");
    match caps.transfer {
        Some(transfer) => {
            println!("  Script:        {}", transfer.script);
            println!("  Command:       {}", transfer.command);
            let devtypes: Vec<_> = transfer.devtypes.iter().map(|d| d.as_str()).collect();
            println!("  Device kinds:  {}", devtypes.join(", "));
        }
        None => println!("  not supported"),
    }
    println!();

    Ok(())
}

fn check_backend(name: &str) -> Result<()> {
    let registry = BackendRegistry::new();
    let id = parse_backend(name)?;
    let Some(shim) = registry.get(id) else {
        bail!("backend '{}' not found in registry", name);
    };

    println!("Checking backend: {}", id);
    println!();

    match shim.availability() {
        BackendAvailability::Available { path } => {
            println!("  Status: available");
            println!("  Path:   {}", path.display());
            println!();
            println!("Backend '{}' is ready to use.", id);
            Ok(())
        }
        BackendAvailability::NotInstalled { tool, install_hint } => {
            println!("  Status: not installed");
            println!("  Tool:   {}", tool);
            println!();
            println!("To install: {}", install_hint);
            bail!("{} not found", tool)
        }
    }
}
