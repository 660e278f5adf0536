//! Command implementations

pub mod backend;
pub mod completions;
pub mod context;
pub mod generate;
pub mod init;
pub mod part;
pub mod transfer;

use anyhow::Result;

use crate::cli::ProjectArgs;
use fpgaforge::builder::shim::BackendId;
use fpgaforge::core::project::{Invocation, Project};
use fpgaforge::ops::{load_project, LoadOptions};
use fpgaforge::util::config::global_config_path;

/// Parse a backend name given on the command line.
pub fn parse_backend(name: &str) -> Result<BackendId> {
    Ok(name.parse::<BackendId>()?)
}

/// Load the project for the current directory.
pub fn load(args: &ProjectArgs) -> Result<Project> {
    let cwd = std::env::current_dir()?;
    let opts = LoadOptions {
        manifest_path: args.manifest_path.clone(),
        global_config: global_config_path(),
        backend: args.backend.as_deref().map(parse_backend).transpose()?,
        part: args.part.clone(),
        outdir: args.outdir.clone(),
        template_dir: args.template_dir.clone(),
    };
    load_project(&cwd, &opts)
}

/// Print written scripts and the command that runs them.
pub fn print_invocation(invocation: &Invocation) {
    for script in &invocation.scripts {
        println!("   Generated {}", script.display());
    }
    println!("Run in {}:", invocation.workdir.display());
    println!("  {}", invocation.command);
}
