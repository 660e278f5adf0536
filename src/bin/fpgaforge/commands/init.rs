//! `fpgaforge init` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::InitArgs;
use crate::commands::parse_backend;
use fpgaforge::ops::{init_project, InitOptions};

pub fn execute(args: InitArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    let opts = InitOptions {
        name: args.name,
        backend: parse_backend(&args.backend)?,
        part: args.part,
    };

    let manifest = init_project(&path, &opts)?;
    println!("     Created {} project at {}", opts.backend, manifest.display());

    Ok(())
}
