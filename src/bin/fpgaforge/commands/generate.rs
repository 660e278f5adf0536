//! `fpgaforge generate` command
//!
//! Renders the build script into the output directory. The vendor tool is
//! not run; the command that would run it is printed instead.

use anyhow::Result;

use crate::cli::GenerateArgs;
use crate::commands::{load, print_invocation};
use fpgaforge::core::choice::{Strategy, Task};
use fpgaforge::ops;

pub fn execute(args: GenerateArgs) -> Result<()> {
    let strategy = args
        .strategy
        .as_deref()
        .map(str::parse::<Strategy>)
        .transpose()?;
    let task = args.task.as_deref().map(str::parse::<Task>).transpose()?;

    let mut project = load(&args.project)?;
    let invocation = ops::generate(&mut project, strategy, task)?;
    print_invocation(&invocation);

    Ok(())
}
