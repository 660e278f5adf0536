//! `fpgaforge context` command
//!
//! Prints every placeholder value the build script would be rendered with.

use anyhow::Result;

use crate::cli::ContextArgs;
use crate::commands::load;

pub fn execute(args: ContextArgs) -> Result<()> {
    let project = load(&args.project)?;
    let ctx = project.context()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ctx)?);
        return Ok(());
    }

    for (name, value) in ctx.iter() {
        let mut lines = value.lines();
        match lines.next() {
            None => println!("{:<14} (empty)", name),
            Some(first) => {
                println!("{:<14} {}", name, first);
                for line in lines {
                    println!("{:<14} {}", "", line);
                }
            }
        }
    }

    Ok(())
}
