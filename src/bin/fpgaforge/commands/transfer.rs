//! `fpgaforge transfer` command

use anyhow::Result;

use crate::cli::TransferArgs;
use crate::commands::{load, print_invocation};
use fpgaforge::core::choice::DevType;
use fpgaforge::core::project::TransferRequest;
use fpgaforge::ops;

pub fn execute(args: TransferArgs) -> Result<()> {
    let req = TransferRequest {
        devtype: args.devtype.parse::<DevType>()?,
        position: args.position,
        part: args.mempart,
        width: args.width,
        bitstream: args.bitstream,
    };

    let project = load(&args.project)?;
    let invocation = ops::transfer(&project, &req)?;
    print_invocation(&invocation);

    Ok(())
}
