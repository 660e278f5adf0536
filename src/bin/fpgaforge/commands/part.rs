//! `fpgaforge part` command

use anyhow::Result;

use crate::cli::PartArgs;
use crate::commands::parse_backend;
use fpgaforge::builder::shim::create_shim;

pub fn execute(args: PartArgs) -> Result<()> {
    let backend = parse_backend(&args.backend)?;
    let shim = create_shim(backend);

    let part = shim.normalize_part(&args.part)?;
    let descriptor = shim.describe_part(&part)?;

    if args.json {
        let value = serde_json::json!({
            "backend": backend,
            "part": part,
            "family": descriptor.family,
            "device": descriptor.device,
            "package": descriptor.package,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Part:     {}", part);
    println!("Backend:  {}", backend);
    println!(
        "Family:   {}",
        descriptor.family.as_deref().unwrap_or("(unresolved)")
    );
    println!("Device:   {}", descriptor.device);
    println!("Package:  {}", descriptor.package);

    Ok(())
}
