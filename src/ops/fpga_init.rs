//! Implementation of `fpgaforge init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::shim::{create_shim, BackendId};
use crate::core::manifest::{generate_manifest, MANIFEST_NAME};

/// Options for initializing a project.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project name (defaults to the directory name)
    pub name: Option<String>,

    /// Backend written into the manifest
    pub backend: BackendId,

    /// Target part (defaults to the backend's default part)
    pub part: Option<String>,
}

const STARTER_TOP: &str = r#"// Blink an LED at roughly 1 Hz from a 12 MHz clock.
module Top #(
    parameter FREQ = 12000000
) (
    input  wire clk,
    output reg  led
);
    reg [31:0] count = 0;

    always @(posedge clk) begin
        if (count == FREQ / 2 - 1) begin
            count <= 0;
            led <= ~led;
        end else begin
            count <= count + 1;
        end
    end
endmodule
"#;

const GITIGNORE: &str = r#"# fpgaforge output
results/

# Vendor tool droppings
*.jou
*.log
.Xil/
"#;

/// Create `Fpga.toml` and a starter design in `path`.
///
/// Returns the manifest path. An existing manifest is never overwritten.
pub fn init_project(path: &Path, opts: &InitOptions) -> Result<PathBuf> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }

    let manifest_path = path.join(MANIFEST_NAME);
    if manifest_path.exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_NAME, path.display());
    }

    let shim = create_shim(opts.backend);
    let part = match &opts.part {
        Some(part) => shim
            .normalize_part(part)
            .with_context(|| format!("invalid part for the {} backend", opts.backend))?,
        None => shim.capabilities().default_part.to_string(),
    };

    let name = match &opts.name {
        Some(name) => name.clone(),
        None => path
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "top".to_string()),
    };

    fs::write(&manifest_path, generate_manifest(&name, opts.backend, &part))
        .with_context(|| format!("failed to write {}", MANIFEST_NAME))?;

    let hdl_dir = path.join("hdl");
    fs::create_dir_all(&hdl_dir).context("failed to create hdl directory")?;
    let top = hdl_dir.join("top.v");
    if !top.exists() {
        fs::write(&top, STARTER_TOP).context("failed to write hdl/top.v")?;
    }

    let gitignore = path.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, GITIGNORE).context("failed to write .gitignore")?;
    }

    tracing::debug!("initialized {} project `{}` for {}", opts.backend, name, part);
    Ok(manifest_path)
}
