//! Vivado backend shim.
//!
//! Creates a Vivado project in batch mode and runs synthesis,
//! implementation and bitstream generation through the run manager.

use crate::builder::shim::capabilities::{
    BackendCapabilities, BackendId, BackendKind, TransferCapabilities,
};
use crate::builder::shim::tcl::{braced, key_values, path_str};
use crate::builder::shim::trait_def::BackendShim;
use crate::builder::template::RenderContext;
use crate::core::choice::DevType;
use crate::core::config::{BuildConfig, ConstraintStage};
use crate::core::errors::BuildError;
use crate::core::part::{PartDescriptor, PartResolver, XILINX_FAMILIES};

const CAPABILITIES: BackendCapabilities = BackendCapabilities {
    id: BackendId::Vivado,
    kind: BackendKind::ProjectFile,
    description: "AMD/Xilinx Vivado Design Suite (7 series and newer)",
    tool: "vivado",
    install_hint: "Install Vivado and source settings64.sh from its install directory",
    default_part: "xc7k160t-3-fbg484",
    script: "vivado.tcl",
    command: "vivado -mode batch -notrace -quiet -source vivado.tcl",
    bitstream_ext: "bit",
    transfer: Some(TransferCapabilities {
        script: "vivado-prog.tcl",
        command: "vivado -mode batch -notrace -quiet -source vivado-prog.tcl",
        devtypes: &[DevType::Fpga, DevType::Spi, DevType::Bpi],
    }),
};

/// Vivado backend shim.
pub struct VivadoShim {
    resolver: PartResolver,
}

impl VivadoShim {
    pub fn new() -> Self {
        VivadoShim {
            resolver: PartResolver::new().with_table(XILINX_FAMILIES),
        }
    }
}

impl Default for VivadoShim {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendShim for VivadoShim {
    fn capabilities(&self) -> &BackendCapabilities {
        &CAPABILITIES
    }

    fn resolver(&self) -> &PartResolver {
        &self.resolver
    }

    fn build_context(
        &self,
        config: &BuildConfig,
        _part: &PartDescriptor,
        ctx: &mut RenderContext,
    ) -> Result<(), BuildError> {
        let mut files = Vec::new();
        for file in &config.files {
            files.push(format!("add_files {}", braced(&file.path)));
            if let Some(lib) = &file.library {
                files.push(format!(
                    "set_property library {} [get_files {}]",
                    lib,
                    braced(&file.path)
                ));
            }
        }
        ctx.insert("FILES", files.join("\n"));

        let mut constraints = Vec::new();
        for entry in &config.constraints {
            let path = braced(&entry.path);
            constraints.push(format!("add_files -fileset constrs_1 {}", path));
            match entry.stage {
                ConstraintStage::All => {}
                ConstraintStage::Syn => constraints.push(format!(
                    "set_property used_in_implementation false [get_files {}]",
                    path
                )),
                ConstraintStage::Par => constraints.push(format!(
                    "set_property used_in_synthesis false [get_files {}]",
                    path
                )),
            }
        }
        ctx.insert("CONSTRAINTS", constraints.join("\n"));

        if !config.includes.is_empty() {
            let dirs: Vec<_> = config.includes.iter().map(|p| path_str(p)).collect();
            ctx.insert(
                "INCLUDES",
                format!(
                    "set_property include_dirs {{{}}} [current_fileset]",
                    dirs.join(" ")
                ),
            );
        }
        if !config.defines.is_empty() {
            ctx.insert(
                "DEFINES",
                format!(
                    "set_property verilog_define {{{}}} [current_fileset]",
                    key_values(&config.defines, " ")
                ),
            );
        }
        if !config.params.is_empty() {
            ctx.insert(
                "PARAMS",
                format!(
                    "set_property generic {{{}}} [current_fileset]",
                    key_values(&config.params, " ")
                ),
            );
        }

        Ok(())
    }
}
