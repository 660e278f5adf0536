//! Open-source flow shim (yosys + nextpnr).
//!
//! There is no project file: synthesis, place and route and packing are
//! composed into one shell script. Only Verilog/SystemVerilog sources in the
//! default library are accepted.

use crate::builder::shim::capabilities::{
    BackendCapabilities, BackendId, BackendKind, TransferCapabilities,
};
use crate::builder::shim::tcl::path_str;
use crate::builder::shim::trait_def::BackendShim;
use crate::builder::template::RenderContext;
use crate::core::choice::{DevType, Task};
use crate::core::config::{BuildConfig, FileEntry, FileKind};
use crate::core::errors::BuildError;
use crate::core::part::{PartDescriptor, PartResolver};

const CAPABILITIES: BackendCapabilities = BackendCapabilities {
    id: BackendId::Openflow,
    kind: BackendKind::FlowComposition,
    description: "yosys + nextpnr open-source flow (iCE40, ECP5, Xilinx 7 series)",
    tool: "yosys",
    install_hint: "Install yosys and nextpnr, e.g. from the oss-cad-suite bundle",
    default_part: "hx8k-ct256",
    script: "openflow.sh",
    command: "bash openflow.sh",
    bitstream_ext: "bit",
    transfer: Some(TransferCapabilities {
        script: "openflow-prog.sh",
        command: "bash openflow-prog.sh",
        devtypes: &[DevType::Fpga],
    }),
};

/// Open-source flow shim.
pub struct OpenflowShim {
    resolver: PartResolver,
}

impl OpenflowShim {
    pub fn new() -> Self {
        OpenflowShim {
            resolver: PartResolver::open_flow(),
        }
    }
}

impl Default for OpenflowShim {
    fn default() -> Self {
        Self::new()
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled {
        "1"
    } else {
        "0"
    }
}

impl BackendShim for OpenflowShim {
    fn capabilities(&self) -> &BackendCapabilities {
        &CAPABILITIES
    }

    fn resolver(&self) -> &PartResolver {
        &self.resolver
    }

    fn check_file(&self, file: &FileEntry) -> Result<(), BuildError> {
        if !file.kind.is_verilog() {
            return Err(BuildError::unsupported(
                CAPABILITIES.id,
                format!("{} source {}", file.kind, path_str(&file.path)),
            ));
        }
        if let Some(lib) = &file.library {
            return Err(BuildError::unsupported(
                CAPABILITIES.id,
                format!("library `{}` for {}", lib, path_str(&file.path)),
            ));
        }
        Ok(())
    }

    fn build_context(
        &self,
        config: &BuildConfig,
        part: &PartDescriptor,
        ctx: &mut RenderContext,
    ) -> Result<(), BuildError> {
        // The script branches on FAMILY, so an unknown part cannot be built
        part.require_family(&config.part)?;

        let files = config
            .files
            .iter()
            .map(|file| {
                let sv = if file.kind == FileKind::SystemVerilog {
                    "-sv "
                } else {
                    ""
                };
                format!("read_verilog {}-defer {}", sv, path_str(&file.path))
            })
            .collect::<Vec<_>>();
        ctx.insert("FILES", files.join("\n"));

        let constraints = config
            .implementation_constraints()
            .map(|c| path_str(&c.path))
            .collect::<Vec<_>>();
        ctx.insert("CONSTRAINTS", constraints.join(" "));

        let includes = config
            .includes
            .iter()
            .map(|p| format!("-I{}", path_str(p)))
            .collect::<Vec<_>>();
        ctx.insert("INCLUDES", includes.join(" "));

        let defines = config
            .defines
            .iter()
            .map(|(k, v)| format!("-D{}={}", k, v))
            .collect::<Vec<_>>();
        ctx.insert("DEFINES", defines.join(" "));

        let params = config
            .params
            .iter()
            .map(|(k, v)| format!("-set {} {}", k, v))
            .collect::<Vec<_>>();
        ctx.insert("PARAMS", params.join(" "));

        ctx.insert("SYN", flag(config.task.includes(Task::Syn)));
        ctx.insert("PAR", flag(config.task.includes(Task::Imp)));
        ctx.insert("BIT", flag(config.task.includes(Task::Bit)));

        Ok(())
    }
}
