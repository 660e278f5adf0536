//! Quartus backend shim.

use crate::builder::shim::capabilities::{
    BackendCapabilities, BackendId, BackendKind, TransferCapabilities,
};
use crate::builder::shim::tcl::{braced, extension};
use crate::builder::shim::trait_def::BackendShim;
use crate::builder::template::RenderContext;
use crate::core::choice::DevType;
use crate::core::config::{BuildConfig, FileKind};
use crate::core::errors::BuildError;
use crate::core::part::{FamilyName, FamilyTable, PartDescriptor, PartResolver, PART_DELIMITER};

const CAPABILITIES: BackendCapabilities = BackendCapabilities {
    id: BackendId::Quartus,
    kind: BackendKind::ProjectFile,
    description: "Intel Quartus Prime (Cyclone, MAX and Arria families)",
    tool: "quartus_sh",
    install_hint: "Install Quartus Prime Lite and add its bin directory to PATH",
    default_part: "10cl120zf780i8g",
    script: "quartus.tcl",
    command: "quartus_sh --script quartus.tcl",
    bitstream_ext: "sof",
    transfer: Some(TransferCapabilities {
        script: "quartus-prog.sh",
        command: "bash quartus-prog.sh",
        devtypes: &[DevType::Fpga],
    }),
};

/// Quartus ordering codes are a single token.
const QUARTUS_PART_SHAPE: &str =
    "a Quartus device ordering code without spaces and at most three `-` components";

const QUARTUS_FAMILIES: &[FamilyTable] = &[
    FamilyTable {
        name: FamilyName::Fixed("Cyclone 10 LP"),
        prefixes: &["10cl"],
    },
    FamilyTable {
        name: FamilyName::Fixed("MAX 10"),
        prefixes: &["10m"],
    },
    FamilyTable {
        name: FamilyName::Fixed("Cyclone V"),
        prefixes: &["5cs", "5ce", "5cg"],
    },
    FamilyTable {
        name: FamilyName::Fixed("Cyclone IV GX"),
        prefixes: &["ep4cgx"],
    },
    FamilyTable {
        name: FamilyName::Fixed("Cyclone IV E"),
        prefixes: &["ep4ce"],
    },
];

/// Quartus backend shim.
pub struct QuartusShim {
    resolver: PartResolver,
}

impl QuartusShim {
    pub fn new() -> Self {
        let resolver = QUARTUS_FAMILIES
            .iter()
            .fold(PartResolver::new(), |r, table| r.with_table(*table));
        QuartusShim { resolver }
    }
}

impl Default for QuartusShim {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendShim for QuartusShim {
    fn capabilities(&self) -> &BackendCapabilities {
        &CAPABILITIES
    }

    fn resolver(&self) -> &PartResolver {
        &self.resolver
    }

    fn describe_part(&self, part: &str) -> Result<PartDescriptor, BuildError> {
        let components = part.split(PART_DELIMITER).count();
        if part.is_empty() || part.chars().any(char::is_whitespace) || components > 3 {
            return Err(BuildError::MalformedPart {
                part: part.to_string(),
                expected: QUARTUS_PART_SHAPE.to_string(),
            });
        }
        Ok(PartDescriptor {
            family: self.resolver.family(part),
            device: part.to_string(),
            package: String::new(),
        })
    }

    fn build_context(
        &self,
        config: &BuildConfig,
        _part: &PartDescriptor,
        ctx: &mut RenderContext,
    ) -> Result<(), BuildError> {
        let files: Vec<_> = config
            .files
            .iter()
            .map(|file| {
                let assignment = match file.kind {
                    FileKind::Vhdl => "VHDL_FILE",
                    FileKind::Verilog => "VERILOG_FILE",
                    FileKind::SystemVerilog => "SYSTEMVERILOG_FILE",
                };
                let mut line = format!(
                    "set_global_assignment -name {} {}",
                    assignment,
                    braced(&file.path)
                );
                if let Some(lib) = &file.library {
                    line.push_str(&format!(" -library {}", lib));
                }
                line
            })
            .collect();
        ctx.insert("FILES", files.join("\n"));

        // Timing constraints are SDC; anything else is a TCL assignment file
        let constraints: Vec<_> = config
            .constraints
            .iter()
            .map(|c| match extension(&c.path).as_str() {
                "sdc" => format!("set_global_assignment -name SDC_FILE {}", braced(&c.path)),
                _ => format!("source {}", braced(&c.path)),
            })
            .collect();
        ctx.insert("CONSTRAINTS", constraints.join("\n"));

        let includes: Vec<_> = config
            .includes
            .iter()
            .map(|p| format!("set_global_assignment -name SEARCH_PATH {}", braced(p)))
            .collect();
        ctx.insert("INCLUDES", includes.join("\n"));

        let defines: Vec<_> = config
            .defines
            .iter()
            .map(|(k, v)| format!("set_global_assignment -name VERILOG_MACRO \"{}={}\"", k, v))
            .collect();
        ctx.insert("DEFINES", defines.join("\n"));

        let params: Vec<_> = config
            .params
            .iter()
            .map(|(k, v)| format!("set_parameter -name {} {}", k, v))
            .collect();
        ctx.insert("PARAMS", params.join("\n"));

        Ok(())
    }
}
