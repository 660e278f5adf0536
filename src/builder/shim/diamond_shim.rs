//! Lattice Diamond backend shim.

use crate::builder::shim::capabilities::{
    BackendCapabilities, BackendId, BackendKind, TransferCapabilities,
};
use crate::builder::shim::tcl::{braced, key_values, path_str};
use crate::builder::shim::trait_def::BackendShim;
use crate::builder::template::RenderContext;
use crate::core::choice::DevType;
use crate::core::config::BuildConfig;
use crate::core::errors::BuildError;
use crate::core::part::{FamilyName, FamilyTable, PartDescriptor, PartResolver};

const CAPABILITIES: BackendCapabilities = BackendCapabilities {
    id: BackendId::Diamond,
    kind: BackendKind::ProjectFile,
    description: "Lattice Diamond (MachXO, XP2, ECP3 and ECP5)",
    tool: "diamondc",
    install_hint: "Install Lattice Diamond and add its bin/lin64 directory to PATH",
    default_part: "LFXP2-5E-5TN144C",
    script: "diamond.tcl",
    command: "diamondc diamond.tcl",
    bitstream_ext: "bit",
    transfer: Some(TransferCapabilities {
        script: "diamond-prog.sh",
        command: "sh diamond-prog.sh",
        devtypes: &[DevType::Fpga],
    }),
};

const DIAMOND_FAMILIES: &[FamilyTable] = &[
    FamilyTable {
        name: FamilyName::Fixed("LatticeXP2"),
        prefixes: &["lfxp2"],
    },
    FamilyTable {
        name: FamilyName::Fixed("LatticeECP3"),
        prefixes: &["lfe3"],
    },
    FamilyTable {
        name: FamilyName::Fixed("ECP5UM5G"),
        prefixes: &["lfe5um5g"],
    },
    FamilyTable {
        name: FamilyName::Fixed("ECP5UM"),
        prefixes: &["lfe5um"],
    },
    FamilyTable {
        name: FamilyName::Fixed("ECP5U"),
        prefixes: &["lfe5u"],
    },
    FamilyTable {
        name: FamilyName::Fixed("MachXO3LF"),
        prefixes: &["lcmxo3lf"],
    },
    FamilyTable {
        name: FamilyName::Fixed("MachXO2"),
        prefixes: &["lcmxo2"],
    },
];

/// Lattice Diamond backend shim.
pub struct DiamondShim {
    resolver: PartResolver,
}

impl DiamondShim {
    pub fn new() -> Self {
        let resolver = DIAMOND_FAMILIES
            .iter()
            .fold(PartResolver::new(), |r, table| r.with_table(*table));
        DiamondShim { resolver }
    }
}

impl Default for DiamondShim {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendShim for DiamondShim {
    fn capabilities(&self) -> &BackendCapabilities {
        &CAPABILITIES
    }

    fn resolver(&self) -> &PartResolver {
        &self.resolver
    }

    /// Diamond and its programmer name devices in upper case.
    fn describe_part(&self, part: &str) -> Result<PartDescriptor, BuildError> {
        let mut desc = self.resolver.resolve(part)?;
        desc.device = desc.device.to_uppercase();
        desc.package = desc.package.to_uppercase();
        Ok(desc)
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
            .map(|file| match &file.library {
                Some(lib) => format!("prj_src add -work {} {}", lib, braced(&file.path)),
                None => format!("prj_src add {}", braced(&file.path)),
            })
            .collect();
        ctx.insert("FILES", files.join("\n"));

        let constraints: Vec<_> = config
            .constraints
            .iter()
            .map(|c| format!("prj_src add {}", braced(&c.path)))
            .collect();
        ctx.insert("CONSTRAINTS", constraints.join("\n"));

        if !config.includes.is_empty() {
            let dirs: Vec<_> = config.includes.iter().map(|p| path_str(p)).collect();
            ctx.insert(
                "INCLUDES",
                format!("prj_impl option {{include path}} {{\"{}\"}}", dirs.join(";")),
            );
        }
        if !config.defines.is_empty() {
            ctx.insert(
                "DEFINES",
                format!(
                    "prj_impl option VERILOG_DIRECTIVES {{\"{}\"}}",
                    key_values(&config.defines, ";")
                ),
            );
        }
        if !config.params.is_empty() {
            ctx.insert(
                "PARAMS",
                format!(
                    "prj_impl option HDL_PARAM {{\"{}\"}}",
                    key_values(&config.params, ";")
                ),
            );
        }

        Ok(())
    }
}
