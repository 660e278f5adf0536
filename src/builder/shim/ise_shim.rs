//! ISE backend shim.
//!
//! ISE wants family, device, package and speed grade as separate project
//! properties, so only full `DEVICE-SPEED-PACKAGE` parts are accepted.
//! Programming goes through an iMPACT batch file.

use std::path::Path;

use crate::builder::shim::capabilities::{
    BackendCapabilities, BackendId, BackendKind, TransferCapabilities,
};
use crate::builder::shim::tcl::{braced, key_values, path_str};
use crate::builder::shim::trait_def::{BackendShim, ScriptPlan, TransferSettings};
use crate::builder::template::{RenderContext, TemplateSource};
use crate::core::choice::DevType;
use crate::core::config::{BuildConfig, FileKind};
use crate::core::errors::BuildError;
use crate::core::part::{FamilyName, FamilyTable, PartDescriptor, PartResolver, PART_DELIMITER};
use crate::core::project::TransferRequest;

const PROG_SCRIPT: &str = "ise-prog.impact";
const PROG_COMMAND: &str = "impact -batch ise-prog.impact";

const CAPABILITIES: BackendCapabilities = BackendCapabilities {
    id: BackendId::Ise,
    kind: BackendKind::ProjectFile,
    description: "Xilinx ISE Design Suite (Spartan-3 to 7 series)",
    tool: "xtclsh",
    install_hint: "Install ISE 14.7 and source settings64.sh from its install directory",
    default_part: "xc7k160t-3-fbg484",
    script: "ise.tcl",
    command: "xtclsh ise.tcl",
    bitstream_ext: "bit",
    transfer: Some(TransferCapabilities {
        script: PROG_SCRIPT,
        command: PROG_COMMAND,
        devtypes: &[DevType::Fpga, DevType::Spi, DevType::Bpi, DevType::Xcf],
    }),
};

/// Shape ISE requires.
const ISE_PART_SHAPE: &str = "DEVICE-SPEED-PACKAGE";

/// ISE family names, most specific prefixes first.
const ISE_FAMILIES: &[FamilyTable] = &[
    FamilyTable {
        name: FamilyName::Fixed("artix7"),
        prefixes: &["xc7a"],
    },
    FamilyTable {
        name: FamilyName::Fixed("kintex7"),
        prefixes: &["xc7k"],
    },
    FamilyTable {
        name: FamilyName::Fixed("virtex7"),
        prefixes: &["xc7v"],
    },
    FamilyTable {
        name: FamilyName::Fixed("zynq"),
        prefixes: &["xc7z"],
    },
    FamilyTable {
        name: FamilyName::Fixed("spartan6"),
        prefixes: &["xc6s"],
    },
    FamilyTable {
        name: FamilyName::Fixed("virtex6"),
        prefixes: &["xc6v"],
    },
    FamilyTable {
        name: FamilyName::Fixed("virtex5"),
        prefixes: &["xc5v"],
    },
    FamilyTable {
        name: FamilyName::Fixed("virtex4"),
        prefixes: &["xc4v"],
    },
    FamilyTable {
        name: FamilyName::Fixed("spartan3adsp"),
        prefixes: &["xc3sd"],
    },
    FamilyTable {
        name: FamilyName::Fixed("spartan3a"),
        prefixes: &["xc3s50a", "xc3s200a", "xc3s400a", "xc3s700a", "xc3s1400a"],
    },
    FamilyTable {
        name: FamilyName::Fixed("spartan3e"),
        prefixes: &["xc3s100e", "xc3s250e", "xc3s500e", "xc3s1200e", "xc3s1600e"],
    },
    FamilyTable {
        name: FamilyName::Fixed("spartan3"),
        prefixes: &["xc3s"],
    },
];

/// Split a part into `(device, speed, package)`.
fn split_ise_part(part: &str) -> Result<(&str, &str, &str), BuildError> {
    let parts: Vec<&str> = part.split(PART_DELIMITER).collect();
    match parts.as_slice() {
        [device, speed, package]
            if !device.is_empty() && !speed.is_empty() && !package.is_empty() =>
        {
            Ok((*device, *speed, *package))
        }
        _ => Err(BuildError::MalformedPart {
            part: part.to_string(),
            expected: ISE_PART_SHAPE.to_string(),
        }),
    }
}

/// iMPACT commands for one programming operation.
fn impact_commands(settings: &TransferSettings, bitstream: &Path) -> Vec<String> {
    let pos = settings.position;
    let mcs = path_str(&bitstream.with_extension("mcs"));
    let bit = path_str(bitstream);
    let mempart = settings.mempart.as_deref().unwrap_or_default();
    let width = settings.width.unwrap_or(1);

    match settings.devtype {
        DevType::Fpga => vec![
            format!("assignFile -p {} -file {}", pos, bit),
            format!("program -p {}", pos),
        ],
        DevType::Spi => vec![
            format!("attachflash -position {} -spi {}", pos, mempart),
            format!("assignfiletoattachedflash -position {} -file {}", pos, mcs),
            format!(
                "program -p {} -dataWidth {} -spionly -e -v -loadfpga",
                pos, width
            ),
        ],
        DevType::Bpi => vec![
            format!("attachflash -position {} -bpi {}", pos, mempart),
            format!("assignfiletoattachedflash -position {} -file {}", pos, mcs),
            format!(
                "program -p {} -dataWidth {} -rs1 NONE -rs0 NONE -bpionly -e -v -loadfpga",
                pos, width
            ),
        ],
        DevType::Xcf => vec![
            format!("assignFile -p {} -file {}", pos, mcs),
            format!("program -p {} -e -v", pos),
        ],
    }
}

/// ISE backend shim.
pub struct IseShim {
    resolver: PartResolver,
}

impl IseShim {
    pub fn new() -> Self {
        let resolver = ISE_FAMILIES
            .iter()
            .fold(PartResolver::new(), |r, table| r.with_table(*table));
        IseShim { resolver }
    }
}

impl Default for IseShim {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendShim for IseShim {
    fn capabilities(&self) -> &BackendCapabilities {
        &CAPABILITIES
    }

    fn resolver(&self) -> &PartResolver {
        &self.resolver
    }

    fn describe_part(&self, part: &str) -> Result<PartDescriptor, BuildError> {
        let (device, _, package) = split_ise_part(part)?;
        Ok(PartDescriptor {
            family: self.resolver.family(part),
            device: device.to_string(),
            package: package.to_string(),
        })
    }

    fn build_context(
        &self,
        config: &BuildConfig,
        part: &PartDescriptor,
        ctx: &mut RenderContext,
    ) -> Result<(), BuildError> {
        let (_, speed, _) = split_ise_part(&config.part)?;
        ctx.insert("SPEED", format!("-{}", speed));
        // ISE aborts on a project without a family
        ctx.insert("FAMILY", part.require_family(&config.part)?);

        let mut files = Vec::new();
        let mut libraries: Vec<&str> = Vec::new();
        for file in &config.files {
            match (&file.library, file.kind) {
                (Some(lib), FileKind::Vhdl) => {
                    if !libraries.contains(&lib.as_str()) {
                        files.push(format!("lib_vhdl new {}", lib));
                        libraries.push(lib.as_str());
                    }
                    files.push(format!("xfile add {} -lib_vhdl {}", braced(&file.path), lib));
                }
                _ => files.push(format!("xfile add {}", braced(&file.path))),
            }
        }
        ctx.insert("FILES", files.join("\n"));

        let constraints: Vec<_> = config
            .constraints
            .iter()
            .map(|c| format!("xfile add {}", braced(&c.path)))
            .collect();
        ctx.insert("CONSTRAINTS", constraints.join("\n"));

        if !config.includes.is_empty() {
            let dirs: Vec<_> = config.includes.iter().map(|p| path_str(p)).collect();
            ctx.insert(
                "INCLUDES",
                format!(
                    "project set \"Verilog Include Directories\" \"{}\" -process \"Synthesize - XST\"",
                    dirs.join("|")
                ),
            );
        }
        if !config.defines.is_empty() {
            ctx.insert(
                "DEFINES",
                format!(
                    "project set \"Verilog Macros\" \"{}\" -process \"Synthesize - XST\"",
                    key_values(&config.defines, " | ")
                ),
            );
        }
        if !config.params.is_empty() {
            ctx.insert(
                "PARAMS",
                format!(
                    "project set \"Generics, Parameters\" \"{}\" -process \"Synthesize - XST\"",
                    key_values(&config.params, " ")
                ),
            );
        }

        Ok(())
    }

    fn transfer(
        &self,
        _config: &BuildConfig,
        ctx: &RenderContext,
        req: &TransferRequest,
        templates: &TemplateSource,
    ) -> Result<ScriptPlan, BuildError> {
        let settings = TransferSettings::validate(&CAPABILITIES, req)?;
        let bitstream = ctx.get("BITSTREAM").ok_or(BuildError::MissingValue {
            what: "bitstream",
            expected: "a path to the generated bitstream".to_string(),
        })?;

        let mut ctx = ctx.clone();
        settings.apply(&mut ctx);
        ctx.insert(
            "PROG_COMMANDS",
            impact_commands(&settings, Path::new(bitstream)).join("\n"),
        );

        let text = templates.render(PROG_SCRIPT, &ctx)?;
        Ok(ScriptPlan::single(PROG_SCRIPT, text, PROG_COMMAND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FileEntry;
    use std::path::PathBuf;

    #[test]
    fn test_requires_three_components() {
        let shim = IseShim::new();
        assert!(shim.normalize_part("xc6slx9-2-csg324").is_ok());
        match shim.normalize_part("xc6slx9-csg324") {
            Err(BuildError::MalformedPart { expected, .. }) => {
                assert_eq!(expected, "DEVICE-SPEED-PACKAGE")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_family_table_order() {
        let shim = IseShim::new();
        let family = |p: &str| shim.describe_part(p).unwrap().family;
        assert_eq!(family("xc3s700a-4-fg484").as_deref(), Some("spartan3a"));
        assert_eq!(family("xc3s500e-4-fg320").as_deref(), Some("spartan3e"));
        assert_eq!(family("xc3sd1800a-4-fg676").as_deref(), Some("spartan3adsp"));
        assert_eq!(family("xc3s1000-4-ft256").as_deref(), Some("spartan3"));
        assert_eq!(family("XC6SLX9-2-CSG324").as_deref(), Some("spartan6"));
    }

    #[test]
    fn test_context() {
        let shim = IseShim::new();
        let mut config = BuildConfig::new("xc6slx9-2-csg324");
        config.files.push(FileEntry {
            path: PathBuf::from("/hdl/a.vhdl"),
            kind: FileKind::Vhdl,
            library: Some("blink".to_string()),
        });
        config.files.push(FileEntry {
            path: PathBuf::from("/hdl/b.vhdl"),
            kind: FileKind::Vhdl,
            library: Some("blink".to_string()),
        });

        let part = shim.describe_part(&config.part).unwrap();
        let mut ctx = RenderContext::new();
        shim.build_context(&config, &part, &mut ctx).unwrap();

        assert_eq!(ctx.get("SPEED"), Some("-2"));
        assert_eq!(ctx.get("FAMILY"), Some("spartan6"));
        assert_eq!(
            ctx.get("FILES"),
            Some(
                "lib_vhdl new blink\n\
                 xfile add {/hdl/a.vhdl} -lib_vhdl blink\n\
                 xfile add {/hdl/b.vhdl} -lib_vhdl blink"
            )
        );
    }

    #[test]
    fn test_unknown_family_fails_at_context() {
        let shim = IseShim::new();
        let config = BuildConfig::new("foo-1-bar");
        let part = shim.describe_part(&config.part).unwrap();
        let mut ctx = RenderContext::new();
        assert!(matches!(
            shim.build_context(&config, &part, &mut ctx),
            Err(BuildError::UnresolvedFamily { .. })
        ));
    }

    #[test]
    fn test_impact_commands() {
        let settings = TransferSettings {
            devtype: DevType::Spi,
            position: 1,
            mempart: Some("N25Q128".to_string()),
            width: Some(4),
        };
        let cmds = impact_commands(&settings, Path::new("/out/ise.bit"));
        assert_eq!(cmds[0], "attachflash -position 1 -spi N25Q128");
        assert_eq!(cmds[1], "assignfiletoattachedflash -position 1 -file /out/ise.mcs");
        assert!(cmds[2].contains("-dataWidth 4 -spionly"));
    }

    #[test]
    fn test_transfer_renders_commands() {
        let mut ctx = RenderContext::new();
        ctx.insert("BITSTREAM", "/out/ise.bit");
        let mut req = TransferRequest::new(DevType::Fpga);
        req.position = Some(2);

        let plan = IseShim::new()
            .transfer(
                &BuildConfig::new(CAPABILITIES.default_part),
                &ctx,
                &req,
                &TemplateSource::builtin(),
            )
            .unwrap();
        assert_eq!(plan.command, "impact -batch ise-prog.impact");
        let text = &plan.scripts[0].text;
        assert!(text.contains("assignFile -p 2 -file /out/ise.bit\nprogram -p 2"));
        assert!(text.ends_with("quit\n"));
    }
}
