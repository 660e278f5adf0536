//! Libero SoC backend shim.
//!
//! Libero parts are written `FAMILY-SPEED-PACKAGE` or `FAMILY-PACKAGE`.
//! The speed grade may also come last (`mpf100t-fcg484-1`) and defaults to
//! `STD` when absent. Libero has no batch programming flow here.

use std::sync::LazyLock;

use regex::Regex;

use crate::builder::shim::capabilities::{BackendCapabilities, BackendId, BackendKind};
use crate::builder::shim::tcl::{braced, extension, path_str};
use crate::builder::shim::trait_def::BackendShim;
use crate::builder::template::RenderContext;
use crate::core::config::BuildConfig;
use crate::core::errors::BuildError;
use crate::core::part::{FamilyName, FamilyTable, PartDescriptor, PartResolver};

const CAPABILITIES: BackendCapabilities = BackendCapabilities {
    id: BackendId::Libero,
    kind: BackendKind::ProjectFile,
    description: "Microchip Libero SoC (PolarFire, SmartFusion2, IGLOO2)",
    tool: "libero",
    install_hint: "Install Libero SoC and add its bin directory to PATH",
    default_part: "mpf100t-1-fcg484",
    script: "libero.tcl",
    command: "libero SCRIPT:libero.tcl",
    bitstream_ext: "stp",
    transfer: None,
};

const LIBERO_PART_SHAPE: &str = "FAMILY-SPEED-PACKAGE or FAMILY-PACKAGE";

/// Speed grade used when the part does not name one.
pub const DEFAULT_SPEED: &str = "STD";

static LIBERO_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)-(\w+)(?:-(\w+))?$").expect("literal regex is valid")
});

const LIBERO_FAMILIES: &[FamilyTable] = &[
    FamilyTable {
        name: FamilyName::Fixed("PolarFireSoC"),
        prefixes: &["mpfs"],
    },
    FamilyTable {
        name: FamilyName::Fixed("PolarFire"),
        prefixes: &["mpf"],
    },
    FamilyTable {
        name: FamilyName::Fixed("SmartFusion2"),
        prefixes: &["m2s"],
    },
    FamilyTable {
        name: FamilyName::Fixed("IGLOO2"),
        prefixes: &["m2gl"],
    },
    FamilyTable {
        name: FamilyName::Fixed("RTG4"),
        prefixes: &["rt4g"],
    },
];

/// A Libero part split into its three components.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LiberoPart {
    die: String,
    speed: String,
    package: String,
}

impl LiberoPart {
    fn parse(part: &str) -> Result<LiberoPart, BuildError> {
        let caps = LIBERO_PART
            .captures(part)
            .ok_or_else(|| BuildError::MalformedPart {
                part: part.to_string(),
                expected: LIBERO_PART_SHAPE.to_string(),
            })?;

        let die = caps[1].to_string();
        let mut speed = caps[2].to_string();
        let mut package = caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default();

        // The package is always the longer token
        if speed.len() > package.len() {
            std::mem::swap(&mut speed, &mut package);
        }
        if speed.is_empty() {
            speed = DEFAULT_SPEED.to_string();
        }

        Ok(LiberoPart {
            die,
            speed,
            package,
        })
    }

    fn to_part_string(&self) -> String {
        format!("{}-{}-{}", self.die, self.speed, self.package)
    }
}

/// Libero SoC backend shim.
pub struct LiberoShim {
    resolver: PartResolver,
}

impl LiberoShim {
    pub fn new() -> Self {
        let resolver = LIBERO_FAMILIES
            .iter()
            .fold(PartResolver::new(), |r, table| r.with_table(*table));
        LiberoShim { resolver }
    }
}

impl Default for LiberoShim {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendShim for LiberoShim {
    fn capabilities(&self) -> &BackendCapabilities {
        &CAPABILITIES
    }

    fn resolver(&self) -> &PartResolver {
        &self.resolver
    }

    fn describe_part(&self, part: &str) -> Result<PartDescriptor, BuildError> {
        let parsed = LiberoPart::parse(part)?;
        Ok(PartDescriptor {
            family: self.resolver.family(part),
            device: parsed.die,
            package: parsed.package,
        })
    }

    fn normalize_part(&self, part: &str) -> Result<String, BuildError> {
        Ok(LiberoPart::parse(part)?.to_part_string())
    }

    fn build_context(
        &self,
        config: &BuildConfig,
        part: &PartDescriptor,
        ctx: &mut RenderContext,
    ) -> Result<(), BuildError> {
        let parsed = LiberoPart::parse(&config.part)?;
        ctx.insert("FAMILY", part.require_family(&config.part)?);
        ctx.insert("DEVICE", parsed.die.to_uppercase());
        ctx.insert("PACKAGE", parsed.package.to_uppercase());
        ctx.insert(
            "SPEED",
            if parsed.speed == DEFAULT_SPEED {
                parsed.speed
            } else {
                format!("-{}", parsed.speed)
            },
        );

        let mut files = Vec::new();
        for file in &config.files {
            files.push(format!("create_links -hdl_source {}", braced(&file.path)));
            if let Some(lib) = &file.library {
                files.push(format!("add_library -library {{{}}}", lib));
                files.push(format!(
                    "add_file_to_library -library {{{}}} -file {}",
                    lib,
                    braced(&file.path)
                ));
            }
        }
        ctx.insert("FILES", files.join("\n"));

        let module = format!("{{{}::work}}", config.top);
        let mut constraints = Vec::new();
        for entry in &config.constraints {
            let path = braced(&entry.path);
            let (link, input) = match extension(&entry.path).as_str() {
                "pdc" => ("-io_pdc", "pdc"),
                "sdc" => ("-sdc", "constraint"),
                _ => ("-fdc", "fdc"),
            };
            constraints.push(format!("create_links {} {}", link, path));
            if entry.stage.in_synthesis() && input != "pdc" {
                constraints.push(format!(
                    "organize_tool_files -tool {{SYNTHESIZE}} -file {} -module {} -input_type {{{}}}",
                    path, module, input
                ));
            }
            if entry.stage.in_implementation() {
                constraints.push(format!(
                    "organize_tool_files -tool {{PLACEROUTE}} -file {} -module {} -input_type {{{}}}",
                    path, module, input
                ));
            }
        }
        ctx.insert("CONSTRAINTS", constraints.join("\n"));

        if !config.includes.is_empty() {
            let dirs: Vec<_> = config.includes.iter().map(|p| path_str(p)).collect();
            ctx.insert(
                "INCLUDES",
                format!(
                    "configure_tool -name {{SYNTHESIZE}} -params {{SYNPLIFY_OPTIONS:set_option -include_path \"{}\"}}",
                    dirs.join(";")
                ),
            );
        }
        if !config.defines.is_empty() {
            let defines: Vec<_> = config
                .defines
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            ctx.insert(
                "DEFINES",
                format!(
                    "configure_tool -name {{SYNTHESIZE}} -params {{SYNPLIFY_OPTIONS:set_option -hdl_define -set \"{}\"}}",
                    defines.join(" ")
                ),
            );
        }
        let params: Vec<_> = config
            .params
            .iter()
            .map(|(k, v)| {
                format!(
                    "configure_tool -name {{SYNTHESIZE}} -params {{SYNPLIFY_OPTIONS:set_option -hdl_param -set \"{}={}\"}}",
                    k, v
                )
            })
            .collect();
        ctx.insert("PARAMS", params.join("\n"));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::template::TemplateSource;
    use crate::core::choice::DevType;
    use crate::core::config::{ConstraintEntry, ConstraintStage};
    use crate::core::project::TransferRequest;
    use std::path::PathBuf;

    #[test]
    fn test_normalize() {
        let shim = LiberoShim::new();
        assert_eq!(shim.normalize_part("mpf100t-1-fcg484").unwrap(), "mpf100t-1-fcg484");
        assert_eq!(shim.normalize_part("mpf100t-fcg484").unwrap(), "mpf100t-STD-fcg484");
        assert_eq!(shim.normalize_part("mpf100t-fcg484-1").unwrap(), "mpf100t-1-fcg484");
        assert_eq!(shim.normalize_part("m2s010-1-tq144").unwrap(), "m2s010-1-tq144");
    }

    #[test]
    fn test_normalize_rejects() {
        let shim = LiberoShim::new();
        for bad in ["", "mpf100t", "a-b-c-d", "mpf100t fcg484"] {
            match shim.normalize_part(bad) {
                Err(BuildError::MalformedPart { expected, .. }) => {
                    assert_eq!(expected, "FAMILY-SPEED-PACKAGE or FAMILY-PACKAGE")
                }
                other => panic!("`{bad}`: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_family_table_order() {
        let shim = LiberoShim::new();
        let family = |p: &str| shim.describe_part(p).unwrap().family;
        assert_eq!(family("mpfs250t-fcvg484").as_deref(), Some("PolarFireSoC"));
        assert_eq!(family("MPF300T-1-FCG1152").as_deref(), Some("PolarFire"));
        assert_eq!(family("m2gl025-vf256").as_deref(), Some("IGLOO2"));
    }

    #[test]
    fn test_context() {
        let shim = LiberoShim::new();
        let mut config = BuildConfig::new("mpf100t-fcg484");
        config.top = "Top".to_string();
        config.constraints.push(ConstraintEntry {
            path: PathBuf::from("/c/timing.sdc"),
            stage: ConstraintStage::Syn,
        });
        config.constraints.push(ConstraintEntry {
            path: PathBuf::from("/c/io.pdc"),
            stage: ConstraintStage::All,
        });

        let part = shim.describe_part(&config.part).unwrap();
        let mut ctx = RenderContext::new();
        shim.build_context(&config, &part, &mut ctx).unwrap();

        assert_eq!(ctx.get("FAMILY"), Some("PolarFire"));
        assert_eq!(ctx.get("DEVICE"), Some("MPF100T"));
        assert_eq!(ctx.get("PACKAGE"), Some("FCG484"));
        assert_eq!(ctx.get("SPEED"), Some("STD"));

        let constraints = ctx.get("CONSTRAINTS").unwrap();
        assert!(constraints.contains("create_links -sdc {/c/timing.sdc}"));
        assert!(constraints.contains(
            "organize_tool_files -tool {SYNTHESIZE} -file {/c/timing.sdc} -module {Top::work} -input_type {constraint}"
        ));
        assert!(!constraints.contains("-tool {PLACEROUTE} -file {/c/timing.sdc}"));
        assert!(!constraints.contains("-tool {SYNTHESIZE} -file {/c/io.pdc}"));
        assert!(constraints.contains("-tool {PLACEROUTE} -file {/c/io.pdc}"));
    }

    #[test]
    fn test_no_transfer() {
        let mut ctx = RenderContext::new();
        ctx.insert("BITSTREAM", "/out/libero.stp");
        let err = LiberoShim::new()
            .transfer(
                &BuildConfig::new(CAPABILITIES.default_part),
                &ctx,
                &TransferRequest::new(DevType::Fpga),
                &TemplateSource::builtin(),
            )
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedOperation { .. }));
    }
}
