//! The declarative build description owned by a [`Project`](crate::core::project::Project).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::core::choice::{Strategy, Task};
use crate::core::errors::BuildError;
use crate::core::phase::{HookStage, Phase, PhaseRegistry};

/// Default top-level unit name.
pub const DEFAULT_TOP: &str = "undefined";

/// Default output directory.
pub const DEFAULT_OUTDIR: &str = "results";

/// Hardware description language of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Vhdl,
    Verilog,
    SystemVerilog,
}

impl FileKind {
    /// All file kinds.
    pub const ALL: &'static [FileKind] = &[FileKind::Vhdl, FileKind::Verilog, FileKind::SystemVerilog];

    /// Extensions recognized by [`FileKind::from_path`].
    pub const EXTENSIONS: &'static [&'static str] = &["vhd", "vhdl", "v", "vh", "sv", "svh"];

    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Vhdl => "vhdl",
            FileKind::Verilog => "verilog",
            FileKind::SystemVerilog => "systemverilog",
        }
    }

    /// Infer the kind from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "vhd" | "vhdl" => Some(FileKind::Vhdl),
            "v" | "vh" => Some(FileKind::Verilog),
            "sv" | "svh" => Some(FileKind::SystemVerilog),
            _ => None,
        }
    }

    /// Infer the kind or fail listing the known extensions.
    pub fn infer(path: &Path) -> Result<FileKind, BuildError> {
        FileKind::from_path(path).ok_or_else(|| {
            BuildError::invalid_choice(
                "source extension",
                path.display().to_string(),
                FileKind::EXTENSIONS,
            )
        })
    }

    /// Check if the kind is Verilog or SystemVerilog.
    pub fn is_verilog(&self) -> bool {
        matches!(self, FileKind::Verilog | FileKind::SystemVerilog)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vhdl" => Ok(FileKind::Vhdl),
            "verilog" | "vlog" => Ok(FileKind::Verilog),
            "systemverilog" | "slog" | "sv" => Ok(FileKind::SystemVerilog),
            _ => Err(BuildError::invalid_choice("file kind", s, FileKind::ALL)),
        }
    }
}

/// A source file of the design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub kind: FileKind,
    /// HDL library the file is compiled into, `None` for the default one
    pub library: Option<String>,
}

/// Extensions of constraint files picked up by source globs.
pub const CONSTRAINT_EXTENSIONS: &[&str] =
    &["xdc", "ucf", "sdc", "pcf", "lpf", "pdc", "fdc", "qsf"];

/// Check if a path names a constraint file (case-insensitive extension).
pub fn is_constraint_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CONSTRAINT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Pipeline step a constraint file applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintStage {
    /// Synthesis and implementation
    #[default]
    All,
    /// Synthesis only
    Syn,
    /// Place and route only
    Par,
}

impl ConstraintStage {
    /// All stages.
    pub const ALL: &'static [ConstraintStage] =
        &[ConstraintStage::All, ConstraintStage::Syn, ConstraintStage::Par];

    /// Get the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintStage::All => "all",
            ConstraintStage::Syn => "syn",
            ConstraintStage::Par => "par",
        }
    }

    /// Whether synthesis reads this constraint.
    pub fn in_synthesis(&self) -> bool {
        matches!(self, ConstraintStage::All | ConstraintStage::Syn)
    }

    /// Whether place and route reads this constraint.
    pub fn in_implementation(&self) -> bool {
        matches!(self, ConstraintStage::All | ConstraintStage::Par)
    }
}

impl fmt::Display for ConstraintStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConstraintStage {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConstraintStage::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s.to_lowercase())
            .ok_or_else(|| BuildError::invalid_choice("constraint stage", s, ConstraintStage::ALL))
    }
}

/// A constraint file and the stage it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintEntry {
    pub path: PathBuf,
    pub stage: ConstraintStage,
}

/// Everything a backend needs to render a build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub part: String,
    pub files: Vec<FileEntry>,
    pub includes: Vec<PathBuf>,
    pub constraints: Vec<ConstraintEntry>,
    pub defines: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub options: PhaseRegistry<Phase>,
    pub hooks: PhaseRegistry<HookStage>,
    pub top: String,
    pub strategy: Strategy,
    pub task: Task,
    pub outdir: PathBuf,
}

impl BuildConfig {
    /// Create an empty build description targeting `part`.
    pub fn new(part: impl Into<String>) -> Self {
        BuildConfig {
            part: part.into(),
            files: Vec::new(),
            includes: Vec::new(),
            constraints: Vec::new(),
            defines: BTreeMap::new(),
            params: BTreeMap::new(),
            options: PhaseRegistry::new(),
            hooks: PhaseRegistry::new(),
            top: DEFAULT_TOP.to_string(),
            strategy: Strategy::default(),
            task: Task::default(),
            outdir: PathBuf::from(DEFAULT_OUTDIR),
        }
    }

    /// Constraints read by synthesis.
    pub fn synthesis_constraints(&self) -> impl Iterator<Item = &ConstraintEntry> {
        self.constraints.iter().filter(|c| c.stage.in_synthesis())
    }

    /// Constraints read by place and route.
    pub fn implementation_constraints(&self) -> impl Iterator<Item = &ConstraintEntry> {
        self.constraints
            .iter()
            .filter(|c| c.stage.in_implementation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::new("hx8k-ct256");
        assert_eq!(config.top, "undefined");
        assert_eq!(config.outdir, PathBuf::from("results"));
        assert_eq!(config.task, Task::Bit);
        assert_eq!(config.strategy, Strategy::None);
        assert!(config.files.is_empty());
        assert!(config.hooks.is_empty());
    }

    #[test]
    fn test_file_kind_inference() {
        assert_eq!(FileKind::from_path(Path::new("top.vhdl")), Some(FileKind::Vhdl));
        assert_eq!(FileKind::from_path(Path::new("TOP.VHD")), Some(FileKind::Vhdl));
        assert_eq!(FileKind::from_path(Path::new("a/b.v")), Some(FileKind::Verilog));
        assert_eq!(FileKind::from_path(Path::new("pkg.sv")), Some(FileKind::SystemVerilog));
        assert_eq!(FileKind::from_path(Path::new("pins.pcf")), None);
        assert_eq!(FileKind::from_path(Path::new("Makefile")), None);
        assert!(matches!(
            FileKind::infer(Path::new("pins.pcf")),
            Err(BuildError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_file_kind_parse() {
        assert_eq!("vlog".parse::<FileKind>().unwrap(), FileKind::Verilog);
        assert_eq!("SystemVerilog".parse::<FileKind>().unwrap(), FileKind::SystemVerilog);
        assert!("chisel".parse::<FileKind>().is_err());
    }

    #[test]
    fn test_constraint_stages() {
        let mut config = BuildConfig::new("x-y");
        for (name, stage) in [
            ("timing.xdc", ConstraintStage::Syn),
            ("pins.xdc", ConstraintStage::Par),
            ("all.xdc", ConstraintStage::All),
        ] {
            config.constraints.push(ConstraintEntry {
                path: PathBuf::from(name),
                stage,
            });
        }

        let syn: Vec<_> = config.synthesis_constraints().map(|c| c.path.clone()).collect();
        let par: Vec<_> = config.implementation_constraints().map(|c| c.path.clone()).collect();
        assert_eq!(syn, vec![PathBuf::from("timing.xdc"), PathBuf::from("all.xdc")]);
        assert_eq!(par, vec![PathBuf::from("pins.xdc"), PathBuf::from("all.xdc")]);
        assert!("place".parse::<ConstraintStage>().is_err());
    }
}
