//! Fpga.toml manifest parsing and schema.
//!
//! The manifest declares a whole build once. It is applied to a fresh
//! [`Project`] for the selected backend. Relative paths are taken relative
//! to the directory holding the manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::shim::BackendId;
use crate::core::config::{is_constraint_file, ConstraintStage, FileKind};
use crate::core::phase::{HookStage, Phase};
use crate::core::project::Project;
use crate::util::fs::{glob_files, is_glob};

/// Name of the manifest file.
pub const MANIFEST_NAME: &str = "Fpga.toml";

/// The `[project]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,
    pub backend: Option<String>,
    pub part: Option<String>,
    pub top: Option<String>,
    pub outdir: Option<PathBuf>,
    pub strategy: Option<String>,
    pub task: Option<String>,
    pub template_dir: Option<PathBuf>,
}

/// One `[[files]]` entry. `path` may be a glob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSpec {
    pub path: String,
    pub kind: Option<String>,
    pub library: Option<String>,
}

/// One `[[constraints]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintSpec {
    pub path: PathBuf,
    pub stage: Option<String>,
}

/// A define or parameter value. TOML numbers and booleans are accepted and
/// rendered the way they are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::String(s) => write!(f, "{}", s),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Float(x) => write!(f, "{}", x),
            ScalarValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// The parsed Fpga.toml manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub includes: Vec<PathBuf>,

    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub files: Vec<FileSpec>,

    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,

    #[serde(default)]
    pub defines: BTreeMap<String, ScalarValue>,

    #[serde(default)]
    pub params: BTreeMap<String, ScalarValue>,

    /// Phase name to tool options
    #[serde(default)]
    pub options: BTreeMap<String, Vec<String>>,

    /// Hook stage name to commands
    #[serde(default)]
    pub hooks: BTreeMap<String, Vec<String>>,

    /// Directory containing the manifest
    #[serde(skip)]
    pub manifest_dir: PathBuf,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut manifest: Manifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        manifest.manifest_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(manifest)
    }

    /// Backend named in the manifest, if any.
    pub fn backend(&self) -> Result<Option<BackendId>> {
        self.project
            .backend
            .as_deref()
            .map(|name| {
                name.parse::<BackendId>()
                    .with_context(|| format!("invalid [project] backend in {}", MANIFEST_NAME))
            })
            .transpose()
    }

    /// Resolve a manifest-relative path.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.manifest_dir.join(path)
        }
    }

    /// Build a project for `backend` from this manifest.
    ///
    /// Every value goes through the same validation as the library calls;
    /// the first rejected value aborts with the manifest field in context.
    pub fn to_project(&self, backend: BackendId) -> Result<Project> {
        let mut project = Project::new(backend);
        let section = &self.project;

        if let Some(name) = &section.name {
            if name.trim().is_empty() {
                bail!("[project] name in {} must not be empty", MANIFEST_NAME);
            }
            project = project.with_name(name);
        }
        if let Some(part) = &section.part {
            project
                .set_part(part)
                .with_context(|| format!("invalid [project] part for the {} backend", backend))?;
        }
        if let Some(top) = &section.top {
            project.set_top(top);
        }
        if let Some(strategy) = &section.strategy {
            project.set_strategy(strategy.parse().context("invalid [project] strategy")?);
        }
        if let Some(task) = &section.task {
            project.set_task(task.parse().context("invalid [project] task")?);
        }
        if let Some(outdir) = &section.outdir {
            project.set_outdir(self.resolve_path(outdir));
        }
        if let Some(dir) = &section.template_dir {
            project.set_template_dir(self.resolve_path(dir));
        }

        for spec in &self.files {
            self.apply_file(&mut project, spec)
                .with_context(|| format!("invalid [[files]] entry `{}`", spec.path))?;
        }

        for include in &self.includes {
            project.add_include(self.resolve_path(include));
        }

        for spec in &self.constraints {
            let stage = match &spec.stage {
                Some(stage) => stage.parse().with_context(|| {
                    format!("invalid stage for constraint `{}`", spec.path.display())
                })?,
                None => ConstraintStage::default(),
            };
            project.add_constraint(self.resolve_path(&spec.path), stage);
        }

        for (name, value) in &self.defines {
            project.add_define(name, value.to_string());
        }
        for (name, value) in &self.params {
            project.add_param(name, value.to_string());
        }

        for (phase, options) in &self.options {
            let phase: Phase = phase.parse().context("invalid [options] table")?;
            for option in options {
                project.add_option(option, phase);
            }
        }
        for (stage, commands) in &self.hooks {
            let stage: HookStage = stage.parse().context("invalid [hooks] table")?;
            for command in commands {
                project.add_hook(stage, command);
            }
        }

        tracing::debug!(
            "manifest applied: {} files, {} constraints",
            project.config().files.len(),
            project.config().constraints.len()
        );
        Ok(project)
    }

    fn apply_file(&self, project: &mut Project, spec: &FileSpec) -> Result<()> {
        let library = spec.library.as_deref();
        let kind = spec
            .kind
            .as_deref()
            .map(str::parse::<FileKind>)
            .transpose()?;

        if !is_glob(&spec.path) {
            let path = self.resolve_path(Path::new(&spec.path));
            if kind.is_none() && is_constraint_file(&path) {
                project.add_constraint(path, ConstraintStage::All);
            } else {
                project.add_file(path, kind, library)?;
            }
            return Ok(());
        }

        match kind {
            None => {
                let pattern = self.resolve_path(Path::new(&spec.path));
                project.add_files(&pattern.to_string_lossy(), library)?;
            }
            Some(kind) => {
                let paths = glob_files(&self.manifest_dir, &spec.path)?;
                if paths.is_empty() {
                    bail!("pattern matched no files");
                }
                for path in paths {
                    project.add_file(path, Some(kind), library)?;
                }
            }
        }
        Ok(())
    }
}

/// Look for a manifest in `start` and its ancestors.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}

/// Generate a starter Fpga.toml.
pub fn generate_manifest(name: &str, backend: BackendId, part: &str) -> String {
    format!(
        r#"includes = []

[project]
name = "{name}"
backend = "{backend}"
part = "{part}"
top = "Top"
outdir = "results"
strategy = "none"
task = "bit"

[[files]]
path = "hdl/*.v"

# [[constraints]]
# path = "constraints/pins.xdc"
# stage = "all"

[defines]

[params]

[options]

[hooks]
"#
    )
}
