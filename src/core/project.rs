//! The build description of one FPGA project.
//!
//! A [`Project`] owns a [`BuildConfig`] and the shim of its backend. Every
//! mutating call validates its input immediately, so a project that accepted
//! all its calls can always be rendered, except for a part whose family is
//! unknown to a backend that needs it.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::builder::shim::{create_shim, BackendId, BackendShim, ScriptPlan};
use crate::builder::template::{RenderContext, TemplateSource};
use crate::core::choice::{DevType, Strategy, Task};
use crate::core::config::{
    is_constraint_file, BuildConfig, ConstraintEntry, ConstraintStage, FileEntry, FileKind,
};
use crate::core::errors::BuildError;
use crate::core::part::PartDescriptor;
use crate::core::phase::{HookStage, Phase, PhaseRegistry};
use crate::util::fs::{absolute, write_atomic};

/// What to program and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub devtype: DevType,
    /// 1-based position in the JTAG chain
    pub position: Option<u32>,
    /// Configuration memory part, required for `spi` and `bpi`
    pub part: Option<String>,
    /// Configuration memory data width
    pub width: Option<u32>,
    /// Bitstream to program, defaults to `<outdir>/<name>.<ext>`
    pub bitstream: Option<PathBuf>,
}

impl TransferRequest {
    pub fn new(devtype: DevType) -> Self {
        TransferRequest {
            devtype,
            position: None,
            part: None,
            width: None,
            bitstream: None,
        }
    }
}

/// Written scripts and the command that runs them.
///
/// The command is meant to be run from `workdir`; nothing here executes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub command: String,
    pub workdir: PathBuf,
    pub scripts: Vec<PathBuf>,
}

/// A tool-neutral build description bound to one backend.
pub struct Project {
    name: String,
    shim: Box<dyn BackendShim>,
    config: BuildConfig,
    templates: TemplateSource,
}

impl Project {
    /// Create a project for a built-in backend.
    ///
    /// The project is named after the backend and targets its default part.
    pub fn new(backend: BackendId) -> Self {
        Project::from_shim(create_shim(backend))
    }

    /// Create a project around any shim.
    pub fn from_shim(shim: Box<dyn BackendShim>) -> Self {
        let caps = shim.capabilities();
        Project {
            name: caps.id.to_string(),
            config: BuildConfig::new(caps.default_part),
            templates: TemplateSource::builtin(),
            shim,
        }
    }

    /// Set the project name used for generated artifacts.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn backend(&self) -> BackendId {
        self.shim.id()
    }

    pub fn shim(&self) -> &dyn BackendShim {
        self.shim.as_ref()
    }

    pub fn options(&self) -> &PhaseRegistry<Phase> {
        &self.config.options
    }

    pub fn hooks(&self) -> &PhaseRegistry<HookStage> {
        &self.config.hooks
    }

    pub fn templates(&self) -> &TemplateSource {
        &self.templates
    }

    /// Set the target part.
    ///
    /// The backend validates the shape and may store a normalized form.
    pub fn set_part(&mut self, part: &str) -> Result<(), BuildError> {
        let normalized = self.shim.normalize_part(part)?;
        debug!("part set to {}", normalized);
        self.config.part = normalized;
        Ok(())
    }

    /// Describe the current part with the backend's resolver.
    pub fn part_descriptor(&self) -> Result<PartDescriptor, BuildError> {
        self.shim.describe_part(&self.config.part)
    }

    /// Append a source file.
    ///
    /// The kind is inferred from the extension when not given. Declaration
    /// order is kept because some tools compile in that order.
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        kind: Option<FileKind>,
        library: Option<&str>,
    ) -> Result<(), BuildError> {
        let entry = self.file_entry(path.as_ref(), kind, library)?;
        debug!("added {} file {}", entry.kind, entry.path.display());
        self.config.files.push(entry);
        Ok(())
    }

    /// Append every file matching a glob pattern, sorted by path.
    ///
    /// Constraint files (see [`CONSTRAINT_EXTENSIONS`]) among the matches are
    /// added as constraints for every stage. Either all matches are added or
    /// none is. A pattern matching nothing is an error.
    ///
    /// [`CONSTRAINT_EXTENSIONS`]: crate::core::config::CONSTRAINT_EXTENSIONS
    pub fn add_files(&mut self, pattern: &str, library: Option<&str>) -> Result<usize, BuildError> {
        let paths = glob::glob(pattern).map_err(|source| BuildError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matches: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
        matches.sort();

        if matches.is_empty() {
            return Err(BuildError::MissingValue {
                what: "source files",
                expected: format!("at least one file matching `{}`", pattern),
            });
        }

        let (constraints, sources): (Vec<PathBuf>, Vec<PathBuf>) =
            matches.into_iter().partition(|p| is_constraint_file(p));
        let entries = sources
            .iter()
            .map(|path| self.file_entry(path, None, library))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "pattern {} added {} files and {} constraints",
            pattern,
            entries.len(),
            constraints.len()
        );
        let count = entries.len() + constraints.len();
        self.config.files.extend(entries);
        for path in constraints {
            self.add_constraint(path, ConstraintStage::All);
        }
        Ok(count)
    }

    fn file_entry(
        &self,
        path: &Path,
        kind: Option<FileKind>,
        library: Option<&str>,
    ) -> Result<FileEntry, BuildError> {
        let kind = match kind {
            Some(kind) => kind,
            None => FileKind::infer(path)?,
        };
        let entry = FileEntry {
            path: absolute(path),
            kind,
            library: library.map(str::to_string),
        };
        self.shim.check_file(&entry)?;
        Ok(entry)
    }

    /// Append a Verilog include directory.
    pub fn add_include(&mut self, path: impl AsRef<Path>) {
        let path = absolute(path.as_ref());
        debug!("added include {}", path.display());
        self.config.includes.push(path);
    }

    /// Append a constraint file for the given stage.
    pub fn add_constraint(&mut self, path: impl AsRef<Path>, stage: ConstraintStage) {
        let path = absolute(path.as_ref());
        debug!("added {} constraint {}", stage, path.display());
        self.config
            .constraints
            .push(ConstraintEntry { path, stage });
    }

    /// Set a Verilog define. A later value for the same name wins.
    pub fn add_define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.config.defines.insert(name.into(), value.into());
    }

    /// Set a top-level parameter or generic. A later value wins.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.config.params.insert(name.into(), value.into());
    }

    /// Append a raw command run at a pipeline stage.
    pub fn add_hook(&mut self, stage: HookStage, command: impl Into<String>) {
        self.config.hooks.add(command, stage);
    }

    /// Append a raw tool option to a phase.
    pub fn add_option(&mut self, text: impl Into<String>, phase: Phase) {
        self.config.options.add(text, phase);
    }

    pub fn set_top(&mut self, top: impl Into<String>) {
        self.config.top = top.into();
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.config.strategy = strategy;
    }

    pub fn set_task(&mut self, task: Task) {
        self.config.task = task;
    }

    pub fn set_outdir(&mut self, outdir: impl Into<PathBuf>) {
        self.config.outdir = outdir.into();
    }

    /// Look for template overrides in `dir` before the built-in ones.
    pub fn set_template_dir(&mut self, dir: impl Into<PathBuf>) {
        self.templates = TemplateSource::with_dir(dir);
    }

    /// Build the render context for the current state.
    pub fn context(&self) -> Result<RenderContext, BuildError> {
        let part = self.part_descriptor()?;
        let config = &self.config;

        let mut ctx = RenderContext::new();
        ctx.insert("TOOL", self.backend().as_str());
        ctx.insert("PROJECT", self.name.as_str());
        ctx.insert("PART", config.part.as_str());
        ctx.insert("FAMILY", part.family.clone().unwrap_or_default());
        ctx.insert("DEVICE", part.device.as_str());
        ctx.insert("PACKAGE", part.package.as_str());
        ctx.insert("TOP", config.top.as_str());
        ctx.insert("STRATEGY", config.strategy.as_str());
        ctx.insert("TASK", config.task.as_str());
        ctx.extend(config.options.placeholders());
        ctx.extend(config.hooks.placeholders());

        self.shim.build_context(config, &part, &mut ctx)?;
        Ok(ctx)
    }

    /// Render the build scripts without writing anything.
    pub fn render(&self) -> Result<ScriptPlan, BuildError> {
        let ctx = self.context()?;
        self.shim.generate(&ctx, &self.templates)
    }

    /// Render and write the build scripts into the output directory.
    ///
    /// `strategy` and `task` replace the stored values when given.
    pub fn generate(
        &mut self,
        strategy: Option<Strategy>,
        task: Option<Task>,
    ) -> Result<Invocation, BuildError> {
        if let Some(strategy) = strategy {
            self.config.strategy = strategy;
        }
        if let Some(task) = task {
            self.config.task = task;
        }

        let plan = self.render()?;
        info!(
            "generating {} scripts for {} (strategy {}, task {})",
            self.backend(),
            self.name,
            self.config.strategy,
            self.config.task
        );
        self.write_plan(plan)
    }

    /// Default location of the bitstream this project produces.
    pub fn bitstream_path(&self) -> PathBuf {
        absolute(&self.config.outdir).join(format!(
            "{}.{}",
            self.name,
            self.shim.capabilities().bitstream_ext
        ))
    }

    /// Render and write the programming script.
    pub fn transfer(&self, req: &TransferRequest) -> Result<Invocation, BuildError> {
        let caps = self.shim.capabilities();
        if !caps.supports_transfer() {
            return Err(BuildError::unsupported(caps.id, "transfer"));
        }

        let bitstream = match &req.bitstream {
            Some(path) => absolute(path),
            None => self.bitstream_path(),
        };

        let mut ctx = self.context()?;
        ctx.insert("BITSTREAM", bitstream.to_string_lossy().replace('\\', "/"));

        let plan = self
            .shim
            .transfer(&self.config, &ctx, req, &self.templates)?;
        info!(
            "programming {} with {} ({})",
            req.devtype,
            bitstream.display(),
            self.backend()
        );
        self.write_plan(plan)
    }

    fn write_plan(&self, plan: ScriptPlan) -> Result<Invocation, BuildError> {
        let workdir = absolute(&self.config.outdir);

        let mut scripts = Vec::with_capacity(plan.scripts.len());
        for script in &plan.scripts {
            let path = workdir.join(&script.file_name);
            write_atomic(&path, &script.text).map_err(|source| BuildError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("wrote {}", path.display());
            scripts.push(path);
        }

        Ok(Invocation {
            command: plan.command,
            workdir,
            scripts,
        })
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("name", &self.name)
            .field("backend", &self.backend())
            .field("config", &self.config)
            .field("templates", &self.templates)
            .finish()
    }
}
