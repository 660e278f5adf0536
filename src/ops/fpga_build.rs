//! Implementation of `fpgaforge generate` and `fpgaforge transfer`.
//!
//! Loading a project layers, from lowest to highest precedence: backend
//! defaults, global config, project config, the manifest, then command-line
//! overrides.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::shim::BackendId;
use crate::core::choice::{Strategy, Task};
use crate::core::manifest::{find_manifest, Manifest, MANIFEST_NAME};
use crate::core::project::{Invocation, Project, TransferRequest};
use crate::util::config::{load_config, project_config_path};
use crate::util::diagnostic::suggestions;

/// Where to find the project and what to override.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit manifest, otherwise searched upward from the working directory
    pub manifest_path: Option<PathBuf>,

    /// Global config file (`~/.fpgaforge/config.toml`)
    pub global_config: Option<PathBuf>,

    pub backend: Option<BackendId>,
    pub part: Option<String>,
    pub outdir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
}

/// Load the manifest and build the project it describes.
pub fn load_project(cwd: &Path, opts: &LoadOptions) -> Result<Project> {
    let manifest_path = match &opts.manifest_path {
        Some(path) => path.clone(),
        None => match find_manifest(cwd) {
            Some(path) => path,
            None => bail!(
                "could not find `{}` in `{}` or any parent directory\n{}",
                MANIFEST_NAME,
                cwd.display(),
                suggestions::NO_MANIFEST
            ),
        },
    };

    let manifest = Manifest::load(&manifest_path)?;
    let root = manifest.manifest_dir.clone();
    let config = load_config(opts.global_config.as_deref(), &project_config_path(&root));

    let backend = match opts.backend {
        Some(id) => id,
        None => match manifest.backend()?.or(config.backend()?) {
            Some(id) => id,
            None => bail!(
                "no backend selected: set [project] backend in {}, `build.backend` in the \
                 config, or pass --backend\n{}",
                MANIFEST_NAME,
                suggestions::UNKNOWN_BACKEND
            ),
        },
    };
    tracing::debug!(
        "loading {} for the {} backend",
        manifest_path.display(),
        backend
    );

    let mut project = manifest.to_project(backend)?;

    // Relative config paths are taken relative to the project root
    if manifest.project.outdir.is_none() {
        let outdir = config
            .build
            .outdir
            .clone()
            .unwrap_or_else(|| project.config().outdir.clone());
        project.set_outdir(root.join(outdir));
    }
    if manifest.project.template_dir.is_none() {
        if let Some(dir) = &config.build.template_dir {
            project.set_template_dir(root.join(dir));
        }
    }

    if let Some(part) = &opts.part {
        project
            .set_part(part)
            .with_context(|| format!("invalid --part for the {} backend", backend))?;
    }
    if let Some(outdir) = &opts.outdir {
        project.set_outdir(outdir.clone());
    }
    if let Some(dir) = &opts.template_dir {
        project.set_template_dir(dir.clone());
    }

    Ok(project)
}

/// Write the build scripts.
pub fn generate(
    project: &mut Project,
    strategy: Option<Strategy>,
    task: Option<Task>,
) -> Result<Invocation> {
    project
        .generate(strategy, task)
        .with_context(|| format!("failed to generate {} scripts", project.backend()))
}

/// Write the programming script.
///
/// A missing bitstream is only a warning: the build may not have run yet.
pub fn transfer(project: &Project, req: &TransferRequest) -> Result<Invocation> {
    let bitstream = req
        .bitstream
        .clone()
        .unwrap_or_else(|| project.bitstream_path());
    if !bitstream.exists() {
        tracing::warn!(
            "bitstream {} does not exist yet\n{}",
            bitstream.display(),
            suggestions::NO_BITSTREAM
        );
    }

    project
        .transfer(req)
        .with_context(|| format!("failed to prepare {} programming", project.backend()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::choice::DevType;
    use crate::core::errors::BuildError;
    use std::fs;
    use tempfile::TempDir;

    fn write_project(root: &Path, manifest: &str) {
        fs::create_dir_all(root.join("hdl")).unwrap();
        fs::write(root.join("hdl/top.v"), "module Top; endmodule").unwrap();
        fs::write(root.join(MANIFEST_NAME), manifest).unwrap();
    }

    #[test]
    fn test_manifest_found_from_subdir() {
        let tmp = TempDir::new().unwrap();
        write_project(
            tmp.path(),
            "[project]\nbackend = \"openflow\"\n[[files]]\npath = \"hdl/top.v\"\n",
        );

        let project = load_project(&tmp.path().join("hdl"), &LoadOptions::default()).unwrap();
        assert_eq!(project.backend(), BackendId::Openflow);
        assert_eq!(project.config().outdir, tmp.path().join("results"));
    }

    #[test]
    fn test_missing_manifest() {
        let tmp = TempDir::new().unwrap();
        let err = load_project(tmp.path(), &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("fpgaforge init"));
    }

    #[test]
    fn test_backend_precedence() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path(), "");

        let err = load_project(tmp.path(), &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no backend selected"));

        let global = tmp.path().join("global.toml");
        fs::write(&global, "[build]\nbackend = \"quartus\"\noutdir = \"out\"\n").unwrap();
        let opts = LoadOptions {
            global_config: Some(global.clone()),
            ..Default::default()
        };
        let project = load_project(tmp.path(), &opts).unwrap();
        assert_eq!(project.backend(), BackendId::Quartus);
        assert_eq!(project.config().outdir, tmp.path().join("out"));

        fs::create_dir_all(tmp.path().join(".fpgaforge")).unwrap();
        fs::write(
            tmp.path().join(".fpgaforge/config.toml"),
            "[build]\nbackend = \"diamond\"\n",
        )
        .unwrap();
        let project = load_project(tmp.path(), &opts).unwrap();
        assert_eq!(project.backend(), BackendId::Diamond);

        let opts = LoadOptions {
            global_config: Some(global),
            backend: Some(BackendId::Vivado),
            ..Default::default()
        };
        assert_eq!(load_project(tmp.path(), &opts).unwrap().backend(), BackendId::Vivado);
    }

    #[test]
    fn test_cli_part_override() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path(), "[project]\nbackend = \"ise\"\n");

        let opts = LoadOptions {
            part: Some("xc6slx9-csg324".to_string()),
            ..Default::default()
        };
        let err = load_project(tmp.path(), &opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedPart { .. })
        ));
    }

    #[test]
    fn test_generate_and_transfer() {
        let tmp = TempDir::new().unwrap();
        write_project(
            tmp.path(),
            "[project]\nbackend = \"openflow\"\nname = \"blink\"\n[[files]]\npath = \"hdl/top.v\"\n",
        );

        let mut project = load_project(tmp.path(), &LoadOptions::default()).unwrap();
        let invocation = generate(&mut project, None, Some(Task::Syn)).unwrap();
        assert!(tmp.path().join("results/openflow.sh").exists());
        assert_eq!(invocation.command, "bash openflow.sh");

        let invocation = transfer(&project, &TransferRequest::new(DevType::Fpga)).unwrap();
        assert_eq!(invocation.scripts, vec![tmp.path().join("results/openflow-prog.sh")]);
    }
}
