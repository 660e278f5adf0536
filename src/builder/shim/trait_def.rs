//! BackendShim trait definition and result types.
//!
//! A shim turns a [`BuildConfig`] into rendered scripts for one tool. Shims
//! are pure: they never touch the filesystem except to read template
//! overrides, and they never run the vendor tool.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::shim::capabilities::{BackendCapabilities, BackendId};
use crate::builder::template::{RenderContext, TemplateSource};
use crate::core::choice::DevType;
use crate::core::config::{BuildConfig, FileEntry};
use crate::core::errors::BuildError;
use crate::core::part::{PartDescriptor, PartResolver};
use crate::core::project::TransferRequest;

/// Backend availability status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendAvailability {
    /// Tool found on PATH
    Available {
        /// Resolved executable
        path: PathBuf,
    },

    /// Tool is not installed or not on PATH
    NotInstalled {
        /// Name of the missing tool (e.g., "vivado")
        tool: String,
        /// Hint for how to install it
        install_hint: String,
    },
}

impl BackendAvailability {
    /// Check if the backend is available.
    pub fn is_available(&self) -> bool {
        matches!(self, BackendAvailability::Available { .. })
    }

    /// Get error message if not available.
    pub fn error_message(&self) -> Option<String> {
        match self {
            BackendAvailability::Available { .. } => None,
            BackendAvailability::NotInstalled { tool, install_hint } => {
                Some(format!("{} not found. {}", tool, install_hint))
            }
        }
    }
}

/// One script produced by a shim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedScript {
    /// File name inside the output directory
    pub file_name: String,
    pub text: String,
}

/// Scripts to write and the command that runs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptPlan {
    pub scripts: Vec<RenderedScript>,
    pub command: String,
}

impl ScriptPlan {
    /// A plan with a single script.
    pub fn single(file_name: &str, text: String, command: &str) -> Self {
        ScriptPlan {
            scripts: vec![RenderedScript {
                file_name: file_name.to_string(),
                text,
            }],
            command: command.to_string(),
        }
    }
}

/// Programming settings after validation and defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    pub devtype: DevType,
    /// 1-based position in the JTAG chain
    pub position: u32,
    /// Configuration memory part, for `spi` and `bpi`
    pub mempart: Option<String>,
    /// Memory data width, for `spi` and `bpi`
    pub width: Option<u32>,
}

/// Valid SPI data widths, default first.
pub const SPI_WIDTHS: &[u32] = &[1, 2, 4];

/// Valid BPI data widths, default first.
pub const BPI_WIDTHS: &[u32] = &[16, 8, 32];

impl TransferSettings {
    /// Validate a request against what the backend can program.
    pub fn validate(
        caps: &BackendCapabilities,
        req: &TransferRequest,
    ) -> Result<TransferSettings, BuildError> {
        let devtypes = caps.devtypes();
        if !devtypes.contains(&req.devtype) {
            return Err(BuildError::invalid_choice(
                "device type",
                req.devtype.as_str(),
                devtypes,
            ));
        }

        let position = req.position.unwrap_or(1);
        if position == 0 {
            return Err(BuildError::invalid_choice(
                "chain position",
                "0",
                &["1 or greater"],
            ));
        }

        let widths = match req.devtype {
            DevType::Spi => SPI_WIDTHS,
            DevType::Bpi => BPI_WIDTHS,
            DevType::Fpga | DevType::Xcf => &[],
        };

        let (mempart, width) = if req.devtype.is_memory() {
            let mempart = req.part.clone().ok_or_else(|| BuildError::MissingValue {
                what: "memory part",
                expected: format!("the {} flash part name", req.devtype),
            })?;
            let width = match req.width {
                Some(w) if widths.contains(&w) => w,
                Some(w) => {
                    let mut valid = widths.to_vec();
                    valid.sort_unstable();
                    return Err(BuildError::invalid_choice(
                        "memory width",
                        w.to_string(),
                        valid.as_slice(),
                    ));
                }
                None => widths[0],
            };
            (Some(mempart), Some(width))
        } else {
            (None, None)
        };

        Ok(TransferSettings {
            devtype: req.devtype,
            position,
            mempart,
            width,
        })
    }

    /// Add the programming placeholders to a context.
    pub fn apply(&self, ctx: &mut RenderContext) {
        ctx.insert("DEVTYPE", self.devtype.as_str());
        ctx.insert("POSITION", self.position.to_string());
        if let Some(mempart) = &self.mempart {
            ctx.insert("MEMPART", mempart.as_str());
        }
        if let Some(width) = self.width {
            ctx.insert("WIDTH", width.to_string());
        }
    }
}

/// BackendShim trait - interface for backends.
pub trait BackendShim: Send + Sync {
    /// Get backend capabilities.
    fn capabilities(&self) -> &BackendCapabilities;

    /// Prefix tables and rewrite rules for this backend's part naming.
    fn resolver(&self) -> &PartResolver;

    /// Get the backend identifier.
    fn id(&self) -> BackendId {
        self.capabilities().id
    }

    /// Derive the part descriptor the templates see.
    fn describe_part(&self, part: &str) -> Result<PartDescriptor, BuildError> {
        self.resolver().resolve(part)
    }

    /// Validate a part string and return the form to store.
    fn normalize_part(&self, part: &str) -> Result<String, BuildError> {
        self.describe_part(part)?;
        Ok(part.to_string())
    }

    /// Reject source files the backend cannot consume.
    fn check_file(&self, _file: &FileEntry) -> Result<(), BuildError> {
        Ok(())
    }

    /// Add backend-derived values (FILES, CONSTRAINTS, flags) to the context.
    fn build_context(
        &self,
        config: &BuildConfig,
        part: &PartDescriptor,
        ctx: &mut RenderContext,
    ) -> Result<(), BuildError>;

    /// Render the build script.
    fn generate(
        &self,
        ctx: &RenderContext,
        templates: &TemplateSource,
    ) -> Result<ScriptPlan, BuildError> {
        let caps = self.capabilities();
        let text = templates.render(caps.script, ctx)?;
        Ok(ScriptPlan::single(caps.script, text, caps.command))
    }

    /// Render the programming script.
    ///
    /// `ctx` already holds `BITSTREAM`. Backends that cannot program
    /// devices keep the default, which fails.
    fn transfer(
        &self,
        _config: &BuildConfig,
        ctx: &RenderContext,
        req: &TransferRequest,
        templates: &TemplateSource,
    ) -> Result<ScriptPlan, BuildError> {
        let caps = self.capabilities();
        let transfer = caps
            .transfer
            .ok_or_else(|| BuildError::unsupported(caps.id, "transfer"))?;

        let settings = TransferSettings::validate(caps, req)?;
        let mut ctx = ctx.clone();
        settings.apply(&mut ctx);

        let text = templates.render(transfer.script, &ctx)?;
        Ok(ScriptPlan::single(transfer.script, text, transfer.command))
    }

    /// Check if the vendor tool is on PATH.
    fn availability(&self) -> BackendAvailability {
        let caps = self.capabilities();
        match which::which(caps.tool) {
            Ok(path) => BackendAvailability::Available { path },
            Err(_) => BackendAvailability::NotInstalled {
                tool: caps.tool.to_string(),
                install_hint: caps.install_hint.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::shim::capabilities::{BackendKind, TransferCapabilities};

    const CAPS: BackendCapabilities = BackendCapabilities {
        id: BackendId::Vivado,
        kind: BackendKind::ProjectFile,
        description: "test",
        tool: "definitely-not-a-real-fpga-tool",
        install_hint: "install it",
        default_part: "a-b",
        script: "vivado.tcl",
        command: "run",
        bitstream_ext: "bit",
        transfer: Some(TransferCapabilities {
            script: "vivado-prog.tcl",
            command: "prog",
            devtypes: &[DevType::Fpga, DevType::Spi, DevType::Bpi],
        }),
    };

    fn request(devtype: DevType) -> TransferRequest {
        TransferRequest::new(devtype)
    }

    #[test]
    fn test_fpga_defaults() {
        let settings = TransferSettings::validate(&CAPS, &request(DevType::Fpga)).unwrap();
        assert_eq!(settings.position, 1);
        assert_eq!(settings.mempart, None);
        assert_eq!(settings.width, None);
    }

    #[test]
    fn test_unsupported_devtype() {
        let err = TransferSettings::validate(&CAPS, &request(DevType::Xcf)).unwrap_err();
        match err {
            BuildError::InvalidChoice { what, expected, .. } => {
                assert_eq!(what, "device type");
                assert_eq!(expected, vec!["fpga", "spi", "bpi"]);
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn test_memory_needs_part() {
        let err = TransferSettings::validate(&CAPS, &request(DevType::Spi)).unwrap_err();
        assert!(matches!(err, BuildError::MissingValue { what: "memory part", .. }));
    }

    #[test]
    fn test_bpi_width() {
        let mut req = request(DevType::Bpi);
        req.part = Some("28f00ap30t-bpi-x16".to_string());

        let settings = TransferSettings::validate(&CAPS, &req).unwrap();
        assert_eq!(settings.width, Some(16));

        req.width = Some(32);
        assert_eq!(
            TransferSettings::validate(&CAPS, &req).unwrap().width,
            Some(32)
        );

        req.width = Some(12);
        let err = TransferSettings::validate(&CAPS, &req).unwrap_err();
        assert!(err.to_string().contains("8, 16, 32"));
    }

    #[test]
    fn test_position_zero() {
        let mut req = request(DevType::Fpga);
        req.position = Some(0);
        assert!(TransferSettings::validate(&CAPS, &req).is_err());
    }

    #[test]
    fn test_apply() {
        let mut req = request(DevType::Spi);
        req.part = Some("s25fl128sxxxxxx0-spi-x1_x2_x4".to_string());
        req.position = Some(2);

        let mut ctx = RenderContext::new();
        TransferSettings::validate(&CAPS, &req)
            .unwrap()
            .apply(&mut ctx);
        assert_eq!(ctx.get("DEVTYPE"), Some("spi"));
        assert_eq!(ctx.get("POSITION"), Some("2"));
        assert_eq!(ctx.get("WIDTH"), Some("1"));
        assert_eq!(ctx.get("MEMPART"), Some("s25fl128sxxxxxx0-spi-x1_x2_x4"));
    }

    #[test]
    fn test_availability_missing_tool() {
        struct Missing(PartResolver);
        impl BackendShim for Missing {
            fn capabilities(&self) -> &BackendCapabilities {
                &CAPS
            }
            fn resolver(&self) -> &PartResolver {
                &self.0
            }
            fn build_context(
                &self,
                _config: &BuildConfig,
                _part: &PartDescriptor,
                _ctx: &mut RenderContext,
            ) -> Result<(), BuildError> {
                Ok(())
            }
        }

        let availability = Missing(PartResolver::new()).availability();
        assert!(!availability.is_available());
        assert_eq!(
            availability.error_message().unwrap(),
            "definitely-not-a-real-fpga-tool not found. install it"
        );
    }
}
