//! Backend shim abstraction system.
//!
//! Each vendor tool is a [`BackendShim`]: it declares its capabilities
//! (script names, commands, programmable device kinds), resolves part
//! strings with its own family tables, and turns a [`BuildConfig`] into the
//! placeholder values its templates expect.
//!
//! ```text
//!          ┌──────────────┐
//!          │   Project    │  (part, files, options, hooks)
//!          └──────┬───────┘
//!                 │ context()
//!                 ▼
//!          ┌──────────────┐     ┌────────────────┐
//!          │ BackendShim  │────▶│ TemplateSource │
//!          └──────┬───────┘     └────────────────┘
//!                 ▼
//!          ┌──────────────┐
//!          │  ScriptPlan  │  (scripts + command)
//!          └──────────────┘
//! ```
//!
//! [`BuildConfig`]: crate::core::config::BuildConfig

pub mod capabilities;
pub mod diamond_shim;
pub mod ise_shim;
pub mod libero_shim;
pub mod openflow_shim;
pub mod quartus_shim;
pub mod registry;
pub mod tcl;
pub mod trait_def;
pub mod vivado_shim;

pub use capabilities::{BackendCapabilities, BackendId, BackendKind, TransferCapabilities};

pub use trait_def::{
    BackendAvailability, BackendShim, RenderedScript, ScriptPlan, TransferSettings,
};

pub use registry::{
    check_all, create_shim, get_backend_summaries, BackendRegistry, BackendSummary,
};

pub use diamond_shim::DiamondShim;
pub use ise_shim::IseShim;
pub use libero_shim::LiberoShim;
pub use openflow_shim::OpenflowShim;
pub use quartus_shim::QuartusShim;
pub use vivado_shim::VivadoShim;
