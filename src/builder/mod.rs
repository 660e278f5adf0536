//! Script generation.
//!
//! Templates with `#NAME#` placeholders and the per-tool shims that fill
//! them in.

pub mod shim;
pub mod template;

pub use shim::{BackendId, BackendRegistry, BackendShim, ScriptPlan};
pub use template::{RenderContext, TemplateSource};
