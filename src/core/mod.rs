//! Core data structures for fpgaforge.
//!
//! This module contains the tool-neutral build description:
//! - Closed choice sets (strategy, task, device kind)
//! - Part descriptor resolution
//! - Phase option and hook registries
//! - The project aggregate and its manifest

pub mod choice;
pub mod config;
pub mod errors;
pub mod manifest;
pub mod part;
pub mod phase;
pub mod project;

pub use choice::{DevType, Strategy, Task};
pub use config::{BuildConfig, ConstraintStage, FileEntry, FileKind};
pub use errors::BuildError;
pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use part::{PartDescriptor, PartResolver};
pub use phase::{HookStage, Phase, PhaseRegistry};
pub use project::{Invocation, Project, TransferRequest};
