//! fpgaforge - a backend-agnostic build description layer for FPGA toolchains
//!
//! A project declares its sources, constraints, defines, parameters, tool
//! options and hooks once. A backend shim renders that declaration into a
//! script for one tool (Vivado, ISE, Quartus, Libero, Diamond, or the
//! yosys/nextpnr flow) and returns the command that would run it. Vendor
//! tools are never executed here.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use builder::shim::{BackendId, BackendRegistry, BackendShim};
pub use core::{BuildError, Manifest, PartDescriptor, Project};
