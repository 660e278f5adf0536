//! High-level operations.
//!
//! This module contains the implementation of fpgaforge commands.

pub mod fpga_build;
pub mod fpga_init;

pub use fpga_build::{generate, load_project, transfer, LoadOptions};
pub use fpga_init::{init_project, InitOptions};
