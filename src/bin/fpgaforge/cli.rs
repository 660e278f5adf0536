//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// fpgaforge - one build description, scripts for every FPGA toolchain
#[derive(Parser)]
#[command(name = "fpgaforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create Fpga.toml and a starter design
    Init(InitArgs),

    /// Write the build script and print the command that runs it
    Generate(GenerateArgs),

    /// Write the programming script and print the command that runs it
    Transfer(TransferArgs),

    /// Show the placeholder values a build would render with
    Context(ContextArgs),

    /// Show how a backend resolves a part
    Part(PartArgs),

    /// List and inspect backends
    Backend(BackendArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that loads the project.
#[derive(Args, Clone, Default)]
pub struct ProjectArgs {
    /// Path to Fpga.toml (searched upward from the current directory by default)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Backend to render for (overrides the manifest and config)
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Target part (overrides the manifest)
    #[arg(long)]
    pub part: Option<String>,

    /// Output directory for scripts
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Directory with template overrides
    #[arg(long)]
    pub template_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Backend written into the manifest
    #[arg(short, long, default_value = "vivado")]
    pub backend: String,

    /// Project name (defaults to directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Target part (defaults to the backend's default part)
    #[arg(long)]
    pub part: Option<String>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Optimization goal: none, area, speed or power
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// How far to go: prj, syn, imp or bit
    #[arg(short, long)]
    pub task: Option<String>,
}

#[derive(Args)]
pub struct TransferArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Device kind: fpga, spi, bpi or xcf
    #[arg(short, long, default_value = "fpga")]
    pub devtype: String,

    /// Position of the device in the JTAG chain (1-based)
    #[arg(long)]
    pub position: Option<u32>,

    /// Configuration memory part (spi and bpi)
    #[arg(long)]
    pub mempart: Option<String>,

    /// Configuration memory width
    #[arg(long)]
    pub width: Option<u32>,

    /// Bitstream to program
    #[arg(long)]
    pub bitstream: Option<PathBuf>,
}

#[derive(Args)]
pub struct ContextArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PartArgs {
    /// Part to resolve
    pub part: String,

    /// Backend whose naming rules apply
    #[arg(short, long, default_value = "openflow")]
    pub backend: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BackendArgs {
    #[command(subcommand)]
    pub command: BackendCommands,
}

#[derive(Subcommand)]
pub enum BackendCommands {
    /// List all backends and whether their tools are installed
    List,

    /// Show the capabilities of one backend
    Show(BackendNameArgs),

    /// Check that a backend's tool is on PATH
    Check(BackendNameArgs),
}

#[derive(Args)]
pub struct BackendNameArgs {
    /// Backend name
    pub backend: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
