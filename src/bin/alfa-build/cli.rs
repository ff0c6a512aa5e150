//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Argument that turns the CUDA backend off.
pub const NO_ACCELERATOR: &str = "no_cuda";

/// Build the alfa library and launchers for every build mode
#[derive(Parser)]
#[command(name = "alfa-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Compiler family (`gcc` or `msvc`)
    pub compiler: String,

    /// Pass `no_cuda` to build without the CUDA backend
    pub accelerator: Option<String>,

    /// Configuration file (defaults to ./alfa-build.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the host platform identifier (e.g. `win32`, `darwin`)
    #[arg(long)]
    pub platform: Option<String>,

    /// Stop at the first failing command
    #[arg(long)]
    pub strict: bool,

    /// Print commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the build plans as JSON (no build)
    #[arg(long)]
    pub plan: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether the CUDA backend is enabled; on unless `no_cuda` was given.
    pub fn accelerator_enabled(&self) -> bool {
        self.accelerator.as_deref() != Some(NO_ACCELERATOR)
    }
}
