//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Stage a distributable release from built player executables
#[derive(Parser)]
#[command(name = "alfa-release")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the built players (overrides config)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Directory in which release directories are created (overrides config)
    #[arg(long)]
    pub dest_root: Option<PathBuf>,

    /// Compile the LaTeX documentation before copying it
    #[arg(long)]
    pub docs: bool,

    /// Also produce the competition subset
    #[arg(long)]
    pub competition: bool,

    /// Configuration file (defaults to ./alfa-build.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the host platform identifier (e.g. `win32`, `darwin`)
    #[arg(long)]
    pub platform: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
