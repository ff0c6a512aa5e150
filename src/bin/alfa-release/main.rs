//! alfa-release CLI - assembles release directories

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use alfa_build::core::{resolve_platform, Platform};
use alfa_build::ops::release::{stage_release, ReleaseOptions};
use alfa_build::util::config::load_config;

mod cli;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("alfa_build=debug,alfa_release=debug")
    } else {
        EnvFilter::new("alfa_build=info,alfa_release=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?.release;
    if let Some(build_dir) = cli.build_dir {
        config.build_dir = build_dir;
    }
    if let Some(dest_root) = cli.dest_root {
        config.dest_root = dest_root;
    }

    let platform = cli
        .platform
        .as_deref()
        .map(resolve_platform)
        .unwrap_or_else(Platform::host);

    let opts = ReleaseOptions {
        platform,
        compile_docs: cli.docs,
        competition: cli.competition,
    };

    let staged = stage_release(&config, &opts)?;

    eprintln!("     Created {}", staged.release_dir.display());
    if let Some(dir) = staged.competition_dir {
        eprintln!("     Created {}", dir.display());
    }
    Ok(())
}
