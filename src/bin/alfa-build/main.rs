//! alfa-build CLI - synthesizes and runs the library build matrix

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use alfa_build::builder::CommandExecutor;
use alfa_build::core::{resolve_platform, validate_configuration, Platform};
use alfa_build::ops::build_lib::{build_all, plan_all, BuildOptions};
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
        EnvFilter::new("alfa_build=debug")
    } else {
        EnvFilter::new("alfa_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    let platform = cli
        .platform
        .as_deref()
        .map(resolve_platform)
        .unwrap_or_else(Platform::host);
    let compiler = validate_configuration(&cli.compiler, &platform)?;
    let accelerator = cli.accelerator_enabled();

    if cli.plan {
        let plans = plan_all(compiler, &platform, accelerator, &config.layout)?;
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    let opts = BuildOptions {
        compiler,
        platform: platform.clone(),
        accelerator,
        dry_run: cli.dry_run,
        clear_objects: config.build.clear_objects,
    };

    let executor = CommandExecutor::for_platform(&platform, Path::new("."))
        .strict(cli.strict || config.build.strict)
        .dry_run(cli.dry_run);

    let report = build_all(&opts, &config.layout, &executor)?;
    if !cli.dry_run {
        eprintln!(
            "    Finished {} command(s), {} failed",
            report.outcomes.len(),
            report.failures().count()
        );
    }

    Ok(())
}
