//! Build the whole configuration matrix for one toolchain.
//!
//! For a compiler and accelerator choice this synthesizes and runs, in
//! order: the release library and launcher, the debug library and launcher,
//! and the test launcher (which links against the debug library).

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::builder::context::BuildLayout;
use crate::builder::executor::{CommandExecutor, ExecutionReport};
use crate::builder::plan::{BuildPlan, LibBuilder};
use crate::core::{BuildConfiguration, BuildTarget, Compiler, Platform};
use crate::util::fs::ensure_dir;

/// Options for [`build_all`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub compiler: Compiler,
    pub platform: Platform,
    pub accelerator: bool,
    /// Print commands without running them
    pub dry_run: bool,
    /// Delete object files after each library is archived
    pub clear_objects: bool,
}

/// Plans for one build target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetPlan {
    pub target: BuildTarget,
    /// Compile and archive steps; `None` for the test target
    pub library: Option<BuildPlan>,
    /// Launcher link steps
    pub executable: BuildPlan,
}

/// Synthesize the plans for every build target without running anything.
///
/// Fails before producing any plan if the (compiler, platform) pair is
/// unsupported.
pub fn plan_all(
    compiler: Compiler,
    platform: &Platform,
    accelerator: bool,
    layout: &BuildLayout,
) -> Result<Vec<TargetPlan>> {
    let base = BuildConfiguration::new(BuildTarget::Release, compiler, platform.clone(), accelerator)?;

    let plans = BuildTarget::ALL
        .iter()
        .map(|&target| {
            let lb = LibBuilder::new(base.with_target(target), layout.clone());
            TargetPlan {
                target,
                library: (target != BuildTarget::Test).then(|| lb.build()),
                executable: lb.executable_plan(),
            }
        })
        .collect();
    Ok(plans)
}

/// Synthesize and execute the full matrix.
pub fn build_all(
    opts: &BuildOptions,
    layout: &BuildLayout,
    executor: &CommandExecutor,
) -> Result<ExecutionReport> {
    let plans = plan_all(opts.compiler, &opts.platform, opts.accelerator, layout)?;

    if !opts.dry_run {
        ensure_dir(&layout.output_dir)?;
        ensure_dir(&layout.objects_dir)?;
    }

    let mut report = ExecutionReport::default();
    for plan in &plans {
        tracing::info!("building {} ({}, {})", plan.target, opts.compiler, opts.platform);

        if let Some(library) = &plan.library {
            report.absorb(executor.run(&library.commands())?);
            if opts.clear_objects && !opts.dry_run {
                clear_objects(opts, layout, plan.target, library)?;
            }
        }
        report.absorb(executor.run(&plan.executable.commands())?);
    }

    let failures = report.failures().count();
    if failures > 0 {
        tracing::warn!("{} command(s) failed", failures);
    }
    Ok(report)
}

fn clear_objects(
    opts: &BuildOptions,
    layout: &BuildLayout,
    target: BuildTarget,
    plan: &BuildPlan,
) -> Result<()> {
    let config = BuildConfiguration::new(target, opts.compiler, opts.platform.clone(), opts.accelerator)?;
    LibBuilder::new(config, layout.clone()).clear_objects(plan)
}

/// Every path the matrix writes to, for reporting.
pub fn expected_artifacts(opts: &BuildOptions, layout: &BuildLayout) -> Result<Vec<PathBuf>> {
    let mut artifacts = Vec::new();
    for target in BuildTarget::ALL {
        let config = BuildConfiguration::new(target, opts.compiler, opts.platform.clone(), opts.accelerator)?;
        let lb = LibBuilder::new(config, layout.clone());
        if target != BuildTarget::Test {
            artifacts.push(lb.library_path());
        }
        artifacts.push(lb.executable_path());
    }
    Ok(artifacts)
}
