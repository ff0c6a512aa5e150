//! alfa-build - build-plan synthesizer for the alfa engine
//!
//! This crate turns a (build target, compiler, platform, accelerator) tuple
//! into the exact compile, archive and link commands that produce the alfa
//! static library and its launchers, runs them on the host shell, and stages
//! release directories from the built players.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for alfa-build unit tests.
///
/// Provides on-disk project fixtures and a recording shell runner.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildLayout, BuildPlan, CommandExecutor, CommandSpec, LibBuilder};
pub use core::{BuildConfiguration, BuildTarget, Compiler, ConfigurationError, Platform};
