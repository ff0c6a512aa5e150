//! C++ build planning.
//!
//! This module synthesizes compile, archive and link commands for the alfa
//! library and launchers, and runs them on the host shell.

pub mod context;
pub mod discovery;
pub mod executor;
pub mod flags;
pub mod naming;
pub mod plan;
pub mod toolchain;

pub use context::BuildLayout;
pub use discovery::{discover_sources, Discovery, SourceUnit};
pub use executor::{CommandExecutor, ExecutionReport};
pub use plan::{BuildPlan, BuildStep, LibBuilder, StepKind};
pub use toolchain::{toolchain_for, CommandSpec, ShellSyntax, Toolchain};
