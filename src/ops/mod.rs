//! High-level operations.
//!
//! This module contains the implementation of the `alfa-build` and
//! `alfa-release` commands.

pub mod build_lib;
pub mod config_patch;
pub mod release;

pub use build_lib::{build_all, expected_artifacts, plan_all, BuildOptions, TargetPlan};
pub use config_patch::{patch_config, patch_config_file};
pub use release::{stage_competition, stage_release, ReleaseConfig, ReleaseOptions, StagedRelease};
