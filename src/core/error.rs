//! Configuration error types.

use thiserror::Error;

use crate::core::configuration::Platform;

/// An invalid (compiler, platform) combination.
///
/// Raised before any command is synthesized, so a failing configuration never
/// produces a partial plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown compiler `{0}`; expected `gcc` or `msvc`")]
    UnknownCompiler(String),

    #[error("compiler `{compiler}` is not supported on platform `{platform}`")]
    UnsupportedToolchain { compiler: String, platform: Platform },

    #[error("unknown build target `{0}`; expected `release`, `debug` or `test`")]
    UnknownBuildTarget(String),
}
