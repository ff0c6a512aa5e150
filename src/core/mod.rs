//! Core data structures.
//!
//! This module contains the configuration tuple that selects one point of
//! the build matrix and the errors raised when a tuple is invalid.

pub mod configuration;
pub mod error;

pub use configuration::{
    resolve_platform, validate_configuration, BuildConfiguration, BuildTarget, Compiler, Platform,
};
pub use error::ConfigurationError;
