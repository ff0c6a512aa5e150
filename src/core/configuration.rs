//! Build configuration tuple and platform/toolchain resolution.
//!
//! A [`BuildConfiguration`] is the explicit value every flag and naming
//! function takes. Nothing in the core reads process-wide state; the host
//! platform is resolved once at the binary boundary with [`Platform::host`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigurationError;

/// Build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTarget {
    Release,
    Debug,
    Test,
}

impl BuildTarget {
    /// All build targets, in the order the build driver runs them.
    pub const ALL: [BuildTarget; 3] = [BuildTarget::Release, BuildTarget::Debug, BuildTarget::Test];

    /// Get the target name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTarget::Release => "release",
            BuildTarget::Debug => "debug",
            BuildTarget::Test => "test",
        }
    }

    /// Whether this target is built with optimizations.
    pub fn is_release(&self) -> bool {
        *self == BuildTarget::Release
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildTarget {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(BuildTarget::Release),
            "debug" => Ok(BuildTarget::Debug),
            "test" => Ok(BuildTarget::Test),
            _ => Err(ConfigurationError::UnknownBuildTarget(s.to_string())),
        }
    }
}

/// Compiler family driving every invocation of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    /// GNU toolchain (g++, ar)
    Gcc,
    /// Microsoft Visual C++ (cl.exe, lib.exe)
    Msvc,
}

impl Compiler {
    /// Get the compiler name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Compiler::Gcc => "gcc",
            Compiler::Msvc => "msvc",
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compiler {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gcc" => Ok(Compiler::Gcc),
            "msvc" => Ok(Compiler::Msvc),
            _ => Err(ConfigurationError::UnknownCompiler(s.to_string())),
        }
    }
}

/// Normalized host platform.
///
/// Unrecognized identifiers are kept verbatim in [`Platform::Other`] so that
/// new hosts still get a (non-windows) plan instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Windows,
    Osx,
    Other(String),
}

impl Platform {
    /// Resolve the platform this process runs on.
    pub fn host() -> Self {
        resolve_platform(std::env::consts::OS)
    }

    /// Get the platform name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::Osx => "os x",
            Platform::Other(raw) => raw,
        }
    }

    pub fn is_windows(&self) -> bool {
        *self == Platform::Windows
    }

    /// Extension of linked executables on this platform.
    pub fn exe_extension(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw platform identifier to a [`Platform`].
///
/// Accepts both Python-style `sys.platform` values (`linux2`, `darwin`,
/// `win32`) and Rust `std::env::consts::OS` values (`macos`, `windows`).
pub fn resolve_platform(raw: &str) -> Platform {
    match raw {
        "linux" | "linux1" | "linux2" => Platform::Linux,
        "darwin" | "macos" => Platform::Osx,
        "win32" | "windows" => Platform::Windows,
        other => Platform::Other(other.to_string()),
    }
}

/// Validate a (compiler, platform) pair.
///
/// Fails if the compiler is not `gcc`/`msvc`, or if a non-gcc compiler is
/// requested on linux.
pub fn validate_configuration(
    compiler: &str,
    platform: &Platform,
) -> Result<Compiler, ConfigurationError> {
    let parsed = compiler.parse::<Compiler>()?;
    check_pair(parsed, platform)?;
    Ok(parsed)
}

fn check_pair(compiler: Compiler, platform: &Platform) -> Result<(), ConfigurationError> {
    if *platform == Platform::Linux && compiler != Compiler::Gcc {
        return Err(ConfigurationError::UnsupportedToolchain {
            compiler: compiler.to_string(),
            platform: platform.clone(),
        });
    }
    Ok(())
}

/// One point of the configuration matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildConfiguration {
    build_target: BuildTarget,
    compiler: Compiler,
    platform: Platform,
    accelerator: bool,
}

impl BuildConfiguration {
    /// Create a configuration, rejecting unsupported toolchain pairs.
    pub fn new(
        build_target: BuildTarget,
        compiler: Compiler,
        platform: Platform,
        accelerator: bool,
    ) -> Result<Self, ConfigurationError> {
        check_pair(compiler, &platform)?;
        Ok(BuildConfiguration {
            build_target,
            compiler,
            platform,
            accelerator,
        })
    }

    pub fn build_target(&self) -> BuildTarget {
        self.build_target
    }

    pub fn compiler(&self) -> Compiler {
        self.compiler
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn accelerator(&self) -> bool {
        self.accelerator
    }

    pub fn is_gcc(&self) -> bool {
        self.compiler == Compiler::Gcc
    }

    pub fn is_windows(&self) -> bool {
        self.platform.is_windows()
    }

    /// Same configuration with a different build target.
    pub fn with_target(&self, build_target: BuildTarget) -> Self {
        BuildConfiguration {
            build_target,
            ..self.clone()
        }
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}{})",
            self.build_target,
            self.compiler,
            self.platform,
            if self.accelerator { ", cuda" } else { "" }
        )
    }
}
