//! Build layout - where sources live and where outputs go.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Project-relative paths used when synthesizing a build plan.
///
/// Defaults describe the project as seen from its `scripts/` directory.
/// Every field can be overridden from the `[layout]` section of the
/// configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildLayout {
    /// Root of the production library sources
    pub source_root: PathBuf,

    /// Root of the unit-test sources
    pub test_root: PathBuf,

    /// Subtrees of `source_root` that are never compiled here
    pub excluded_dirs: Vec<PathBuf>,

    /// Translation unit extension
    pub source_extension: String,

    /// Header extension
    pub header_extension: String,

    /// Include directories passed to every compile and link
    pub include_dirs: Vec<PathBuf>,

    /// Third-party directory holding prebuilt dependency archives
    pub contrib_dir: PathBuf,

    /// Directory for archives and executables
    pub output_dir: PathBuf,

    /// Directory for object files
    pub objects_dir: PathBuf,

    /// Entry point linked into release/debug launchers
    pub launcher_source: PathBuf,

    /// Single-file test framework linked into the test launcher
    pub test_framework_source: PathBuf,

    /// CUDA toolkit install prefix (windows only)
    pub cuda_path: PathBuf,

    /// zlib install prefix (windows + gcc only)
    pub zlib_path: PathBuf,

    /// Script that sets up the MSVC command-line environment
    pub msvc_env_script: PathBuf,
}

impl Default for BuildLayout {
    fn default() -> Self {
        BuildLayout {
            source_root: PathBuf::from("../src/"),
            test_root: PathBuf::from("../test/"),
            excluded_dirs: vec![
                PathBuf::from("../src/math/cpu/"),
                PathBuf::from("../src/math/cuda/"),
            ],
            source_extension: ".cpp".to_string(),
            header_extension: ".hpp".to_string(),
            include_dirs: vec![PathBuf::from("../include/"), PathBuf::from("../contrib/")],
            contrib_dir: PathBuf::from("../contrib/"),
            output_dir: PathBuf::from("../bin/"),
            objects_dir: PathBuf::from("../bin/objects/"),
            launcher_source: PathBuf::from("../training_launcher/launcher.cpp"),
            test_framework_source: PathBuf::from("../contrib/gtest/gtest-all.cc"),
            cuda_path: PathBuf::from(
                "C:\\Program Files\\NVIDIA GPU Computing Toolkit\\CUDA\\v9.0\\",
            ),
            zlib_path: PathBuf::from("C:\\Program Files (x86)\\GnuWin32\\"),
            msvc_env_script: PathBuf::from(
                "C:\\Program Files (x86)\\Microsoft Visual Studio\\2017\\Community\\VC\\Auxiliary\\Build\\vcvars64.bat",
            ),
        }
    }
}

impl BuildLayout {
    /// Layout with every relative path re-rooted under `root`.
    ///
    /// `root` stands for the project directory, so `../src/` becomes
    /// `<root>/src/`. Absolute paths (toolkit prefixes) are kept.
    pub fn rooted_at(root: &Path) -> Self {
        let defaults = BuildLayout::default();
        let rebase = |p: &Path| -> PathBuf {
            match p.strip_prefix("..") {
                Ok(rest) => root.join(rest),
                Err(_) => p.to_path_buf(),
            }
        };

        BuildLayout {
            source_root: rebase(&defaults.source_root),
            test_root: rebase(&defaults.test_root),
            excluded_dirs: defaults.excluded_dirs.iter().map(|p| rebase(p)).collect(),
            include_dirs: defaults.include_dirs.iter().map(|p| rebase(p)).collect(),
            contrib_dir: rebase(&defaults.contrib_dir),
            output_dir: rebase(&defaults.output_dir),
            objects_dir: rebase(&defaults.objects_dir),
            launcher_source: rebase(&defaults.launcher_source),
            test_framework_source: rebase(&defaults.test_framework_source),
            ..defaults
        }
    }

    /// Path of a file under the contrib directory.
    pub fn contrib(&self, relative: &str) -> PathBuf {
        self.contrib_dir.join(relative)
    }

    /// Path of a file under the output directory.
    pub fn output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}
