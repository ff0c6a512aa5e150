//! Artifact naming.

use crate::builder::toolchain::toolchain_for;
use crate::core::{BuildTarget, Compiler, Platform};

/// Name of the static library produced by a build.
///
/// `cpu_` prefix without the accelerator, `alfa` for release and `alfa_d`
/// for every other target, then the toolchain's static library extension
/// (`.a` for gcc, `.lib` for msvc).
pub fn library_name(target: BuildTarget, compiler: Compiler, accelerator: bool) -> String {
    let mut name = String::new();
    if !accelerator {
        name.push_str("cpu_");
    }
    name.push_str(if target.is_release() { "alfa" } else { "alfa_d" });
    name.push_str(toolchain_for(compiler).static_lib_extension());
    name
}

/// Name of the launcher executable linked for a build target.
pub fn executable_name(target: BuildTarget, accelerator: bool, platform: &Platform) -> String {
    format!(
        "{}{}_launcher{}",
        if accelerator { "" } else { "cpu_" },
        target,
        if platform.is_windows() { ".exe" } else { ".out" }
    )
}
