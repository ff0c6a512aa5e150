//! Compiler and linker flag composition.
//!
//! Every function here is a pure function of a [`BuildConfiguration`] (plus
//! the [`BuildLayout`] for paths). None of them fail.

use std::path::PathBuf;

use crate::builder::context::BuildLayout;
use crate::builder::naming::library_name;
use crate::builder::toolchain::toolchain_for;
use crate::core::{BuildConfiguration, Compiler, Platform};

pub const OPENBLAS_MACRO: &str = "-DUSE_OPENBLAS";
pub const BLIS_MACRO: &str = "-DUSE_BLIS";
pub const CUDA_MACRO: &str = "-DUSE_CUDA";

/// Optimization flags for the build target.
///
/// Anything other than `release` (including `test`) gets debug flags.
pub fn optimizations(cfg: &BuildConfiguration) -> Vec<String> {
    let flags: &[&str] = match (cfg.compiler(), cfg.build_target().is_release()) {
        (Compiler::Gcc, true) => &["-O3", "-DNDEBUG"],
        (Compiler::Gcc, false) => &["-O0", "-g3"],
        (Compiler::Msvc, true) => &["/MD", "/O2", "-DNDEBUG"],
        (Compiler::Msvc, false) => &["/MDd", "/Zi"],
    };
    to_strings(flags)
}

/// Include-path fragment.
///
/// The CUDA include directory is only added on windows with the
/// accelerator enabled; elsewhere the toolkit is on the default path.
pub fn includes(cfg: &BuildConfiguration, layout: &BuildLayout) -> Vec<String> {
    let toolchain = toolchain_for(cfg.compiler());
    let mut flags: Vec<String> = layout
        .include_dirs
        .iter()
        .map(|dir| toolchain.include_flag(dir))
        .collect();

    if cfg.is_windows() && cfg.accelerator() {
        flags.push(toolchain.include_flag(&layout.cuda_path.join("include/")));
    }
    flags
}

/// Miscellaneous compile options.
pub fn misc_options(cfg: &BuildConfiguration) -> Vec<String> {
    if cfg.is_windows() && cfg.is_gcc() {
        vec!["-mxsave".to_string()]
    } else {
        Vec::new()
    }
}

/// Math backend macros: OpenBLAS on windows, BLIS elsewhere, followed by
/// the CUDA macro when the accelerator is enabled.
pub fn math_macros(cfg: &BuildConfiguration) -> Vec<String> {
    let mut flags = vec![if cfg.is_windows() {
        OPENBLAS_MACRO.to_string()
    } else {
        BLIS_MACRO.to_string()
    }];
    if cfg.accelerator() {
        flags.push(CUDA_MACRO.to_string());
    }
    flags
}

/// All flags of a compile step after the driver prefix.
pub fn compile_flags(cfg: &BuildConfiguration, layout: &BuildLayout) -> Vec<String> {
    let mut flags = optimizations(cfg);
    flags.extend(includes(cfg, layout));
    flags.extend(misc_options(cfg));
    flags.extend(math_macros(cfg));
    flags
}

/// Library search paths; only non-empty on windows with the accelerator.
pub fn library_paths(cfg: &BuildConfiguration, layout: &BuildLayout) -> Vec<String> {
    if !(cfg.is_windows() && cfg.accelerator()) {
        return Vec::new();
    }

    let mut dirs = vec![layout.cuda_path.join("bin/"), layout.contrib_dir.clone()];
    if cfg.compiler() == Compiler::Msvc {
        dirs.push(layout.output_dir.clone());
    }
    toolchain_for(cfg.compiler()).lib_dir_flags(&dirs)
}

/// Ordered library list for an executable link.
///
/// Static linkers resolve symbols left to right, so the order is: this
/// build's archive, the `libml` companion archive, then the BLAS backend
/// and its dependencies.
pub fn libraries(cfg: &BuildConfiguration, layout: &BuildLayout) -> Vec<String> {
    let mut libs = vec![path_arg(layout.output(&library_name(
        cfg.build_target(),
        cfg.compiler(),
        cfg.accelerator(),
    )))];

    libs.push(path_arg(if cfg.accelerator() {
        layout.contrib("libml/bin/libml.a")
    } else {
        layout.contrib("libml/bin/cpu_libml.a")
    }));

    match (cfg.platform(), cfg.compiler()) {
        (Platform::Windows, Compiler::Gcc) => {
            libs.push(path_arg(layout.contrib("openblas/libopenblas.a")));
            libs.push(path_arg(layout.zlib_path.join("lib/libz.a")));
        }
        (Platform::Windows, Compiler::Msvc) => {
            libs.push(path_arg(layout.contrib("openblas/libopenblas.dll.a")));
        }
        _ => {
            libs.push(path_arg(layout.contrib("blis/libblis.a")));
            libs.push("-lz".to_string());
        }
    }
    libs
}

/// CUDA runtime libraries, appended after [`libraries`].
///
/// Empty without the accelerator and on platforms without a CUDA build.
pub fn accelerator_libraries(cfg: &BuildConfiguration, layout: &BuildLayout) -> Vec<String> {
    if !cfg.accelerator() {
        return Vec::new();
    }

    let suffix = if cfg.build_target().is_release() { "" } else { "_d" };
    match (cfg.platform(), cfg.compiler()) {
        (Platform::Linux, _) => vec![
            path_arg(layout.contrib(&format!("libml/bin/cuda_math{}.a", suffix))),
            "-lcudart".to_string(),
            "-lcublas".to_string(),
        ],
        (Platform::Windows, Compiler::Gcc) => vec![
            format!("-L{}", layout.output_dir.display()),
            format!("-lcuda_math{}", suffix),
            "-lcudart64_90".to_string(),
            "-lcublas64_90".to_string(),
        ],
        (Platform::Windows, Compiler::Msvc) => vec![
            format!("cuda_math{}.lib", suffix),
            "cudart_static.lib".to_string(),
            "cublas.lib".to_string(),
        ],
        _ => Vec::new(),
    }
}

/// Everything following the inputs of an executable link, in order:
/// includes, optimizations, math macros, library paths, libraries.
pub fn link_flags(cfg: &BuildConfiguration, layout: &BuildLayout) -> Vec<String> {
    let mut flags = includes(cfg, layout);
    flags.extend(optimizations(cfg));
    flags.extend(math_macros(cfg));
    flags.extend(library_paths(cfg, layout));
    flags.extend(libraries(cfg, layout));
    flags.extend(accelerator_libraries(cfg, layout));
    flags
}

fn path_arg(path: PathBuf) -> String {
    path.display().to_string()
}

fn to_strings(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|f| f.to_string()).collect()
}
