//! GCC toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::Compiler;

use super::{ArchiveInput, CommandSpec, Toolchain};

/// GNU toolchain: `g++` driver and `ar` archiver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GccToolchain;

impl Toolchain for GccToolchain {
    fn compiler(&self) -> Compiler {
        Compiler::Gcc
    }

    fn compile_prefix(&self) -> CommandSpec {
        CommandSpec::new("g++").args(["-m64", "-std=c++17", "-fopenmp", "-c"])
    }

    fn link_prefix(&self) -> CommandSpec {
        CommandSpec::new("g++").args(["-std=c++17", "-m64", "-fopenmp"])
    }

    fn include_flag(&self, dir: &Path) -> String {
        format!("-I{}", dir.display())
    }

    fn lib_dir_flags(&self, dirs: &[PathBuf]) -> Vec<String> {
        dirs.iter().map(|d| format!("-L{}", d.display())).collect()
    }

    fn object_output(&self, output: &Path) -> Vec<String> {
        vec!["-o".to_string(), output.display().to_string()]
    }

    fn exe_output(&self, output: &Path) -> Vec<String> {
        vec!["-o".to_string(), output.display().to_string()]
    }

    fn archive_command(&self, input: &ArchiveInput) -> CommandSpec {
        // Create archive with symbol index, replace files
        CommandSpec::new("ar")
            .arg("rcs")
            .arg(input.output.display().to_string())
            .args(input.objects.iter().map(|o| o.display().to_string()))
    }

    fn env_setup_command(&self, _script: &Path) -> Option<CommandSpec> {
        None
    }

    fn static_lib_extension(&self) -> &'static str {
        ".a"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{CompileInput, LinkInput};

    #[test]
    fn test_prefixes() {
        assert_eq!(GccToolchain.compile_prefix().render(), "g++ -m64 -std=c++17 -fopenmp -c");
        assert_eq!(GccToolchain.link_prefix().render(), "g++ -std=c++17 -m64 -fopenmp");
    }

    #[test]
    fn test_compile_command_layout() {
        let cmd = GccToolchain.compile_command(&CompileInput {
            source: PathBuf::from("../src/game/Board.cpp"),
            output: PathBuf::from("../bin/objects/Board.o"),
            flags: vec!["-O3".to_string(), "-DNDEBUG".to_string()],
        });

        assert_eq!(
            cmd.render(),
            "g++ -m64 -std=c++17 -fopenmp -c -O3 -DNDEBUG -o ../bin/objects/Board.o ../src/game/Board.cpp"
        );
    }

    #[test]
    fn test_archive_command_keeps_object_order() {
        let cmd = GccToolchain.archive_command(&ArchiveInput {
            objects: vec![PathBuf::from("b.o"), PathBuf::from("a.o")],
            output: PathBuf::from("../bin/alfa.a"),
        });
        assert_eq!(cmd.args, vec!["rcs", "../bin/alfa.a", "b.o", "a.o"]);
    }

    #[test]
    fn test_link_command_puts_sources_before_flags() {
        let cmd = GccToolchain.link_exe_command(&LinkInput {
            sources: vec![PathBuf::from("launcher.cpp")],
            output: PathBuf::from("../bin/release_launcher.out"),
            flags: vec!["-lz".to_string()],
        });
        assert_eq!(
            cmd.args,
            vec!["-std=c++17", "-m64", "-fopenmp", "-o", "../bin/release_launcher.out", "launcher.cpp", "-lz"]
        );
    }
}
