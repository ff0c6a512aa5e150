//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::Compiler;

use super::{ArchiveInput, CommandSpec, Toolchain};

/// MSVC toolchain: `cl` driver and `lib` librarian.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsvcToolchain;

impl Toolchain for MsvcToolchain {
    fn compiler(&self) -> Compiler {
        Compiler::Msvc
    }

    fn compile_prefix(&self) -> CommandSpec {
        CommandSpec::new("cl").args(["/std:c++17", "/openmp", "/c", "/EHsc"])
    }

    fn link_prefix(&self) -> CommandSpec {
        CommandSpec::new("cl").args(["/std:c++17", "/openmp", "/EHsc"])
    }

    fn include_flag(&self, dir: &Path) -> String {
        format!("/I{}", dir.display())
    }

    fn lib_dir_flags(&self, dirs: &[PathBuf]) -> Vec<String> {
        if dirs.is_empty() {
            return Vec::new();
        }
        // Everything after /link is handed to link.exe
        let mut flags = vec!["/link".to_string()];
        flags.extend(dirs.iter().map(|d| format!("/LIBPATH:{}", d.display())));
        flags
    }

    fn object_output(&self, output: &Path) -> Vec<String> {
        vec![format!("/Fo{}", output.display())]
    }

    fn exe_output(&self, output: &Path) -> Vec<String> {
        vec![format!("/Fe{}", output.display())]
    }

    fn archive_command(&self, input: &ArchiveInput) -> CommandSpec {
        CommandSpec::new("lib")
            .arg(format!("/OUT:{}", input.output.display()))
            .args(input.objects.iter().map(|o| o.display().to_string()))
    }

    fn env_setup_command(&self, script: &Path) -> Option<CommandSpec> {
        Some(CommandSpec::new("call").arg(script.display().to_string()))
    }

    fn static_lib_extension(&self) -> &'static str {
        ".lib"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{CompileInput, ShellSyntax};

    #[test]
    fn test_prefixes() {
        assert_eq!(MsvcToolchain.compile_prefix().args, vec!["/std:c++17", "/openmp", "/c", "/EHsc"]);
        assert_eq!(MsvcToolchain.link_prefix().args, vec!["/std:c++17", "/openmp", "/EHsc"]);
    }

    #[test]
    fn test_compile_command_uses_fo() {
        let cmd = MsvcToolchain.compile_command(&CompileInput {
            source: PathBuf::from("../src/a.cpp"),
            output: PathBuf::from("../bin/objects/a.o"),
            flags: vec!["/MD".to_string()],
        });
        assert_eq!(
            cmd.args,
            vec!["/std:c++17", "/openmp", "/c", "/EHsc", "/MD", "/Fo../bin/objects/a.o", "../src/a.cpp"]
        );
    }

    #[test]
    fn test_archive_command() {
        let cmd = MsvcToolchain.archive_command(&ArchiveInput {
            objects: vec![PathBuf::from("a.o")],
            output: PathBuf::from("../bin/alfa.lib"),
        });
        assert_eq!(cmd.render_for(ShellSyntax::Batch), "lib /OUT:../bin/alfa.lib a.o");
    }

    #[test]
    fn test_lib_dir_flags_prefixed_with_link() {
        let flags = MsvcToolchain.lib_dir_flags(&[PathBuf::from("../bin")]);
        assert_eq!(flags, vec!["/link", "/LIBPATH:../bin"]);
        assert!(MsvcToolchain.lib_dir_flags(&[]).is_empty());
    }

    #[test]
    fn test_env_setup_is_call() {
        let cmd = MsvcToolchain
            .env_setup_command(Path::new("C:\\VS\\vcvars64.bat"))
            .unwrap();
        assert_eq!(cmd.render_for(ShellSyntax::Batch), "call C:\\VS\\vcvars64.bat");
    }
}
