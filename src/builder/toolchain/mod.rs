//! Toolchain abstraction for the two supported compiler families.
//!
//! Commands are built as structured [`CommandSpec`] values (program plus
//! ordered argument list) and only rendered to a shell string at the
//! execution boundary, so argument lists can be inspected directly.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::Compiler;

mod gcc;
mod msvc;

pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute: program and ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "g++", "cl")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Whether any argument equals `needle`.
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }

    /// Render as a single `sh`-invocable line.
    pub fn render(&self) -> String {
        self.render_for(ShellSyntax::Posix)
    }

    /// Render as a single line for the given shell.
    pub fn render_for(&self, syntax: ShellSyntax) -> String {
        let quote = match syntax {
            ShellSyntax::Posix => quote_posix,
            ShellSyntax::Batch => quote_batch,
        };
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote(&self.program.display().to_string()));
        parts.extend(self.args.iter().map(|a| quote(a)));
        parts.join(" ")
    }
}

/// Quoting rules of the shell a rendered command is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellSyntax {
    /// `sh -c`: anything outside a plain path alphabet is single-quoted
    Posix,
    /// `cmd.exe` batch scripts: whitespace and metacharacters are double-quoted
    Batch,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn quote_posix(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | ':' | '=' | '+' | '-'));

    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

fn quote_batch(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '&' | '|' | ';' | '<' | '>' | '(' | ')'));

    if needs_quotes {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Input for a compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// Source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    /// Optimization, include, misc and macro flags, in order
    pub flags: Vec<String>,
}

/// Input for an archive step (creating static library).
#[derive(Debug, Clone)]
pub struct ArchiveInput {
    /// Object files to archive, in compilation order
    pub objects: Vec<PathBuf>,
    /// Output archive file
    pub output: PathBuf,
}

/// Input for an executable link step.
#[derive(Debug, Clone)]
pub struct LinkInput {
    /// Sources compiled and linked directly by the driver
    pub sources: Vec<PathBuf>,
    /// Output executable
    pub output: PathBuf,
    /// Flags and libraries following the sources, in order
    pub flags: Vec<String>,
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows the invocation syntax of its compiler driver and
/// archiver.
pub trait Toolchain: Send + Sync {
    /// Compiler family of this toolchain.
    fn compiler(&self) -> Compiler;

    /// Driver invocation for compiling one translation unit.
    fn compile_prefix(&self) -> CommandSpec;

    /// Driver invocation for linking an executable.
    fn link_prefix(&self) -> CommandSpec;

    /// Include-path flag for `dir`.
    fn include_flag(&self, dir: &Path) -> String;

    /// Library-search-path fragment for `dirs`.
    fn lib_dir_flags(&self, dirs: &[PathBuf]) -> Vec<String>;

    /// Arguments naming the object output of a compile step.
    fn object_output(&self, output: &Path) -> Vec<String>;

    /// Arguments naming the executable output of a link step.
    fn exe_output(&self, output: &Path) -> Vec<String>;

    /// Generate an archive command (create static library).
    fn archive_command(&self, input: &ArchiveInput) -> CommandSpec;

    /// Command that prepares the shell environment, if the toolchain needs one.
    fn env_setup_command(&self, script: &Path) -> Option<CommandSpec>;

    /// Static library extension, including the dot.
    fn static_lib_extension(&self) -> &'static str;

    /// Generate a compile command.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        self.compile_prefix()
            .args(input.flags.iter().cloned())
            .args(self.object_output(&input.output))
            .arg(input.source.display().to_string())
    }

    /// Generate a link command for an executable.
    fn link_exe_command(&self, input: &LinkInput) -> CommandSpec {
        self.link_prefix()
            .args(self.exe_output(&input.output))
            .args(input.sources.iter().map(|s| s.display().to_string()))
            .args(input.flags.iter().cloned())
    }
}

static GCC: GccToolchain = GccToolchain;
static MSVC: MsvcToolchain = MsvcToolchain;

/// Toolchain for a compiler family.
pub fn toolchain_for(compiler: Compiler) -> &'static dyn Toolchain {
    match compiler {
        Compiler::Gcc => &GCC,
        Compiler::Msvc => &MSVC,
    }
}
