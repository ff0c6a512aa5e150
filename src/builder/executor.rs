//! Command execution.
//!
//! The executor prints every command before it runs and executes the
//! sequence strictly in order. In the default mode a failing command is
//! recorded and execution continues, so a broken compile surfaces later as a
//! failing archive or link step. Strict mode stops at the first non-zero
//! exit instead.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::builder::toolchain::{CommandSpec, ShellSyntax};
use crate::core::Platform;
use crate::util::process::{find_executable, ProcessBuilder};

/// Error raised by the executor in strict mode.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("failed to start `{command}`: {message}")]
    Spawn { command: String, message: String },
}

/// Something that runs a shell script and reports its exit code.
///
/// `None` means the process ended without an exit code (killed by a signal).
pub trait ShellRunner: Send + Sync {
    fn run(&self, script: &str) -> Result<Option<i32>>;

    /// Quoting rules for command lines handed to [`run`](Self::run).
    fn syntax(&self) -> ShellSyntax {
        ShellSyntax::Posix
    }
}

/// Runs each script through `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct PosixShell;

impl ShellRunner for PosixShell {
    fn run(&self, script: &str) -> Result<Option<i32>> {
        let status = ProcessBuilder::new("sh").arg("-c").arg(script).status()?;
        Ok(status.code())
    }
}

/// Writes the script to a batch file and runs it through `cmd /C`.
#[derive(Debug, Clone)]
pub struct BatchShell {
    script_path: PathBuf,
}

impl BatchShell {
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        BatchShell {
            script_path: script_path.into(),
        }
    }
}

impl ShellRunner for BatchShell {
    fn run(&self, script: &str) -> Result<Option<i32>> {
        fs::write(&self.script_path, script)
            .with_context(|| format!("failed to write {}", self.script_path.display()))?;
        let status = ProcessBuilder::new("cmd")
            .arg("/C")
            .arg(&self.script_path)
            .status()?;
        Ok(status.code())
    }

    fn syntax(&self) -> ShellSyntax {
        ShellSyntax::Batch
    }
}

/// Batch line that ends the script with the exit code of a failed command.
const BATCH_FAIL_GUARD: &str = "if errorlevel 1 exit /b %errorlevel%";

/// Result of one executed (or skipped) command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failed(Option<i32>),
    /// The shell could not be started
    SpawnError(String),
    /// Not run (dry-run)
    Skipped,
}

impl CommandStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, CommandStatus::Failed(_) | CommandStatus::SpawnError(_))
    }
}

/// One entry of an [`ExecutionReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Rendered command line, or the whole script in batch mode
    pub command: String,
    pub status: CommandStatus,
}

/// Per-command statuses of one executor run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl ExecutionReport {
    pub fn failures(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failure())
    }

    pub fn succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Merge another report into this one.
    pub fn absorb(&mut self, other: ExecutionReport) {
        self.outcomes.extend(other.outcomes);
    }
}

/// Runs command sequences on the host shell.
pub struct CommandExecutor {
    runner: Box<dyn ShellRunner>,
    batched: bool,
    strict: bool,
    dry_run: bool,
}

impl CommandExecutor {
    /// Executor using `runner` for each command.
    pub fn new(runner: impl ShellRunner + 'static) -> Self {
        CommandExecutor {
            runner: Box::new(runner),
            batched: false,
            strict: false,
            dry_run: false,
        }
    }

    /// Executor suited to `platform`.
    ///
    /// Windows runs a whole sequence as one batch script in `work_dir`, so
    /// that environment set up by `call` reaches the following commands.
    pub fn for_platform(platform: &Platform, work_dir: &Path) -> Self {
        if platform.is_windows() {
            CommandExecutor::new(BatchShell::new(work_dir.join("tmp_script.bat"))).batched(true)
        } else {
            CommandExecutor::new(PosixShell)
        }
    }

    /// Run a sequence as one script instead of command by command.
    pub fn batched(mut self, batched: bool) -> Self {
        self.batched = batched;
        self
    }

    /// Abort on the first failing command.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Print commands without running them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute `commands` in order.
    ///
    /// Returns an error only in strict mode (or when a batch script cannot be
    /// written); otherwise failures are recorded in the report.
    pub fn run(&self, commands: &[CommandSpec]) -> Result<ExecutionReport> {
        if commands.is_empty() {
            return Ok(ExecutionReport::default());
        }

        let syntax = self.runner.syntax();
        let lines: Vec<String> = commands.iter().map(|c| c.render_for(syntax)).collect();
        if self.batched {
            let mut script = String::new();
            for (command, line) in commands.iter().zip(&lines) {
                println!("{}", line);
                script.push_str(line);
                script.push('\n');
                // cmd.exe carries on after a failed line and reports the last one
                if self.strict && !is_env_setup(command) {
                    script.push_str(BATCH_FAIL_GUARD);
                    script.push('\n');
                }
            }
            let outcome = self.run_one(script)?;
            return Ok(ExecutionReport {
                outcomes: vec![outcome],
            });
        }

        let mut report = ExecutionReport::default();
        for (command, line) in commands.iter().zip(lines) {
            println!("{}", line);
            if !self.dry_run {
                warn_if_not_on_path(command);
            }
            report.outcomes.push(self.run_one(line)?);
        }
        Ok(report)
    }

    fn run_one(&self, script: String) -> Result<CommandOutcome> {
        if self.dry_run {
            return Ok(CommandOutcome {
                command: script,
                status: CommandStatus::Skipped,
            });
        }

        let status = match self.runner.run(&script) {
            Ok(Some(0)) => CommandStatus::Success,
            Ok(code) => CommandStatus::Failed(code),
            Err(e) => CommandStatus::SpawnError(format!("{:#}", e)),
        };

        match &status {
            CommandStatus::Failed(code) => {
                tracing::debug!("exit code {:?}: {}", code, script);
                if self.strict {
                    return Err(ExecutionError::CommandFailed {
                        command: script,
                        code: *code,
                    }
                    .into());
                }
            }
            CommandStatus::SpawnError(message) => {
                tracing::warn!("{}", message);
                if self.strict {
                    return Err(ExecutionError::Spawn {
                        command: script,
                        message: message.clone(),
                    }
                    .into());
                }
            }
            CommandStatus::Success | CommandStatus::Skipped => {}
        }

        Ok(CommandOutcome {
            command: script,
            status,
        })
    }
}

fn is_env_setup(command: &CommandSpec) -> bool {
    command.program.as_os_str() == "call"
}

fn warn_if_not_on_path(command: &CommandSpec) {
    let program = command.program.to_string_lossy();
    if command.program.components().count() == 1 && find_executable(&program).is_none() {
        tracing::warn!("`{}` not found in PATH", program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRunner;

    fn commands() -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("g++").args(["-c", "a.cpp"]),
            CommandSpec::new("g++").args(["-c", "b.cpp"]),
            CommandSpec::new("ar").args(["rcs", "lib.a", "a.o", "b.o"]),
        ]
    }

    #[test]
    fn test_runs_every_command_in_order() {
        let runner = MockRunner::new();
        let report = CommandExecutor::new(runner.clone()).run(&commands()).unwrap();

        assert_eq!(
            runner.calls(),
            vec!["g++ -c a.cpp", "g++ -c b.cpp", "ar rcs lib.a a.o b.o"]
        );
        assert!(report.succeeded());
        assert_eq!(report.outcomes.len(), 3);
    }

    #[test]
    fn test_weak_mode_continues_after_failure() {
        let runner = MockRunner::with_exit_codes(&[0, 1, 0]);
        let report = CommandExecutor::new(runner.clone()).run(&commands()).unwrap();

        assert_eq!(runner.calls().len(), 3);
        assert!(!report.succeeded());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].command, "g++ -c b.cpp");
        assert_eq!(failures[0].status, CommandStatus::Failed(Some(1)));
    }

    #[test]
    fn test_strict_mode_stops_at_first_failure() {
        let runner = MockRunner::with_exit_codes(&[0, 2, 0]);
        let err = CommandExecutor::new(runner.clone())
            .strict(true)
            .run(&commands())
            .unwrap_err();

        assert_eq!(runner.calls().len(), 2);
        match err.downcast_ref::<ExecutionError>() {
            Some(ExecutionError::CommandFailed { command, code }) => {
                assert_eq!(command, "g++ -c b.cpp");
                assert_eq!(*code, Some(2));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        let runner = MockRunner::new();
        let report = CommandExecutor::new(runner.clone())
            .dry_run(true)
            .run(&commands())
            .unwrap();

        assert!(runner.calls().is_empty());
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == CommandStatus::Skipped));
    }

    #[test]
    fn test_batched_runs_single_script() {
        let runner = MockRunner::new();
        let report = CommandExecutor::new(runner.clone())
            .batched(true)
            .run(&commands())
            .unwrap();

        assert_eq!(
            runner.calls(),
            vec!["g++ -c a.cpp\ng++ -c b.cpp\nar rcs lib.a a.o b.o\n"]
        );
        assert_eq!(report.outcomes.len(), 1);
    }

    #[test]
    fn test_strict_batch_script_exits_on_first_failure() {
        let runner = MockRunner::with_exit_codes(&[2]);
        let mut sequence = vec![CommandSpec::new("call").arg("vcvars64.bat")];
        sequence.extend(commands());

        let err = CommandExecutor::new(runner.clone())
            .batched(true)
            .strict(true)
            .run(&sequence)
            .unwrap_err();

        assert_eq!(
            runner.calls(),
            vec![concat!(
                "call vcvars64.bat\n",
                "g++ -c a.cpp\n",
                "if errorlevel 1 exit /b %errorlevel%\n",
                "g++ -c b.cpp\n",
                "if errorlevel 1 exit /b %errorlevel%\n",
                "ar rcs lib.a a.o b.o\n",
                "if errorlevel 1 exit /b %errorlevel%\n",
            )]
        );
        assert!(matches!(
            err.downcast_ref::<ExecutionError>(),
            Some(ExecutionError::CommandFailed { code: Some(2), .. })
        ));
    }

    #[test]
    fn test_batch_shell_renders_for_cmd() {
        let shell = BatchShell::new("tmp_script.bat");
        let cmd = CommandSpec::new("cl").arg("/IC:\\Program Files\\CUDA\\include/");
        assert_eq!(
            cmd.render_for(shell.syntax()),
            "cl \"/IC:\\Program Files\\CUDA\\include/\""
        );
        assert_eq!(PosixShell.syntax(), ShellSyntax::Posix);
    }

    #[test]
    fn test_empty_sequence() {
        let runner = MockRunner::new();
        let report = CommandExecutor::new(runner.clone()).run(&[]).unwrap();
        assert!(report.outcomes.is_empty());
        assert!(runner.calls().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_posix_shell_passes_arguments_verbatim() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("args.txt");
        let args = [
            "../src/cost$model/a.cpp",
            "../src/`id`/b.cpp",
            "../src/x*/c.cpp",
            "../src/it's/d.cpp",
            "C:\\CUDA\\include",
        ];
        let cmd = CommandSpec::new("printf").arg("%s\\n").args(args);
        let script = format!("{} > {}", cmd.render(), CommandSpec::new(out.clone()).render());

        assert_eq!(PosixShell.run(&script).unwrap(), Some(0));
        let printed = fs::read_to_string(&out).unwrap();
        assert_eq!(printed.lines().collect::<Vec<_>>(), args);
    }

    #[cfg(unix)]
    #[test]
    fn test_posix_shell_reports_exit_code() {
        assert_eq!(PosixShell.run("exit 0").unwrap(), Some(0));
        assert_eq!(PosixShell.run("exit 5").unwrap(), Some(5));
    }
}
