//! Build plan synthesis.
//!
//! A [`LibBuilder`] maps one [`BuildConfiguration`] to ordered command
//! sequences: compile every production translation unit, archive the
//! objects into a static library, then link a launcher executable against
//! the archive and its dependencies.
//!
//! The builder itself holds no mutable state. The object artifacts of a
//! build are recorded in the [`BuildPlan`] value that [`LibBuilder::build`]
//! creates fresh on every call, so repeated or concurrent builds never see
//! each other's objects.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::context::BuildLayout;
use crate::builder::discovery::{discover_sources, Discovery, SourceUnit};
use crate::builder::flags;
use crate::builder::naming::{executable_name, library_name};
use crate::builder::toolchain::{toolchain_for, ArchiveInput, CommandSpec, CompileInput, LinkInput, Toolchain};
use crate::core::{BuildConfiguration, BuildTarget};

/// Kind of a build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Prepare the toolchain environment (MSVC only)
    Setup,
    /// Compile a source file to an object file
    Compile,
    /// Create a static library from object files
    Archive,
    /// Link an executable
    Link,
}

/// A build step in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    pub kind: StepKind,
    pub command: CommandSpec,
}

/// Ordered commands for one configuration plus the objects they produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// All build steps in execution order
    pub steps: Vec<BuildStep>,

    /// Object artifacts planned so far, in compilation order
    pub objects: Vec<PathBuf>,
}

impl BuildPlan {
    pub fn new() -> Self {
        BuildPlan::default()
    }

    /// Append one step.
    pub fn push(&mut self, kind: StepKind, command: CommandSpec) {
        self.steps.push(BuildStep { kind, command });
    }

    /// Append several steps of the same kind.
    pub fn extend(&mut self, kind: StepKind, commands: impl IntoIterator<Item = CommandSpec>) {
        for command in commands {
            self.push(kind, command);
        }
    }

    /// Commands in execution order.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.steps.iter().map(|s| s.command.clone()).collect()
    }

    /// Steps of a given kind.
    pub fn steps_of(&self, kind: StepKind) -> impl Iterator<Item = &BuildStep> {
        self.steps.iter().filter(move |s| s.kind == kind)
    }

    pub fn compile_count(&self) -> usize {
        self.steps_of(StepKind::Compile).count()
    }

    pub fn link_count(&self) -> usize {
        self.steps_of(StepKind::Link).count()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Build plan synthesizer for one configuration.
#[derive(Debug, Clone)]
pub struct LibBuilder {
    config: BuildConfiguration,
    layout: BuildLayout,
}

impl LibBuilder {
    pub fn new(config: BuildConfiguration, layout: BuildLayout) -> Self {
        LibBuilder { config, layout }
    }

    pub fn config(&self) -> &BuildConfiguration {
        &self.config
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    fn toolchain(&self) -> &'static dyn Toolchain {
        toolchain_for(self.config.compiler())
    }

    /// File name of this configuration's static library.
    pub fn library_name(&self) -> String {
        library_name(
            self.config.build_target(),
            self.config.compiler(),
            self.config.accelerator(),
        )
    }

    /// File name of this configuration's launcher executable.
    pub fn executable_name(&self) -> String {
        executable_name(
            self.config.build_target(),
            self.config.accelerator(),
            self.config.platform(),
        )
    }

    /// Full path of the static library.
    pub fn library_path(&self) -> PathBuf {
        self.layout.output(&self.library_name())
    }

    /// Full path of the launcher executable.
    pub fn executable_path(&self) -> PathBuf {
        self.layout.output(&self.executable_name())
    }

    /// Object path for a translation unit.
    ///
    /// Objects are flattened into one directory by file stem, so two units
    /// with the same stem in different directories share an object path.
    pub fn object_path(&self, unit: &SourceUnit) -> PathBuf {
        self.layout.objects_dir.join(format!("{}.o", unit.stem()))
    }

    /// Compile command for one unit; records its object in `plan`.
    pub fn compile_unit(&self, plan: &mut BuildPlan, unit: &SourceUnit) -> CommandSpec {
        let output = self.object_path(unit);
        let command = self.toolchain().compile_command(&CompileInput {
            source: unit.path(),
            output: output.clone(),
            flags: flags::compile_flags(&self.config, &self.layout),
        });
        plan.objects.push(output);
        command
    }

    /// Compile commands for every production translation unit.
    ///
    /// The accelerator-specific math subtrees are always excluded; they are
    /// built by their own toolchain outside this plan.
    pub fn compile_library(&self, plan: &mut BuildPlan) -> Vec<CommandSpec> {
        let units = match discover_sources(
            &self.layout.source_root,
            &self.layout.source_extension,
            &self.layout.header_extension,
            &self.layout.excluded_dirs,
        ) {
            Discovery::Found(units) => units,
            Discovery::Absent => {
                tracing::warn!(
                    "source root {} not found; archive will be empty",
                    self.layout.source_root.display()
                );
                Vec::new()
            }
            Discovery::Excluded => Vec::new(),
        };

        tracing::debug!("{}: {} translation unit(s)", self.config, units.len());
        units.iter().map(|u| self.compile_unit(plan, u)).collect()
    }

    /// Archive command over every object recorded in `plan`.
    ///
    /// Objects are not checked for existence; a missing object only shows
    /// up when the archiver runs.
    pub fn link_library(&self, plan: &BuildPlan) -> Vec<CommandSpec> {
        vec![self.toolchain().archive_command(&ArchiveInput {
            objects: plan.objects.clone(),
            output: self.library_path(),
        })]
    }

    /// Compile-all then archive, starting from an empty plan.
    pub fn build(&self) -> BuildPlan {
        let mut plan = BuildPlan::new();
        plan.extend(StepKind::Setup, self.env_setup());

        let compiles = self.compile_library(&mut plan);
        plan.extend(StepKind::Compile, compiles);

        let archive = self.link_library(&plan);
        plan.extend(StepKind::Archive, archive);
        plan
    }

    /// Executable link commands.
    ///
    /// Release and debug link the launcher entry point against this
    /// configuration's archive. The test target has no archive step of its
    /// own: every test source and the test framework amalgamation are handed
    /// to the driver directly, followed by the same library suffix (whose
    /// archive name resolves to the debug archive).
    pub fn create_executable(&self) -> Vec<CommandSpec> {
        let sources = if self.config.build_target() == BuildTarget::Test {
            self.test_sources()
        } else {
            vec![self.layout.launcher_source.clone()]
        };

        let link = self.toolchain().link_exe_command(&LinkInput {
            sources,
            output: self.executable_path(),
            flags: flags::link_flags(&self.config, &self.layout),
        });

        let mut commands = self.env_setup();
        commands.push(link);
        commands
    }

    /// [`create_executable`](Self::create_executable) as a tagged plan.
    pub fn executable_plan(&self) -> BuildPlan {
        let mut plan = BuildPlan::new();
        for command in self.create_executable() {
            let kind = if command.program.as_os_str() == "call" {
                StepKind::Setup
            } else {
                StepKind::Link
            };
            plan.push(kind, command);
        }
        plan
    }

    fn test_sources(&self) -> Vec<PathBuf> {
        let mut sources: Vec<PathBuf> = discover_sources(
            &self.layout.test_root,
            &self.layout.source_extension,
            &self.layout.header_extension,
            &[],
        )
        .into_units()
        .iter()
        .map(SourceUnit::path)
        .collect();
        sources.push(self.layout.test_framework_source.clone());
        sources
    }

    fn env_setup(&self) -> Vec<CommandSpec> {
        self.toolchain()
            .env_setup_command(&self.layout.msvc_env_script)
            .into_iter()
            .collect()
    }

    /// Delete the object files recorded in `plan`.
    pub fn clear_objects(&self, plan: &BuildPlan) -> Result<()> {
        for object in &plan.objects {
            match fs::remove_file(object) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::warn!("object {} was never produced", object.display());
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to remove {}", object.display()));
                }
            }
        }
        Ok(())
    }
}
