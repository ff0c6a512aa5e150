//! Release staging.
//!
//! Assembles a distributable directory from the built player executables:
//!
//! 1. Read the version from the CPU player's `--version` output
//! 2. Create `release_<version>/` with `logs/` and `networks/`
//! 3. Copy the players under their distribution names, plus documentation
//! 4. Copy the network weights under fixed names
//! 5. Run `--configure` and patch the generated `config.json`
//!
//! Optionally a competition subset is derived from the release tree with
//! documentation, GPU players and shared libraries removed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::core::Platform;
use crate::ops::config_patch::patch_config_file;
use crate::util::fs::{copy_dir_all, copy_file, ensure_dir, glob_files, remove_file_if_exists, write_string};
use crate::util::process::ProcessBuilder;

/// Shared library patterns removed from the competition subset.
const SHARED_LIBRARY_PATTERNS: &[&str] = &["*.dll", "*.so", "*.so.*", "*.dylib"];

/// Error in release staging.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("`{0}` printed no version")]
    NoVersion(String),

    #[error("player executable not found: {0}")]
    MissingPlayer(PathBuf),
}

/// A player executable and its distribution name (without extension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerExecutable {
    /// Name in the build directory
    pub source: String,
    /// Name in the release directory
    pub target: String,
    /// Whether the player needs a GPU backend
    #[serde(default)]
    pub gpu: bool,
}

impl PlayerExecutable {
    fn new(source: &str, target: &str, gpu: bool) -> Self {
        PlayerExecutable {
            source: source.to_string(),
            target: target.to_string(),
            gpu,
        }
    }
}

/// A LaTeX document shipped as PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSource {
    /// Directory containing `<name>.tex`
    pub dir: PathBuf,
    /// Document base name
    pub name: String,
}

impl DocSource {
    pub fn pdf_path(&self) -> PathBuf {
        self.dir.join(format!("{}.pdf", self.name))
    }

    fn pdf_name(&self) -> String {
        format!("{}.pdf", self.name)
    }
}

/// Release settings, the `[release]` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Directory holding the built player executables
    pub build_dir: PathBuf,

    /// Directory in which `release_<version>/` is created
    pub dest_root: PathBuf,

    /// Players to ship; the first one is queried for the version and configured
    pub players: Vec<PlayerExecutable>,

    /// Documentation to ship
    pub docs: Vec<DocSource>,

    /// Network weights: distribution name -> source file
    pub networks: BTreeMap<String, PathBuf>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            build_dir: PathBuf::from("../build/Release/bin/"),
            dest_root: PathBuf::from("../"),
            players: vec![
                PlayerExecutable::new("ag_player_cpu", "pbrain-AlphaGomoku", false),
                PlayerExecutable::new("ag_player_cuda", "pbrain-AlphaGomoku_cuda", true),
                PlayerExecutable::new("ag_player_opencl", "pbrain-AlphaGomoku_opencl", true),
            ],
            docs: vec![
                DocSource {
                    dir: PathBuf::from("../doc/protocols/"),
                    name: "protocols".to_string(),
                },
                DocSource {
                    dir: PathBuf::from("../doc/user_manual/"),
                    name: "user_manual".to_string(),
                },
            ],
            networks: BTreeMap::new(),
        }
    }
}

/// Options of one staging run.
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    pub platform: Platform,
    /// Run `pdflatex` for every document before copying
    pub compile_docs: bool,
    /// Also produce the competition subset
    pub competition: bool,
}

/// Directories produced by [`stage_release`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedRelease {
    pub version: String,
    pub release_dir: PathBuf,
    pub competition_dir: Option<PathBuf>,
}

/// Extract the version from `--version` output.
///
/// Takes the last whitespace-separated token of the first line and replaces
/// dots with underscores, so `player (AlphaGomoku) 5.8.1` yields `5_8_1`.
pub fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .next()?
        .split_whitespace()
        .last()
        .map(|v| v.replace('.', "_"))
}

/// Query an executable for its version.
pub fn get_version(exe: &Path) -> Result<String> {
    let output = ProcessBuilder::new(exe).arg("--version").exec()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version(&stdout).ok_or_else(|| ReleaseError::NoVersion(exe.display().to_string()).into())
}

/// Run `pdflatex` for each document; returns the PDFs that exist afterwards.
pub fn compile_docs(docs: &[DocSource]) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for doc in docs {
        tracing::info!("compiling {}.tex", doc.name);
        let status = ProcessBuilder::new("pdflatex")
            .arg(format!("{}.tex", doc.name))
            .cwd(&doc.dir)
            .status()?;
        if !status.success() {
            tracing::warn!("pdflatex exited with {:?} for {}", status.code(), doc.name);
        }
        let pdf = doc.pdf_path();
        if pdf.exists() {
            pdfs.push(pdf);
        }
    }
    Ok(pdfs)
}

/// Assemble `release_<version>/` and, if requested, the competition subset.
pub fn stage_release(config: &ReleaseConfig, opts: &ReleaseOptions) -> Result<StagedRelease> {
    let ext = opts.platform.exe_extension();
    let primary = config
        .players
        .first()
        .context("no player executables configured")?;

    let primary_src = config.build_dir.join(format!("{}{}", primary.source, ext));
    if !primary_src.exists() {
        return Err(ReleaseError::MissingPlayer(primary_src).into());
    }
    let version = get_version(&primary_src)?;
    tracing::info!("staging release {}", version);

    let release_dir = config.dest_root.join(format!("release_{}", version));
    ensure_dir(&release_dir)?;
    ensure_dir(&release_dir.join("logs"))?;
    ensure_dir(&release_dir.join("networks"))?;

    copy_players(config, &release_dir, ext)?;

    if opts.compile_docs {
        compile_docs(&config.docs)?;
    }
    for doc in &config.docs {
        let pdf = doc.pdf_path();
        if pdf.exists() {
            copy_file(&pdf, &release_dir.join(doc.pdf_name()))?;
        } else {
            tracing::warn!("documentation {} not found, skipping", pdf.display());
        }
    }

    for (name, src) in &config.networks {
        let dst = release_dir.join("networks").join(format!("{}.bin", name));
        copy_file(src, &dst)?;
    }

    configure(&release_dir.join(format!("{}{}", primary.target, ext)), &release_dir)?;
    patch_config_file(&release_dir.join("config.json"))?;
    write_string(
        &release_dir.join("swap2_openings.json"),
        &serde_json::to_string_pretty(&swap2_openings())?,
    )?;

    let competition_dir = if opts.competition {
        Some(stage_competition(config, &release_dir, &version, ext)?)
    } else {
        None
    };

    Ok(StagedRelease {
        version,
        release_dir,
        competition_dir,
    })
}

fn copy_players(config: &ReleaseConfig, release_dir: &Path, ext: &str) -> Result<()> {
    for (idx, player) in config.players.iter().enumerate() {
        let src = config.build_dir.join(format!("{}{}", player.source, ext));
        let dst = release_dir.join(format!("{}{}", player.target, ext));
        if !src.exists() && idx > 0 {
            tracing::warn!("{} not built, skipping", src.display());
            continue;
        }
        copy_file(&src, &dst)?;
    }
    Ok(())
}

/// Run the player's `--configure` inside the release directory.
fn configure(player: &Path, release_dir: &Path) -> Result<()> {
    let player = std::fs::canonicalize(player)
        .with_context(|| format!("player not found: {}", player.display()))?;
    let status = ProcessBuilder::new(&player)
        .arg("--configure")
        .cwd(release_dir)
        .status()?;
    if !status.success() {
        tracing::warn!("{} --configure exited with {:?}", player.display(), status.code());
    }
    Ok(())
}

/// Copy the release tree and strip what the competition does not allow.
pub fn stage_competition(
    config: &ReleaseConfig,
    release_dir: &Path,
    version: &str,
    ext: &str,
) -> Result<PathBuf> {
    let dir = config.dest_root.join(format!("gomocup_{}", version));
    copy_dir_all(release_dir, &dir)
        .with_context(|| format!("failed to copy release to {}", dir.display()))?;

    for doc in &config.docs {
        remove_file_if_exists(&dir.join(doc.pdf_name()))?;
    }
    for player in config.players.iter().filter(|p| p.gpu) {
        remove_file_if_exists(&dir.join(format!("{}{}", player.target, ext)))?;
    }
    for lib in glob_files(&dir, SHARED_LIBRARY_PATTERNS)? {
        remove_file_if_exists(&lib)?;
    }

    tracing::info!("competition subset in {}", dir.display());
    Ok(dir)
}

/// Balanced swap2 openings shipped with every release.
fn swap2_openings() -> serde_json::Value {
    json!([
        [{"row": 5, "col": 11, "sign": "CROSS"}, {"row": 6, "col": 11, "sign": "CIRCLE"}, {"row": 6, "col": 13, "sign": "CROSS"}],
        [{"row": 12, "col": 11, "sign": "CROSS"}, {"row": 13, "col": 13, "sign": "CIRCLE"}, {"row": 14, "col": 12, "sign": "CROSS"}],
        [{"row": 13, "col": 11, "sign": "CROSS"}, {"row": 12, "col": 10, "sign": "CIRCLE"}, {"row": 10, "col": 11, "sign": "CROSS"}],
        [{"row": 11, "col": 8, "sign": "CROSS"}, {"row": 10, "col": 9, "sign": "CIRCLE"}, {"row": 11, "col": 12, "sign": "CROSS"}],
        [{"row": 10, "col": 9, "sign": "CROSS"}, {"row": 12, "col": 8, "sign": "CIRCLE"}, {"row": 13, "col": 4, "sign": "CROSS"}]
    ])
}
