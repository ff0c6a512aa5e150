//! Source discovery.
//!
//! Recursively enumerates translation units below a root directory. An
//! entry whose name ends with the source extension is a translation unit,
//! one ending with the header extension is skipped, and anything else is
//! descended into.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// One translation unit found under a source root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Directory containing the unit
    pub dir: PathBuf,
    /// File name including extension
    pub file_name: String,
}

impl SourceUnit {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        SourceUnit {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Full path of the unit.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// File name truncated at its first `.`.
    ///
    /// `conv.cuda.cpp` yields `conv`, so object names are derived from the
    /// leading component only.
    pub fn stem(&self) -> &str {
        match self.file_name.find('.') {
            Some(idx) => &self.file_name[..idx],
            None => &self.file_name,
        }
    }
}

/// Outcome of a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// The root does not exist or cannot be listed
    Absent,
    /// The root is one of the excluded directories
    Excluded,
    /// The root was listed; the units may be empty
    Found(Vec<SourceUnit>),
}

impl Discovery {
    /// Collapse to a plain list; absent and excluded roots contribute nothing.
    pub fn into_units(self) -> Vec<SourceUnit> {
        match self {
            Discovery::Found(units) => units,
            Discovery::Absent | Discovery::Excluded => Vec::new(),
        }
    }
}

/// Enumerate translation units under `root`.
///
/// Never fails: a missing or unreadable root yields [`Discovery::Absent`],
/// and unreadable entries below it are skipped. Directories listed in
/// `exclude_dirs` are pruned wherever they occur. Entries are visited in
/// file-name order within each directory.
pub fn discover_sources(
    root: &Path,
    source_ext: &str,
    header_ext: &str,
    exclude_dirs: &[PathBuf],
) -> Discovery {
    let is_excluded = |p: &Path| exclude_dirs.iter().any(|ex| ex.as_path() == p);

    if is_excluded(root) {
        tracing::debug!("skipping excluded source root {}", root.display());
        return Discovery::Excluded;
    }

    if let Err(e) = fs::read_dir(root) {
        tracing::debug!("cannot list {}: {}", root.display(), e);
        return Discovery::Absent;
    }

    let mut units = Vec::new();
    let mut walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        let is_dir = entry.file_type().is_dir();
        let path = entry.path();

        if is_excluded(path) {
            if is_dir {
                walker.skip_current_dir();
            }
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name.ends_with(source_ext) {
            let dir = path.parent().unwrap_or(root).to_path_buf();
            units.push(SourceUnit::new(dir, name.into_owned()));
            if is_dir {
                walker.skip_current_dir();
            }
        } else if name.ends_with(header_ext) && is_dir {
            walker.skip_current_dir();
        }
    }

    Discovery::Found(units)
}
