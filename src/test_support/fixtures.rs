//! Project tree fixtures.
//!
//! A [`ProjectFixture`] lays out an engine-shaped source tree in a temporary
//! directory and hands out a [`BuildLayout`] rooted at it.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::builder::context::BuildLayout;

/// Library sources outside the excluded math subtrees.
const LIBRARY_SOURCES: &[&str] = &[
    "src/configs.cpp",
    "src/game/Board.cpp",
    "src/game/Move.cpp",
    "src/math/activations.cpp",
    "src/search/mcts/Tree.cpp",
    "src/search/mcts/Node.cpp",
];

const EXCLUDED_SOURCES: &[&str] = &["src/math/cpu/gemm.cpp", "src/math/cuda/gemm.cpp"];

const HEADERS: &[&str] = &[
    "include/alphagomoku/game/Board.hpp",
    "src/search/mcts/internal.hpp",
];

const TEST_SOURCES: &[&str] = &["test/game/test_Board.cpp", "test/search/test_Tree.cpp"];

/// Fixture for a complete project structure.
#[derive(Debug)]
pub struct ProjectFixture {
    dir: TempDir,
    library_sources: Vec<PathBuf>,
}

impl ProjectFixture {
    /// A project with no source tree at all.
    pub fn empty() -> Self {
        ProjectFixture {
            dir: TempDir::new().expect("failed to create temp dir"),
            library_sources: Vec::new(),
        }
    }

    /// A project with library, accelerator, header and test sources.
    pub fn engine() -> Self {
        let mut fixture = Self::empty();
        for rel in EXCLUDED_SOURCES.iter().chain(HEADERS).chain(TEST_SOURCES) {
            fixture.write(rel, "");
        }
        fixture.write("contrib/gtest/gtest-all.cc", "");
        fixture.write("training_launcher/launcher.cpp", "int main() {}\n");

        for rel in LIBRARY_SOURCES {
            let path = fixture.write(rel, "");
            fixture.library_sources.push(path);
        }
        fixture
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Layout rooted at the fixture.
    pub fn layout(&self) -> BuildLayout {
        BuildLayout::rooted_at(self.root())
    }

    /// Number of library sources the synthesizer should compile.
    pub fn library_source_count(&self) -> usize {
        self.library_sources.len()
    }

    /// Absolute paths of the unit-test sources.
    pub fn test_sources(&self) -> Vec<PathBuf> {
        TEST_SOURCES.iter().map(|rel| self.root().join(rel)).collect()
    }

    /// Add a library source after construction.
    pub fn add_library_source(&self, rel: &str) -> PathBuf {
        self.write(&format!("src/{}", rel), "")
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        fs::write(&path, contents).expect("failed to write fixture file");
        path
    }
}
