//! Test utilities for unit tests.
//!
//! Provides project-tree fixtures and a recording command runner so that
//! plan synthesis and execution can be tested without a real toolchain.

pub mod fixtures;

use std::sync::{Arc, Mutex};

use anyhow::Result;

pub use fixtures::*;

use crate::builder::executor::ShellRunner;

/// Shell runner that records scripts and replays scripted exit codes.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    calls: Arc<Mutex<Vec<String>>>,
    exit_codes: Arc<Mutex<Vec<i32>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Exit codes returned for successive calls; calls past the end succeed.
    pub fn with_exit_codes(codes: &[i32]) -> Self {
        let runner = MockRunner::default();
        *runner.exit_codes.lock().unwrap() = codes.iter().rev().copied().collect();
        runner
    }

    /// Scripts passed to the runner so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ShellRunner for MockRunner {
    fn run(&self, script: &str) -> Result<Option<i32>> {
        self.calls.lock().unwrap().push(script.to_string());
        Ok(Some(self.exit_codes.lock().unwrap().pop().unwrap_or(0)))
    }
}
