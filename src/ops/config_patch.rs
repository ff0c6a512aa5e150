//! Rewriting of the launcher's generated `config.json` for distribution.
//!
//! The launcher's `--configure` run writes one device entry per detected
//! device and tunes batch sizes for the build machine. Releases ship a
//! single device entry with fixed batch size and thread count.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::util::fs::{read_to_string, write_string};

/// Batch size written into both the device entry and the search config.
pub const RELEASE_BATCH_SIZE: u64 = 12;

/// Number of search threads in a release config.
pub const RELEASE_SEARCH_THREADS: u64 = 1;

/// A generated config that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigPatchError {
    #[error("config root is not a JSON object")]
    NotAnObject,

    #[error("config has no `{0}` field")]
    MissingField(&'static str),

    #[error("`devices` is empty")]
    NoDevices,

    #[error("`{0}` is not a JSON object")]
    WrongType(&'static str),
}

/// Apply the release rewrite to a parsed config.
///
/// `devices` collapses to its first entry (an already collapsed object is
/// accepted as is), `omp_threads` is dropped from it, and the batch size and
/// search thread count are pinned.
pub fn patch_config(cfg: &mut Value) -> Result<(), ConfigPatchError> {
    let root = cfg.as_object_mut().ok_or(ConfigPatchError::NotAnObject)?;

    let devices = root
        .get_mut("devices")
        .ok_or(ConfigPatchError::MissingField("devices"))?;
    if devices.is_array() {
        let first = devices
            .as_array_mut()
            .filter(|entries| !entries.is_empty())
            .map(|entries| entries.swap_remove(0))
            .ok_or(ConfigPatchError::NoDevices)?;
        *devices = first;
    }

    let device = devices
        .as_object_mut()
        .ok_or(ConfigPatchError::WrongType("devices"))?;
    device.remove("omp_threads");
    device.insert("batch_size".to_string(), json!(RELEASE_BATCH_SIZE));

    root.insert("search_threads".to_string(), json!(RELEASE_SEARCH_THREADS));

    let search_config = root
        .entry("search_config")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or(ConfigPatchError::WrongType("search_config"))?;
    search_config.insert("max_batch_size".to_string(), json!(RELEASE_BATCH_SIZE));

    Ok(())
}

/// Patch a config file in place, pretty-printed with two-space indent.
pub fn patch_config_file(path: &Path) -> Result<()> {
    let contents = read_to_string(path)?;
    let mut cfg: Value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    patch_config(&mut cfg).with_context(|| format!("cannot patch {}", path.display()))?;

    let rendered = serde_json::to_string_pretty(&cfg)?;
    write_string(path, &rendered)?;
    tracing::debug!("patched {}", path.display());
    Ok(())
}
