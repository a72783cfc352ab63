//! Rename planning and application.
//!
//! The mapping collaborator supplies [`RenameEntry`] pairs whose paths are
//! relative to the workspace *parent* directory (the flattened paths start
//! with the workspace root's own name). Entries are ordered deepest-first
//! before execution so renaming an ancestor never invalidates a child's
//! still-relative original path.
//!
//! Apply is deliberately not transactional: each entry succeeds, is skipped,
//! or fails on its own, and the batch always runs to completion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// One rename instruction from the mapping collaborator.
///
/// Deserialization doubles as schema validation: both fields are required
/// strings, so a malformed mapping payload fails the mapping stage instead
/// of reaching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameEntry {
    pub original: String,
    pub new: String,
}

/// Outcome of a single rename entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameStatus {
    /// The filesystem move succeeded.
    Renamed,
    /// The source path no longer existed when the entry was processed.
    Skipped,
    /// The move failed (collision, permissions, cross-device, ...).
    Failed,
}

impl fmt::Display for RenameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameStatus::Renamed => write!(f, "renamed"),
            RenameStatus::Skipped => write!(f, "skipped"),
            RenameStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Per-entry apply result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameResult {
    pub original: String,
    pub new: String,
    pub status: RenameStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenameResult {
    fn renamed(entry: &RenameEntry) -> Self {
        Self {
            original: entry.original.clone(),
            new: entry.new.clone(),
            status: RenameStatus::Renamed,
            error: None,
        }
    }

    fn skipped(entry: &RenameEntry) -> Self {
        Self {
            original: entry.original.clone(),
            new: entry.new.clone(),
            status: RenameStatus::Skipped,
            error: None,
        }
    }

    fn failed(entry: &RenameEntry, err: impl fmt::Display) -> Self {
        Self {
            original: entry.original.clone(),
            new: entry.new.clone(),
            status: RenameStatus::Failed,
            error: Some(err.to_string()),
        }
    }
}

/// Order entries deepest-first (descending path segment count).
///
/// The sort is stable, so entries at equal depth keep their mapping order.
pub fn plan(entries: &[RenameEntry]) -> Vec<RenameEntry> {
    let mut planned = entries.to_vec();
    planned.sort_by_key(|entry| std::cmp::Reverse(path_depth(&entry.original)));
    planned
}

fn path_depth(path: &str) -> usize {
    Path::new(path).components().count()
}

/// Apply a rename mapping against the directory containing the workspace.
///
/// Sources that no longer exist produce an explicit `Skipped` result; any
/// other per-entry error produces a `Failed` result and the batch continues.
pub fn apply(entries: &[RenameEntry], workspace_parent: &Path) -> Vec<RenameResult> {
    let planned = plan(entries);
    let mut results = Vec::with_capacity(planned.len());

    for entry in &planned {
        let src = workspace_parent.join(&entry.original);
        let dst = workspace_parent.join(&entry.new);
        results.push(apply_one(entry, &src, &dst));
    }

    results
}

fn apply_one(entry: &RenameEntry, src: &Path, dst: &Path) -> RenameResult {
    // symlink_metadata so a dangling symlink still counts as present.
    if fs::symlink_metadata(src).is_err() {
        warn!(original = %entry.original, "source missing, skipping entry");
        return RenameResult::skipped(entry);
    }

    if let Some(parent) = dst.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            error!(
                original = %entry.original,
                new = %entry.new,
                error = %err,
                "failed to create destination parent"
            );
            return RenameResult::failed(entry, err);
        }
    }

    match fs::rename(src, dst) {
        Ok(()) => {
            info!(original = %entry.original, new = %entry.new, "renamed");
            RenameResult::renamed(entry)
        }
        Err(err) => {
            error!(
                original = %entry.original,
                new = %entry.new,
                error = %err,
                "rename failed"
            );
            RenameResult::failed(entry, err)
        }
    }
}
