//! Recursive workspace scanner.
//!
//! Builds a [`TreeNode`] snapshot bottom-up with explicit recursion. An
//! ignored name produces no node at all, and the scanner never descends
//! beneath it. Symlinks are opaque leaves: entries are classified with
//! `symlink_metadata`, so a symlinked directory is recorded as a
//! non-directory and never traversed, which also rules out symlink cycles.
//!
//! Subtree errors are tolerated: an unreadable directory becomes a node with
//! no children and an unreadable entry is dropped, each with a logged
//! warning. Only a missing scan root fails the whole scan.

use crate::error::ApiError;
use crate::tree::node::TreeNode;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Scan `root` into a tree snapshot, excluding entries whose base name is in
/// `ignore`.
pub fn scan(root: &Path, ignore: &HashSet<String>) -> Result<TreeNode, ApiError> {
    if !root.exists() {
        return Err(ApiError::NotFound(format!(
            "scan root does not exist: {}",
            root.display()
        )));
    }
    build_node(root, ignore).ok_or_else(|| {
        ApiError::ConfigError(format!(
            "scan root {} is excluded by the ignore list",
            root.display()
        ))
    })
}

/// Build the node for one path, or `None` when the entry is ignored or
/// unreadable.
fn build_node(path: &Path, ignore: &HashSet<String>) -> Option<TreeNode> {
    let name = node_name(path);
    if ignore.contains(&name) {
        debug!(path = %path.display(), "ignoring entry");
        return None;
    }

    // symlink_metadata: a symlink is a leaf, never followed.
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping unreadable entry");
            return None;
        }
    };

    let mut children = Vec::new();
    if meta.is_dir() {
        match fs::read_dir(path) {
            Ok(entries) => {
                let mut paths: Vec<_> = entries
                    .filter_map(|entry| match entry {
                        Ok(entry) => Some(entry.path()),
                        Err(err) => {
                            warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                            None
                        }
                    })
                    .collect();
                paths.sort_by_key(|p| node_name(p));
                for child in &paths {
                    if let Some(node) = build_node(child, ignore) {
                        children.push(node);
                    }
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable directory");
            }
        }
    }

    Some(TreeNode {
        name,
        is_dir: meta.is_dir(),
        children,
    })
}

fn node_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
