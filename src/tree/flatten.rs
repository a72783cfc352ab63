//! Snapshot flattening.
//!
//! Pure depth-first pre-order walk: exactly one [`FlatItem`] per node, a
//! directory's item preceding all of its descendants'. The root node is the
//! first item and its name is the first path segment, so every path resolves
//! against the workspace parent directory.

use crate::tree::node::{FlatItem, TreeNode};
use std::path::Path;

/// Flatten a snapshot into its ordered path records.
pub fn flatten(root: &TreeNode) -> Vec<FlatItem> {
    let mut items = Vec::with_capacity(root.node_count());
    walk(root, "", &mut items);
    items
}

fn walk(node: &TreeNode, parent: &str, items: &mut Vec<FlatItem>) {
    let path = Path::new(parent)
        .join(&node.name)
        .to_string_lossy()
        .into_owned();
    items.push(FlatItem {
        original: path.clone(),
        is_dir: node.is_dir,
    });
    for child in &node.children {
        walk(child, &path, items);
    }
}
