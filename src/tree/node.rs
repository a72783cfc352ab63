//! Snapshot node and flattened item types.

use serde::{Deserialize, Serialize};

/// One filesystem entry in a scan snapshot.
///
/// Built bottom-up by the scanner and immutable afterwards. Children are
/// sorted lexicographically by name; a non-directory node always has an
/// empty `children` vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub is_dir: bool,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf (non-directory) node.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            children: Vec::new(),
        }
    }

    /// Create a directory node with the given children.
    pub fn dir(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            children,
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Render the subtree as indented text, one entry per line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.name);
        if self.is_dir {
            out.push('/');
        }
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

/// One scan-relative path record derived from a snapshot.
///
/// The wire field names (`original`, `is_dir`) are what the mapping provider
/// sees; the `original` path starts with the workspace root's own name so it
/// resolves against the workspace *parent* directory at apply time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatItem {
    pub original: String,
    pub is_dir: bool,
}
