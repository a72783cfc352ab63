//! Workspace tree snapshots.
//!
//! A scan produces an immutable [`TreeNode`] snapshot of the workspace;
//! flattening turns the snapshot into the ordered path list handed to the
//! mapping provider. Both halves are deterministic: sibling order is
//! lexicographic and flattening is depth-first pre-order.

pub mod flatten;
pub mod node;
pub mod scanner;

pub use flatten::flatten;
pub use node::{FlatItem, TreeNode};
pub use scanner::scan;
