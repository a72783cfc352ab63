//! Run correlation and lifecycle.
//!
//! A run correlates one scan with its mapping and its eventual apply. The
//! [`RunRegistry`] is the single owner of run state: a keyed store behind a
//! `parking_lot` lock, with an explicit lifecycle API instead of an ambient
//! global. Runs with distinct identifiers are fully independent.
//!
//! Lifecycle: `Scanned -> Mapped -> Applied`, then the entry is discarded.
//! Storing a mapping requires a prior scan; applying requires a stored
//! mapping. `take_for_apply` moves the mapping out under the write lock, so
//! a second apply racing on the same identifier is rejected rather than
//! replayed.

use crate::error::ApiError;
use crate::logging::RunLog;
use crate::rename::RenameEntry;
use crate::tree::TreeNode;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Opaque identifier correlating one scan -> mapping -> apply sequence.
pub type RunId = String;

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// A snapshot is stored; a mapping may be requested (and re-requested
    /// after a failed remote call).
    Scanned,
    /// A mapping is stored; apply may consume it.
    Mapped,
    /// The mapping has been consumed; the run is awaiting teardown.
    Applied,
}

/// Per-run state held for the lifetime of one pipeline sequence.
#[derive(Debug)]
pub struct RunContext {
    pub id: RunId,
    pub created_at: DateTime<Utc>,
    pub state: RunState,
    pub snapshot: TreeNode,
    pub mapping: Option<Vec<RenameEntry>>,
    pub log: Option<RunLog>,
}

/// Keyed store mapping run identifiers to their contexts.
#[derive(Default)]
pub struct RunRegistry {
    runs: RwLock<HashMap<RunId, RunContext>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh run for a scan snapshot and return its identifier.
    pub fn create(&self, snapshot: TreeNode) -> RunId {
        let id = Uuid::new_v4().to_string();
        let context = RunContext {
            id: id.clone(),
            created_at: Utc::now(),
            state: RunState::Scanned,
            snapshot,
            mapping: None,
            log: None,
        };
        self.runs.write().insert(id.clone(), context);
        id
    }

    /// Attach the per-run log file opened for this identifier.
    pub fn attach_log(&self, id: &str, log: RunLog) {
        if let Some(context) = self.runs.write().get_mut(id) {
            context.log = Some(log);
        }
    }

    /// Clone the stored snapshot for a run.
    pub fn snapshot(&self, id: &str) -> Result<TreeNode, ApiError> {
        let runs = self.runs.read();
        let context = runs
            .get(id)
            .ok_or_else(|| ApiError::NotFound(format!("run not found: {}", id)))?;
        Ok(context.snapshot.clone())
    }

    /// Current state of a run, if it exists.
    pub fn state(&self, id: &str) -> Option<RunState> {
        self.runs.read().get(id).map(|context| context.state)
    }

    /// Store the mapping obtained for a run's snapshot.
    ///
    /// Allowed from `Scanned` (first mapping) and from `Mapped` (a retried
    /// preview overwrites the previous mapping). Rejected once applied.
    pub fn store_mapping(&self, id: &str, mapping: Vec<RenameEntry>) -> Result<(), ApiError> {
        let mut runs = self.runs.write();
        let context = runs
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(format!("run not found: {}", id)))?;
        match context.state {
            RunState::Scanned | RunState::Mapped => {
                context.mapping = Some(mapping);
                context.state = RunState::Mapped;
                Ok(())
            }
            RunState::Applied => Err(ApiError::InvalidState(format!(
                "run {} has already been applied",
                id
            ))),
        }
    }

    /// Consume the stored mapping for apply, transitioning to `Applied`.
    pub fn take_for_apply(&self, id: &str) -> Result<Vec<RenameEntry>, ApiError> {
        let mut runs = self.runs.write();
        let context = runs
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(format!("run not found: {}", id)))?;
        match context.state {
            RunState::Mapped => {
                context.state = RunState::Applied;
                // Mapped implies a stored mapping.
                context.mapping.take().ok_or_else(|| {
                    ApiError::InvalidState(format!("run {} has no stored mapping", id))
                })
            }
            RunState::Scanned => Err(ApiError::InvalidState(format!(
                "run {} has no mapping yet; request a preview first",
                id
            ))),
            RunState::Applied => Err(ApiError::InvalidState(format!(
                "run {} has already been applied",
                id
            ))),
        }
    }

    /// Tear down a run: drop its context (closing the per-run log).
    pub fn discard(&self, id: &str) -> Option<RunContext> {
        self.runs.write().remove(id)
    }

    /// Append a line to a run's log file, if the run has one.
    pub fn log(&self, id: &str, level: &str, message: &str) {
        let runs = self.runs.read();
        if let Some(log) = runs.get(id).and_then(|context| context.log.as_ref()) {
            log.append(level, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;

    fn snapshot(name: &str) -> TreeNode {
        TreeNode::dir(name, vec![TreeNode::leaf("file.txt")])
    }

    fn mapping(from: &str, to: &str) -> Vec<RenameEntry> {
        vec![RenameEntry {
            original: from.to_string(),
            new: to.to_string(),
        }]
    }

    #[test]
    fn create_starts_in_scanned() {
        let registry = RunRegistry::new();
        let id = registry.create(snapshot("ws"));
        assert_eq!(registry.state(&id), Some(RunState::Scanned));
        assert_eq!(registry.snapshot(&id).unwrap().name, "ws");
    }

    #[test]
    fn unknown_run_is_not_found() {
        let registry = RunRegistry::new();
        assert!(matches!(
            registry.snapshot("missing"),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            registry.store_mapping("missing", vec![]),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn apply_requires_a_stored_mapping() {
        let registry = RunRegistry::new();
        let id = registry.create(snapshot("ws"));
        assert!(matches!(
            registry.take_for_apply(&id),
            Err(ApiError::InvalidState(_))
        ));
        // State unchanged by the rejected apply.
        assert_eq!(registry.state(&id), Some(RunState::Scanned));
    }

    #[test]
    fn mapping_then_apply_consumes_the_run() {
        let registry = RunRegistry::new();
        let id = registry.create(snapshot("ws"));
        registry
            .store_mapping(&id, mapping("ws/file.txt", "ws/renamed.txt"))
            .unwrap();
        assert_eq!(registry.state(&id), Some(RunState::Mapped));

        let entries = registry.take_for_apply(&id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(registry.state(&id), Some(RunState::Applied));

        // A racing second apply is rejected.
        assert!(matches!(
            registry.take_for_apply(&id),
            Err(ApiError::InvalidState(_))
        ));

        registry.discard(&id);
        assert_eq!(registry.state(&id), None);
    }

    #[test]
    fn retried_preview_overwrites_the_mapping() {
        let registry = RunRegistry::new();
        let id = registry.create(snapshot("ws"));
        registry
            .store_mapping(&id, mapping("ws/a.txt", "ws/b.txt"))
            .unwrap();
        registry
            .store_mapping(&id, mapping("ws/a.txt", "ws/c.txt"))
            .unwrap();
        let entries = registry.take_for_apply(&id).unwrap();
        assert_eq!(entries[0].new, "ws/c.txt");
    }

    #[test]
    fn mapping_after_apply_is_rejected() {
        let registry = RunRegistry::new();
        let id = registry.create(snapshot("ws"));
        registry
            .store_mapping(&id, mapping("ws/a.txt", "ws/b.txt"))
            .unwrap();
        registry.take_for_apply(&id).unwrap();
        assert!(matches!(
            registry.store_mapping(&id, vec![]),
            Err(ApiError::InvalidState(_))
        ));
    }

    #[test]
    fn concurrent_runs_are_isolated() {
        let registry = RunRegistry::new();
        let first = registry.create(snapshot("alpha"));
        let second = registry.create(snapshot("beta"));
        assert_ne!(first, second);

        registry
            .store_mapping(&first, mapping("alpha/x", "alpha/y"))
            .unwrap();

        // The second run is untouched by the first run's mapping.
        assert_eq!(registry.state(&second), Some(RunState::Scanned));
        assert_eq!(registry.snapshot(&second).unwrap().name, "beta");

        let entries = registry.take_for_apply(&first).unwrap();
        assert_eq!(entries[0].original, "alpha/x");
        assert!(matches!(
            registry.take_for_apply(&second),
            Err(ApiError::InvalidState(_))
        ));
    }
}
