//! Pipeline orchestration.
//!
//! [`RenameService`] owns the configuration, the run registry, and the
//! mapping provider, and drives one logical run through
//! scan -> preview -> apply. Scan and apply are synchronous filesystem work;
//! preview awaits the remote collaborator. Every stage runs inside a tracing
//! span carrying the run identifier and appends to the run's log file.

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::logging::RunLog;
use crate::provider::MappingProvider;
use crate::rename::{self, RenameEntry, RenameResult, RenameStatus};
use crate::run::{RunId, RunRegistry};
use crate::tree::{self, TreeNode};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn, Instrument};

/// Result of the scan stage.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub run_id: RunId,
    pub tree: TreeNode,
}

/// Result of the apply stage: per-entry results plus the post-apply
/// snapshot, so callers observe ground truth rather than the requested plan.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub results: Vec<RenameResult>,
    pub tree: TreeNode,
}

/// Orchestrates the scan -> preview -> apply pipeline.
pub struct RenameService {
    config: AppConfig,
    workspace: PathBuf,
    workspace_parent: PathBuf,
    registry: RunRegistry,
    provider: Box<dyn MappingProvider>,
}

impl RenameService {
    /// Build a service over a canonicalized workspace root.
    ///
    /// The workspace must exist and must have a parent directory: rename
    /// paths from the mapping resolve one level above the scanned root.
    pub fn new(config: AppConfig, provider: Box<dyn MappingProvider>) -> Result<Self, ApiError> {
        let workspace = dunce::canonicalize(&config.workspace_path).map_err(|e| {
            ApiError::NotFound(format!(
                "workspace {} is not accessible: {}",
                config.workspace_path.display(),
                e
            ))
        })?;
        let workspace_parent = workspace
            .parent()
            .ok_or_else(|| {
                ApiError::ConfigError(
                    "workspace root has no parent directory to resolve renames against"
                        .to_string(),
                )
            })?
            .to_path_buf();
        Ok(Self {
            config,
            workspace,
            workspace_parent,
            registry: RunRegistry::new(),
            provider,
        })
    }

    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Scan the workspace and register a fresh run.
    pub fn scan(&self) -> Result<ScanOutcome, ApiError> {
        let tree = tree::scan(&self.workspace, &self.config.ignore_set())?;
        let run_id = self.registry.create(tree.clone());
        let span = info_span!("run", run_id = %run_id);
        let _entered = span.enter();

        match RunLog::create(&self.config.logging.run_log_dir, &run_id) {
            Ok(log) => self.registry.attach_log(&run_id, log),
            Err(err) => warn!(error = %err, "could not create run log file"),
        }
        self.registry.log(
            &run_id,
            "INFO",
            &format!(
                "scanned workspace at {} ({} entries)",
                self.workspace.display(),
                tree.node_count()
            ),
        );
        info!(nodes = tree.node_count(), "scan complete");

        Ok(ScanOutcome { run_id, tree })
    }

    /// Request a rename mapping for a scanned run.
    ///
    /// On success the run advances to mapped; on a remote failure the run
    /// state is untouched, so the preview is safe to retry.
    pub async fn preview(
        &self,
        run_id: &str,
        instruction: &str,
    ) -> Result<Vec<RenameEntry>, ApiError> {
        let span = info_span!("run", run_id = %run_id);
        async move {
            let snapshot = self.registry.snapshot(run_id)?;
            let items = tree::flatten(&snapshot);
            self.registry.log(
                run_id,
                "INFO",
                &format!("requesting mapping for {} items", items.len()),
            );

            match self.provider.propose(&items, instruction).await {
                Ok(mapping) => {
                    self.registry.store_mapping(run_id, mapping.clone())?;
                    self.registry.log(
                        run_id,
                        "INFO",
                        &format!("mapping stored with {} entries", mapping.len()),
                    );
                    info!(entries = mapping.len(), "mapping generated");
                    Ok(mapping)
                }
                Err(err) => {
                    self.registry
                        .log(run_id, "ERROR", &format!("mapping request failed: {}", err));
                    warn!(error = %err, "mapping request failed; run remains retryable");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Apply the stored mapping for a run, re-scan, and tear the run down.
    pub fn apply(&self, run_id: &str) -> Result<ApplyOutcome, ApiError> {
        let span = info_span!("run", run_id = %run_id);
        let _entered = span.enter();

        let entries = self.registry.take_for_apply(run_id)?;
        self.registry.log(
            run_id,
            "INFO",
            &format!("applying {} rename entries", entries.len()),
        );

        let results = rename::apply(&entries, &self.workspace_parent);
        for result in &results {
            match result.status {
                RenameStatus::Renamed => self.registry.log(
                    run_id,
                    "INFO",
                    &format!("renamed: {} -> {}", result.original, result.new),
                ),
                RenameStatus::Skipped => self.registry.log(
                    run_id,
                    "WARN",
                    &format!("skipped (source missing): {}", result.original),
                ),
                RenameStatus::Failed => self.registry.log(
                    run_id,
                    "ERROR",
                    &format!(
                        "failed to rename {} -> {}: {}",
                        result.original,
                        result.new,
                        result.error.as_deref().unwrap_or("unknown error")
                    ),
                ),
            }
        }

        // The filesystem is already mutated at this point, so the run is
        // torn down whether or not the re-scan succeeds.
        let rescan = tree::scan(&self.workspace, &self.config.ignore_set());
        match &rescan {
            Ok(_) => {
                self.registry
                    .log(run_id, "INFO", "rename operation complete");
                info!(entries = results.len(), "apply complete");
            }
            Err(err) => {
                self.registry
                    .log(run_id, "ERROR", &format!("post-apply scan failed: {}", err));
                warn!(error = %err, "post-apply scan failed");
            }
        }
        self.registry.discard(run_id);

        Ok(ApplyOutcome {
            results,
            tree: rescan?,
        })
    }
}
