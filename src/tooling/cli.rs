//! CLI Tooling
//!
//! Thin presentation shell over the rename pipeline. The `run` command
//! drives one full scan -> preview -> apply sequence interactively; `scan`
//! prints a one-shot snapshot without touching the remote provider.

use crate::config::{AppConfig, ConfigLoader};
use crate::error::ApiError;
use crate::provider::OpenRouterClient;
use crate::rename::{RenameEntry, RenameResult, RenameStatus};
use crate::service::RenameService;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Renamegenie CLI - LLM-assisted workspace file renaming
#[derive(Parser)]
#[command(name = "renamegenie")]
#[command(about = "Rename workspace files and directories from a natural-language instruction")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (overrides configuration)
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Configuration file path (default: config.yaml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the workspace and print the snapshot
    Scan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run the full pipeline: scan, preview the mapping, confirm, apply
    Run {
        /// Rename instruction (prompted interactively when omitted)
        #[arg(long)]
        prompt: Option<String>,

        /// Apply the mapping without asking for confirmation
        #[arg(long)]
        yes: bool,
    },
}

/// Execution context carrying the resolved configuration.
pub struct CliContext {
    config: AppConfig,
}

impl CliContext {
    pub fn new(
        workspace: Option<PathBuf>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let mut config = ConfigLoader::load(config_path.as_deref())?;
        if let Some(workspace) = workspace {
            config.workspace_path = workspace;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Execute a command, returning its final output for printing.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Scan { format } => self.scan_snapshot(format),
            Commands::Run { prompt, yes } => self.run_pipeline(prompt.clone(), *yes),
        }
    }

    fn scan_snapshot(&self, format: &str) -> Result<String, ApiError> {
        let root = dunce::canonicalize(&self.config.workspace_path).map_err(|e| {
            ApiError::NotFound(format!(
                "workspace {} is not accessible: {}",
                self.config.workspace_path.display(),
                e
            ))
        })?;
        let tree = crate::tree::scan(&root, &self.config.ignore_set())?;
        match format {
            "json" => serde_json::to_string_pretty(&tree).map_err(|e| {
                ApiError::ConfigError(format!("failed to serialize snapshot: {}", e))
            }),
            _ => Ok(tree.render_text()),
        }
    }

    fn run_pipeline(&self, prompt: Option<String>, yes: bool) -> Result<String, ApiError> {
        let provider = OpenRouterClient::from_config(&self.config)?;
        let service = RenameService::new(self.config.clone(), Box::new(provider))?;

        let scan = service.scan()?;
        println!("Workspace snapshot:\n{}", scan.tree.render_text());

        let instruction = match prompt {
            Some(prompt) => prompt,
            None => Input::<String>::new()
                .with_prompt("Rename instruction")
                .interact_text()
                .map_err(|e| {
                    ApiError::ConfigError(format!("failed to read instruction: {}", e))
                })?,
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mapping = runtime.block_on(service.preview(&scan.run_id, &instruction))?;

        if mapping.is_empty() {
            service.registry().discard(&scan.run_id);
            return Ok("The provider proposed no renames; nothing to apply.".to_string());
        }
        println!("Proposed renames:\n{}", mapping_table(&mapping));

        let confirmed = yes
            || Confirm::new()
                .with_prompt("Apply these renames?")
                .default(false)
                .interact()
                .map_err(|e| {
                    ApiError::ConfigError(format!("failed to read confirmation: {}", e))
                })?;
        if !confirmed {
            service.registry().discard(&scan.run_id);
            return Ok("Aborted; no changes applied.".to_string());
        }

        let apply = service.apply(&scan.run_id)?;
        Ok(format!(
            "{}\nUpdated workspace:\n{}",
            results_table(&apply.results),
            apply.tree.render_text()
        ))
    }
}

fn mapping_table(entries: &[RenameEntry]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Original", "Proposed"]);
    for entry in entries {
        table.add_row(vec![entry.original.clone(), entry.new.clone()]);
    }
    table.to_string()
}

fn results_table(results: &[RenameResult]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Original", "New", "Status"]);
    for result in results {
        let status = match result.status {
            RenameStatus::Renamed => result.status.to_string().green().to_string(),
            RenameStatus::Skipped => result.status.to_string().yellow().to_string(),
            RenameStatus::Failed => format!(
                "{}: {}",
                "failed".red(),
                result.error.as_deref().unwrap_or("unknown error")
            ),
        };
        table.add_row(vec![result.original.clone(), result.new.clone(), status]);
    }
    table.to_string()
}
