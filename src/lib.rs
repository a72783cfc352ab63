//! Renamegenie: LLM-assisted workspace renaming
//!
//! Scans a workspace into a deterministic tree snapshot, sends the flattened
//! listing plus a natural-language instruction to a remote mapping provider,
//! and applies the returned rename mapping to the filesystem deepest-first,
//! re-scanning afterwards to report ground truth.

pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod rename;
pub mod run;
pub mod service;
pub mod tooling;
pub mod tree;
