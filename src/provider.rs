//! Remote mapping collaborator.
//!
//! The pipeline treats the language model as an opaque async function from
//! (flattened item list, instruction) to a rename mapping. The trait seam
//! lets the service be exercised with a stub in tests; the production
//! implementation talks to an OpenRouter-compatible chat-completions API.

pub mod openrouter;

pub use openrouter::OpenRouterClient;

use crate::error::ApiError;
use crate::rename::RenameEntry;
use crate::tree::FlatItem;
use async_trait::async_trait;

/// External collaborator that proposes a rename mapping.
#[async_trait]
pub trait MappingProvider: Send + Sync {
    /// Propose renames for `items` following the free-form `instruction`.
    async fn propose(
        &self,
        items: &[FlatItem],
        instruction: &str,
    ) -> Result<Vec<RenameEntry>, ApiError>;
}
