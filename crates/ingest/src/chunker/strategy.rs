use async_trait::async_trait;

use super::error::ChunkError;
use super::types::Strategy;

/// A splitting strategy the dispatcher can route documents to.
///
/// Recursive and structural chunking are CPU-only and never suspend; the
/// semantic and LLM strategies await remote providers.
#[async_trait]
pub trait TextChunker: Send + Sync {
    /// Label reported in [`ChunkOutcome`](super::ChunkOutcome).
    fn strategy(&self) -> Strategy;

    /// Split `text` into ordered chunks.
    async fn chunk_text(&self, text: &str) -> Result<Vec<String>, ChunkError>;
}
