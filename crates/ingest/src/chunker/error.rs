use chunkwise_llm::LlmError;
use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("Unsupported document type: {0}")]
    UnsupportedDocType(String),

    #[error(
        "Degenerate chunker config: target_size={target_size}, overlap={overlap} \
         (need target_size > 0 and overlap < target_size)"
    )]
    DegenerateConfig { target_size: usize, overlap: usize },

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("LLM chunking failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Strategy failed: {0}")]
    Strategy(String),
}
