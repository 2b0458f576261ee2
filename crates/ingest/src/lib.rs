//! Document chunking for retrieval pipelines.
//!
//! The [`chunker`] module holds the engine: separator-driven recursive
//! splitting, heading-aware structural splitting with size rebalancing,
//! document-type detection and the adaptive dispatcher. [`embedding`] and the
//! LLM providers from `chunkwise-llm` back the semantic and LLM strategies;
//! [`cache`] and [`batch`] wrap the dispatcher for multi-document workloads.

pub mod batch;
pub mod cache;
pub mod chunker;
pub mod embedding;

pub use batch::BatchChunker;
pub use cache::ChunkCache;
pub use chunker::{
    narrative_from_config, AdaptiveChunker, ChunkError, ChunkOutcome, ChunkerConfig, DocType, DocumentTypeDetector,
    Fallback, Flavor, LlmChunker, RebalanceConfig, RecursiveChunker, Section, SemanticChunker,
    SeparatorPriority, Strategy, StructuralChunker, StructuralParser, StructuralRebalancer,
    TextChunker,
};
pub use embedding::{create_embedder, Embedder, EmbeddingError};
