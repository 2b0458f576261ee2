//! Adaptive chunking engine.
//!
//! Splits documents into bounded-size chunks suitable for embedding,
//! dispatching strategy by detected document shape: structured (heading-aware,
//! with section rebalancing), narrative (embedding-similarity or LLM
//! boundaries) and mixed (separator-priority recursive splitting).

mod detect;
mod dispatch;
mod error;
mod helpers;
mod llm;
mod rebalance;
mod recursive;
mod semantic;
mod separator;
mod strategy;
mod structural;
mod types;

pub use detect::DocumentTypeDetector;
pub use dispatch::{narrative_from_config, AdaptiveChunker};
pub use error::ChunkError;
pub use llm::LlmChunker;
pub use rebalance::{RebalanceConfig, StructuralRebalancer};
pub use recursive::RecursiveChunker;
pub use semantic::SemanticChunker;
pub use separator::{split_on_separator, SeparatorPriority, DEFAULT_SEPARATORS};
pub use strategy::TextChunker;
pub use structural::{StructuralChunker, StructuralParser};
pub use types::{ChunkOutcome, ChunkerConfig, DocType, Fallback, Flavor, Section, Strategy};
