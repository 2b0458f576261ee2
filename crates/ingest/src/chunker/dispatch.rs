//! Routing documents to a chunking strategy by detected shape.

use std::sync::Arc;

use chunkwise_core::Config;
use tracing::{debug, warn};

use super::detect::{heading_flavor, DocumentTypeDetector};
use super::error::ChunkError;
use super::llm::LlmChunker;
use super::rebalance::RebalanceConfig;
use super::recursive::RecursiveChunker;
use super::semantic::SemanticChunker;
use super::strategy::TextChunker;
use super::structural::StructuralChunker;
use super::types::{ChunkOutcome, ChunkerConfig, DocType, Fallback, Flavor, Strategy};
use crate::embedding::create_embedder;

/// Picks a strategy per document and recovers from strategy failures.
///
/// Structured documents go through the structural chunker, narrative ones
/// through the configured narrative strategy (semantic or LLM), everything
/// else through the recursive chunker. A failing structural or narrative
/// strategy is replaced by recursive chunking and the replacement is recorded
/// in [`ChunkOutcome::fallback`].
pub struct AdaptiveChunker {
    detector: DocumentTypeDetector,
    recursive: RecursiveChunker,
    structural: StructuralChunker,
    narrative: Option<Arc<dyn TextChunker>>,
}

impl AdaptiveChunker {
    pub fn new(
        detector: DocumentTypeDetector,
        recursive: RecursiveChunker,
        structural: StructuralChunker,
    ) -> Self {
        Self {
            detector,
            recursive,
            structural,
            narrative: None,
        }
    }

    pub fn with_narrative(mut self, strategy: Arc<dyn TextChunker>) -> Self {
        self.narrative = Some(strategy);
        self
    }

    /// Engine configured from `config`, without a narrative strategy.
    ///
    /// Use [`narrative_from_config`] to build one; it needs provider access.
    pub fn from_config(config: &Config) -> Result<Self, ChunkError> {
        let recursive = RecursiveChunker::new(ChunkerConfig::try_from(&config.chunking)?);
        let structural = StructuralChunker::new(RebalanceConfig::try_from(&config.structural)?);
        Ok(Self::new(
            DocumentTypeDetector::from(&config.routing),
            recursive,
            structural,
        ))
    }

    pub fn detector(&self) -> &DocumentTypeDetector {
        &self.detector
    }

    pub fn recursive(&self) -> &RecursiveChunker {
        &self.recursive
    }

    pub fn structural(&self) -> &StructuralChunker {
        &self.structural
    }

    pub fn narrative(&self) -> Option<&Arc<dyn TextChunker>> {
        self.narrative.as_ref()
    }

    /// `doc_type` with `Auto` replaced by the detector's verdict.
    pub fn resolve(&self, text: &str, doc_type: DocType) -> DocType {
        match doc_type {
            DocType::Auto => self.detector.detect(text),
            other => other,
        }
    }

    /// Chunk `text` with the strategy for `doc_type`.
    ///
    /// Never fails: structural and narrative failures degrade to recursive
    /// chunking. Blank input yields no chunks.
    pub async fn adaptive_chunk(&self, text: &str, doc_type: DocType) -> ChunkOutcome {
        let doc_type = self.resolve(text, doc_type);
        if text.trim().is_empty() {
            return ChunkOutcome::new(Vec::new(), doc_type, Strategy::Recursive);
        }

        let outcome = match doc_type {
            DocType::Structured => {
                let flavor = heading_flavor(text).unwrap_or(Flavor::Outline);
                match self.structural.chunk(text, flavor) {
                    Ok(chunks) if !chunks.is_empty() => {
                        ChunkOutcome::new(chunks, doc_type, Strategy::Structural)
                    }
                    Ok(_) => self.fall_back(
                        text,
                        doc_type,
                        Strategy::Structural,
                        "structural parse produced no chunks".to_string(),
                    ),
                    Err(e) => self.fall_back(text, doc_type, Strategy::Structural, e.to_string()),
                }
            }
            DocType::Narrative => match &self.narrative {
                Some(strategy) => match strategy.chunk_text(text).await {
                    Ok(chunks) if !chunks.is_empty() => {
                        ChunkOutcome::new(chunks, doc_type, strategy.strategy())
                    }
                    Ok(_) => self.fall_back(
                        text,
                        doc_type,
                        strategy.strategy(),
                        format!("{} strategy produced no chunks", strategy.strategy()),
                    ),
                    Err(e) => self.fall_back(text, doc_type, strategy.strategy(), e.to_string()),
                },
                None => self.fall_back(
                    text,
                    doc_type,
                    Strategy::Semantic,
                    "no narrative strategy configured".to_string(),
                ),
            },
            DocType::Mixed | DocType::Auto => {
                ChunkOutcome::new(self.recursive.chunk(text), doc_type, Strategy::Recursive)
            }
        };

        debug!(
            doc_type = %outcome.doc_type,
            strategy = %outcome.strategy,
            chunks = outcome.chunks.len(),
            "document chunked"
        );
        outcome
    }

    /// Like [`adaptive_chunk`](Self::adaptive_chunk) with the document type
    /// given by name. Unrecognized names are chunked recursively as `mixed`.
    pub async fn adaptive_chunk_label(&self, text: &str, doc_type: &str) -> ChunkOutcome {
        match doc_type.parse::<DocType>() {
            Ok(doc_type) => self.adaptive_chunk(text, doc_type).await,
            Err(e) => {
                debug!(error = %e, "unrecognized document type, chunking recursively");
                self.adaptive_chunk(text, DocType::Mixed).await
            }
        }
    }

    fn fall_back(&self, text: &str, doc_type: DocType, from: Strategy, reason: String) -> ChunkOutcome {
        warn!(%doc_type, %from, %reason, "strategy failed, falling back to recursive chunking");
        ChunkOutcome {
            chunks: self.recursive.chunk(text),
            doc_type,
            strategy: Strategy::Recursive,
            fallback: Some(Fallback { from, reason }),
        }
    }
}

impl Default for AdaptiveChunker {
    fn default() -> Self {
        Self::new(
            DocumentTypeDetector::default(),
            RecursiveChunker::default(),
            StructuralChunker::default(),
        )
    }
}

/// The narrative strategy named by `routing.narrative_strategy`.
///
/// `semantic` needs a configured embedder, `llm` a configured chat provider;
/// `none` yields `Ok(None)`.
pub fn narrative_from_config(config: &Config) -> Result<Option<Arc<dyn TextChunker>>, ChunkError> {
    match config.routing.narrative_strategy.as_str() {
        "semantic" => {
            let embedder = create_embedder(&config.embedding, &config.ollama)?;
            let strategy: Arc<dyn TextChunker> =
                Arc::new(SemanticChunker::from_config(embedder, &config.semantic));
            Ok(Some(strategy))
        }
        "llm" => {
            let provider = chunkwise_llm::create_provider(&config.llm, &config.ollama)?;
            let strategy: Arc<dyn TextChunker> =
                Arc::new(LlmChunker::from_config(provider, &config.llm)?);
            Ok(Some(strategy))
        }
        "none" => Ok(None),
        other => Err(ChunkError::Strategy(format!(
            "unknown narrative strategy: '{other}'"
        ))),
    }
}
