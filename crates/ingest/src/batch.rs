//! Multi-document chunking with an optional shared result cache.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::ChunkCache;
use crate::chunker::{AdaptiveChunker, ChunkOutcome, DocType};

/// Chunks documents in fixed-size batches; documents within a batch run
/// concurrently. Results come back in input order.
pub struct BatchChunker {
    chunker: Arc<AdaptiveChunker>,
    cache: Option<Arc<Mutex<ChunkCache>>>,
    batch_size: usize,
}

impl BatchChunker {
    pub fn new(chunker: Arc<AdaptiveChunker>) -> Self {
        Self {
            chunker,
            cache: None,
            batch_size: 10,
        }
    }

    pub fn with_cache(mut self, cache: Arc<Mutex<ChunkCache>>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// A zero `batch_size` is raised to 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn cache(&self) -> Option<&Arc<Mutex<ChunkCache>>> {
        self.cache.as_ref()
    }

    /// Chunk one document, consulting the cache first when there is one.
    pub async fn chunk_document(&self, text: &str, doc_type: DocType) -> ChunkOutcome {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lock().await.get(text, doc_type) {
                debug!(doc_type = %doc_type, "chunk cache hit");
                return hit;
            }
        }

        let outcome = self.chunker.adaptive_chunk(text, doc_type).await;

        if let Some(cache) = &self.cache {
            cache.lock().await.put(text, doc_type, outcome.clone());
        }
        outcome
    }

    pub async fn chunk_documents(&self, documents: &[String], doc_type: DocType) -> Vec<ChunkOutcome> {
        let mut outcomes = Vec::with_capacity(documents.len());

        for (batch_no, batch) in documents.chunks(self.batch_size).enumerate() {
            let futures: Vec<_> = batch
                .iter()
                .map(|text| self.chunk_document(text, doc_type))
                .collect();
            let results = join_all(futures).await;
            debug!(batch = batch_no, documents = results.len(), "batch chunked");
            outcomes.extend(results);
        }

        let fallbacks = outcomes.iter().filter(|o| o.is_fallback()).count();
        info!(
            documents = documents.len(),
            fallbacks,
            "batch chunking complete"
        );
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Strategy;

    fn documents() -> Vec<String> {
        vec![
            "# Title\n\nBody text.".to_string(),
            "short mixed text".to_string(),
            String::new(),
            "## Second\nMore body.".to_string(),
        ]
    }

    #[tokio::test]
    async fn preserves_input_order_across_batches() {
        let batcher = BatchChunker::new(Arc::new(AdaptiveChunker::default())).with_batch_size(3);

        let outcomes = batcher.chunk_documents(&documents(), DocType::Auto).await;

        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0].chunks, vec!["Title\nBody text."]);
        assert_eq!(outcomes[0].strategy, Strategy::Structural);
        assert_eq!(outcomes[1].chunks, vec!["short mixed text"]);
        assert!(outcomes[2].chunks.is_empty());
        assert_eq!(outcomes[3].chunks, vec!["Second\nMore body."]);
    }

    #[tokio::test]
    async fn repeated_documents_hit_the_cache() {
        let cache = Arc::new(Mutex::new(ChunkCache::new(16)));
        let batcher = BatchChunker::new(Arc::new(AdaptiveChunker::default()))
            .with_cache(cache.clone());

        let docs = vec!["alpha beta".to_string()];
        let first = batcher.chunk_documents(&docs, DocType::Auto).await;
        let second = batcher.chunk_documents(&docs, DocType::Auto).await;

        assert_eq!(first, second);
        let cache = cache.lock().await;
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[tokio::test]
    async fn zero_batch_size_is_clamped() {
        let batcher = BatchChunker::new(Arc::new(AdaptiveChunker::default())).with_batch_size(0);
        assert_eq!(batcher.batch_size(), 1);
        let outcomes = batcher.chunk_documents(&documents(), DocType::Mixed).await;
        assert_eq!(outcomes.len(), 4);
    }
}
