//! Embedding-similarity boundary detection.
//!
//! Sentences are embedded together with their neighbours; a boundary falls
//! wherever the cosine distance between consecutive windows exceeds a
//! percentile of all such distances.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::error::ChunkError;
use super::helpers::char_len;
use super::strategy::TextChunker;
use super::types::Strategy;
use crate::embedding::{Embedder, EmbeddingError};

static SENTENCE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[。！？.!?]+").expect("valid sentence split regex"));

pub struct SemanticChunker {
    embedder: Arc<dyn Embedder>,
    breakpoint_percentile: f64,
    min_chunk_size: usize,
    buffer_size: usize,
}

impl SemanticChunker {
    /// Defaults: 95th-percentile breakpoints, 50-char minimum groups, one
    /// neighbouring sentence on each side.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            breakpoint_percentile: 95.0,
            min_chunk_size: 50,
            buffer_size: 1,
        }
    }

    pub fn from_config(
        embedder: Arc<dyn Embedder>,
        config: &chunkwise_core::config::SemanticConfig,
    ) -> Self {
        Self {
            embedder,
            breakpoint_percentile: config.breakpoint_percentile.clamp(0.0, 100.0),
            min_chunk_size: config.min_chunk_size,
            buffer_size: config.buffer_size,
        }
    }

    pub fn with_breakpoint_percentile(mut self, percentile: f64) -> Self {
        self.breakpoint_percentile = percentile.clamp(0.0, 100.0);
        self
    }

    pub fn with_min_chunk_size(mut self, min_chunk_size: usize) -> Self {
        self.min_chunk_size = min_chunk_size;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub async fn chunk(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        let sentences = split_sentences(text);
        if sentences.len() <= 1 {
            return Ok(sentences);
        }

        let windows = combine_windows(&sentences, self.buffer_size);
        let window_refs: Vec<&str> = windows.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_batch(&window_refs).await?;
        if embeddings.len() != windows.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: windows.len(),
                actual: embeddings.len(),
            }
            .into());
        }

        let distances: Vec<f64> = embeddings
            .windows(2)
            .map(|pair| cosine_distance(&pair[0], &pair[1]))
            .collect();
        let threshold = percentile(&distances, self.breakpoint_percentile);

        let mut chunks = Vec::new();
        let mut start = 0;
        for (i, distance) in distances.iter().enumerate() {
            if *distance <= threshold {
                continue;
            }
            let group = sentences[start..=i].join(" ");
            if char_len(&group) < self.min_chunk_size {
                continue;
            }
            chunks.push(group);
            start = i + 1;
        }
        if start < sentences.len() {
            chunks.push(sentences[start..].join(" "));
        }

        debug!(
            sentences = sentences.len(),
            chunks = chunks.len(),
            threshold,
            "semantic boundaries computed"
        );
        Ok(chunks)
    }
}

#[async_trait]
impl TextChunker for SemanticChunker {
    fn strategy(&self) -> Strategy {
        Strategy::Semantic
    }

    async fn chunk_text(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        self.chunk(text).await
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Each sentence joined with up to `buffer` neighbours on either side.
fn combine_windows(sentences: &[String], buffer: usize) -> Vec<String> {
    (0..sentences.len())
        .map(|i| {
            let from = i.saturating_sub(buffer);
            let to = (i + buffer + 1).min(sentences.len());
            sentences[from..to].join(" ")
        })
        .collect()
}

/// `1 - cos(a, b)`; zero vectors are treated as maximally distant.
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Percentile with linear interpolation between closest ranks.
pub(crate) fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-9);
        assert!((percentile(&values, 95.0) - 3.85).abs() < 1e-9);
    }

    #[test]
    fn cosine_distance_of_parallel_and_orthogonal() {
        assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-9);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 3.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn windows_include_neighbours() {
        let sentences: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(combine_windows(&sentences, 1), vec!["a b", "a b c", "b c"]);
        assert_eq!(combine_windows(&sentences, 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn sentence_split_handles_cjk_and_runs() {
        let sentences = split_sentences("第一句。第二句！！Third one?! Fourth.");
        assert_eq!(sentences, vec!["第一句", "第二句", "Third one", "Fourth"]);
    }
}
