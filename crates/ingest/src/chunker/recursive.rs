//! Separator-priority recursive chunking.

use async_trait::async_trait;

use super::error::ChunkError;
use super::helpers::{add_overlap, char_len, slice_chars};
use super::separator::{split_on_separator, SeparatorPriority};
use super::strategy::TextChunker;
use super::types::{ChunkerConfig, Strategy};

/// Splits text on the highest-priority separator that subdivides it,
/// recursing into oversized pieces, then packs pieces back up to
/// `target_size` and adds trailing-context overlap.
#[derive(Debug, Clone, Default)]
pub struct RecursiveChunker {
    config: ChunkerConfig,
    separators: SeparatorPriority,
}

impl RecursiveChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self {
            config,
            separators: SeparatorPriority::default(),
        }
    }

    pub fn with_separators(mut self, separators: SeparatorPriority) -> Self {
        self.separators = separators;
        self
    }

    pub fn config(&self) -> ChunkerConfig {
        self.config
    }

    /// Chunk `text`. Each chunk carries at most `target_size` chars of its own
    /// material plus up to `overlap` chars copied from the previous chunk.
    /// Blank input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let pieces: Vec<String> = self
            .split_recursive(text)
            .into_iter()
            .map(|piece| piece.trim().to_string())
            .filter(|piece| !piece.is_empty())
            .collect();
        add_overlap(pieces, self.config.overlap())
    }

    fn split_recursive(&self, text: &str) -> Vec<String> {
        let target = self.config.target_size();
        if char_len(text) <= target {
            return vec![text.to_string()];
        }

        for separator in self.separators.iter() {
            let splits = split_on_separator(text, separator);
            if splits.len() > 1 {
                let pieces = splits
                    .iter()
                    .flat_map(|split| self.split_recursive(split))
                    .collect();
                return self.merge(pieces);
            }
        }

        // No separator subdivided the text: fall back to fixed-width slices.
        slice_chars(text, target)
    }

    /// Pack pieces in order into chunks of at most `target_size` chars.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let target = self.config.target_size();
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for piece in pieces {
            let piece_len = char_len(&piece);
            if current_len + piece_len <= target {
                current.push_str(&piece);
                current_len += piece_len;
                continue;
            }

            flush(&mut chunks, &mut current);
            if piece_len <= target {
                current = piece;
                current_len = piece_len;
            } else {
                let mut sub_chunks = self.split_recursive(&piece);
                let last = sub_chunks.pop().unwrap_or_default();
                chunks.extend(sub_chunks);
                current_len = char_len(&last);
                current = last;
            }
        }
        flush(&mut chunks, &mut current);

        chunks
    }
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

#[async_trait]
impl TextChunker for RecursiveChunker {
    fn strategy(&self) -> Strategy {
        Strategy::Recursive
    }

    async fn chunk_text(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        Ok(self.chunk(text))
    }
}
