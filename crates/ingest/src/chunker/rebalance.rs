//! Merging undersized sections and splitting oversized ones.

use tracing::debug;

use super::error::ChunkError;
use super::helpers::{char_len, head_chars};
use super::recursive::RecursiveChunker;
use super::types::{ChunkerConfig, Section};

const PART_SUFFIX: &str = "_part_";

/// Size bounds for structural sections, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceConfig {
    min_size: usize,
    max_size: usize,
    overlap: usize,
}

impl RebalanceConfig {
    /// Bounds with `overlap` defaulting to `min_size`.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self, ChunkError> {
        Self::validated(min_size, max_size, min_size)
    }

    /// Override the overlap used when oversized sections are split.
    pub fn with_overlap(self, overlap: usize) -> Result<Self, ChunkError> {
        Self::validated(self.min_size, self.max_size, overlap)
    }

    fn validated(min_size: usize, max_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if max_size == 0 || overlap >= max_size || min_size > max_size {
            return Err(ChunkError::DegenerateConfig {
                target_size: max_size,
                overlap,
            });
        }
        Ok(Self {
            min_size,
            max_size,
            overlap,
        })
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            min_size: 100,
            max_size: 2000,
            overlap: 100,
        }
    }
}

impl TryFrom<&chunkwise_core::config::StructuralConfig> for RebalanceConfig {
    type Error = ChunkError;

    fn try_from(config: &chunkwise_core::config::StructuralConfig) -> Result<Self, Self::Error> {
        Self::new(config.min_chunk_size, config.max_chunk_size)?.with_overlap(config.overlap())
    }
}

/// Evens out section sizes while keeping document order.
#[derive(Debug, Clone, Default)]
pub struct StructuralRebalancer {
    config: RebalanceConfig,
}

impl StructuralRebalancer {
    pub fn new(config: RebalanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RebalanceConfig {
        self.config
    }

    /// Merge runs of adjacent undersized sections and split oversized ones.
    ///
    /// Undersized sections accumulate into a pending buffer that is flushed by
    /// the next section that is not undersized, by the end of input, or when
    /// appending would push it over `max_size`. Oversized sections become
    /// `{title}_part_{n}` sections sharing the original level and positions.
    pub fn rebalance(&self, sections: Vec<Section>) -> Result<Vec<Section>, ChunkError> {
        let mut balanced = Vec::with_capacity(sections.len());
        let mut pending: Option<Section> = None;

        for section in sections {
            let size = section.size();

            if size < self.config.min_size {
                pending = Some(match pending.take() {
                    None => section,
                    Some(buffer) => self.absorb(buffer, section, &mut balanced),
                });
                continue;
            }

            if let Some(buffer) = pending.take() {
                balanced.push(buffer);
            }

            if size > self.config.max_size {
                balanced.extend(self.split(&section)?);
            } else {
                balanced.push(section);
            }
        }

        if let Some(buffer) = pending {
            balanced.push(buffer);
        }

        Ok(balanced)
    }

    /// Append `next` to the merge buffer, flushing the buffer first if the
    /// result would exceed `max_size`. Returns the new buffer.
    fn absorb(&self, mut buffer: Section, next: Section, out: &mut Vec<Section>) -> Section {
        let addition = if next.title.is_empty() {
            format!("\n\n{}", next.content)
        } else {
            format!("\n\n{}\n{}", next.title, next.content)
        };
        if buffer.size() + char_len(&addition) > self.config.max_size {
            out.push(buffer);
            return next;
        }
        buffer.content.push_str(&addition);
        buffer.end_pos = next.end_pos;
        buffer
    }

    /// Split an oversized section into parts of at most `max_size` chars,
    /// title included.
    ///
    /// Room left after the part title is shared between target and overlap;
    /// the overlap shrinks (down to zero) when the room is tight. A title that
    /// leaves no room at all is cut to half of `max_size`.
    fn split(&self, section: &Section) -> Result<Vec<Section>, ChunkError> {
        let full_text = format!("{}\n{}", section.title, section.content);
        let max_size = self.config.max_size;

        // Every part index is at most the char count.
        let suffix_len = PART_SUFFIX.len() + char_len(&full_text).to_string().len();
        let mut title = section.title.as_str();
        if char_len(title) + suffix_len >= max_size {
            title = head_chars(title, (max_size / 2).saturating_sub(suffix_len));
        }
        let title_room = (char_len(title) + suffix_len).min(max_size - 1);
        let room = max_size - title_room;
        let overlap = self.config.overlap.min((room - 1) / 2);
        let target = room - overlap;

        debug!(
            title = %section.title,
            size = section.size(),
            target,
            overlap,
            "splitting oversized section"
        );

        let chunker = RecursiveChunker::new(ChunkerConfig::new(target, overlap)?);
        Ok(chunker
            .chunk(&full_text)
            .into_iter()
            .enumerate()
            .map(|(i, content)| Section {
                level: section.level,
                title: head_chars(&format!("{title}{PART_SUFFIX}{}", i + 1), title_room)
                    .to_string(),
                content,
                start_pos: section.start_pos,
                end_pos: section.end_pos,
            })
            .collect())
    }
}
