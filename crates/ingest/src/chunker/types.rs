//! Chunker configuration, section model and dispatcher outcome types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ChunkError;
use super::helpers::char_len;

// ── Configuration ───────────────────────────────────────────────────────────

/// Size budget for recursive chunking, in chars.
///
/// Construction enforces `target_size > 0` and `overlap < target_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkerConfig {
    target_size: usize,
    overlap: usize,
}

impl ChunkerConfig {
    pub fn new(target_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if target_size == 0 || overlap >= target_size {
            return Err(ChunkError::DegenerateConfig {
                target_size,
                overlap,
            });
        }
        Ok(Self {
            target_size,
            overlap,
        })
    }

    /// Maximum chars of material content per chunk (default: 500).
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Chars of trailing context copied from the previous chunk (default: 100).
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            target_size: 500,
            overlap: 100,
        }
    }
}

impl TryFrom<&chunkwise_core::config::ChunkingConfig> for ChunkerConfig {
    type Error = ChunkError;

    fn try_from(config: &chunkwise_core::config::ChunkingConfig) -> Result<Self, Self::Error> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }
}

// ── Sections ────────────────────────────────────────────────────────────────

/// A titled (or, at level 0, untitled) span of a structured document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading depth; 0 for content before the first heading.
    pub level: usize,
    pub title: String,
    pub content: String,
    /// Line index (outline flavor) or byte offset (tagged flavor) where the section starts.
    pub start_pos: usize,
    /// Exclusive end, in the same unit as `start_pos`.
    pub end_pos: usize,
}

impl Section {
    /// Title plus content length in chars.
    pub fn size(&self) -> usize {
        char_len(&self.title) + char_len(&self.content)
    }

    /// The chunk text emitted for this section.
    pub fn render(&self) -> String {
        if self.title.is_empty() {
            self.content.trim().to_string()
        } else {
            format!("{}\n{}", self.title, self.content).trim().to_string()
        }
    }
}

// ── Labels ──────────────────────────────────────────────────────────────────

/// Document shape used for routing. `Auto` asks the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Auto,
    Structured,
    Narrative,
    Mixed,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Auto => "auto",
            DocType::Structured => "structured",
            DocType::Narrative => "narrative",
            DocType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(DocType::Auto),
            "structured" => Ok(DocType::Structured),
            "narrative" => Ok(DocType::Narrative),
            "mixed" => Ok(DocType::Mixed),
            other => Err(ChunkError::UnsupportedDocType(other.to_string())),
        }
    }
}

/// Heading syntax of a structured document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// `#`-prefixed heading lines (markdown).
    Outline,
    /// `<h1>`..`<h6>` heading tags (html).
    Tagged,
}

impl FromStr for Flavor {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "outline" | "markdown" | "md" => Ok(Flavor::Outline),
            "tagged" | "html" => Ok(Flavor::Tagged),
            other => Err(ChunkError::UnsupportedDocType(other.to_string())),
        }
    }
}

/// Which splitting strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Structural,
    Recursive,
    Semantic,
    Llm,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Structural => "structural",
            Strategy::Recursive => "recursive",
            Strategy::Semantic => "semantic",
            Strategy::Llm => "llm",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Outcome ─────────────────────────────────────────────────────────────────

/// A strategy that failed and was replaced by recursive chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fallback {
    pub from: Strategy,
    pub reason: String,
}

/// Chunks plus the routing decisions that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkOutcome {
    pub chunks: Vec<String>,
    /// Resolved document type (never `Auto`).
    pub doc_type: DocType,
    /// Strategy whose output is in `chunks`.
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

impl ChunkOutcome {
    pub fn new(chunks: Vec<String>, doc_type: DocType, strategy: Strategy) -> Self {
        Self {
            chunks,
            doc_type,
            strategy,
            fallback: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}
