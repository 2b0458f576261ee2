//! Cheap syntactic classification of document shape.

use std::sync::LazyLock;

use regex::Regex;

use super::helpers::char_len;
use super::types::{DocType, Flavor};

static OUTLINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s").expect("valid outline marker regex"));

static TAG_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[1-6]>").expect("valid heading tag regex"));

static SENTENCE_TERMINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[。！？；;.!?]").expect("valid sentence terminal regex"));

/// Heading syntax present in `text`, preferring outline markers.
pub(crate) fn heading_flavor(text: &str) -> Option<Flavor> {
    if OUTLINE_MARKER.is_match(text) {
        Some(Flavor::Outline)
    } else if TAG_MARKER.is_match(text) {
        Some(Flavor::Tagged)
    } else {
        None
    }
}

/// Classifies text as structured, narrative or mixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentTypeDetector {
    narrative_threshold: f64,
}

impl DocumentTypeDetector {
    /// `narrative_threshold`: mean sentence length (chars) above which
    /// heading-free text counts as narrative.
    pub fn new(narrative_threshold: f64) -> Self {
        Self {
            narrative_threshold,
        }
    }

    pub fn narrative_threshold(&self) -> f64 {
        self.narrative_threshold
    }

    /// Never returns [`DocType::Auto`].
    pub fn detect(&self, text: &str) -> DocType {
        if heading_flavor(text).is_some() {
            return DocType::Structured;
        }
        match mean_sentence_len(text) {
            Some(mean) if mean > self.narrative_threshold => DocType::Narrative,
            _ => DocType::Mixed,
        }
    }
}

impl Default for DocumentTypeDetector {
    fn default() -> Self {
        Self::new(80.0)
    }
}

impl From<&chunkwise_core::config::RoutingConfig> for DocumentTypeDetector {
    fn from(config: &chunkwise_core::config::RoutingConfig) -> Self {
        Self::new(config.narrative_threshold)
    }
}

/// Sentences split on full-stop, exclamation, question and semicolon marks
/// (CJK and ASCII), trimmed, empties dropped.
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_TERMINAL
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Mean sentence length in chars; `None` when there are no sentences.
pub(crate) fn mean_sentence_len(text: &str) -> Option<f64> {
    let sentences = sentences(text);
    if sentences.is_empty() {
        return None;
    }
    let total: usize = sentences.iter().map(|s| char_len(s)).sum();
    Some(total as f64 / sentences.len() as f64)
}
