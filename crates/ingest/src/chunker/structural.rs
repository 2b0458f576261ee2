//! Heading-aware structural chunking: outline parsing plus rebalancing.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::detect::heading_flavor;
use super::error::ChunkError;
use super::rebalance::{RebalanceConfig, StructuralRebalancer};
use super::strategy::TextChunker;
use super::types::{Flavor, Section, Strategy};

static OUTLINE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid outline heading regex"));

static TAGGED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<h([1-6])>(.*?)</h[1-6]>").expect("valid tagged heading regex")
});

// ── Parser ──────────────────────────────────────────────────────────────────

/// Builds a flat, document-ordered outline of [`Section`]s from headings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralParser;

impl StructuralParser {
    pub fn parse(&self, text: &str, flavor: Flavor) -> Vec<Section> {
        match flavor {
            Flavor::Outline => self.parse_outline(text),
            Flavor::Tagged => self.parse_tagged(text),
        }
    }

    /// Sections from `#`-prefixed heading lines. Positions are line indices.
    ///
    /// A heading's content runs until the next heading line. Text before the
    /// first heading becomes an untitled level-0 section.
    pub fn parse_outline(&self, text: &str) -> Vec<Section> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut sections = Vec::new();
        let mut current: Option<Section> = None;
        let mut buffer: Vec<&str> = Vec::new();

        for (i, &line) in lines.iter().enumerate() {
            let Some(caps) = OUTLINE_HEADING.captures(line) else {
                buffer.push(line);
                continue;
            };
            close_outline_section(&mut sections, current.take(), &buffer, i);
            buffer.clear();
            current = Some(Section {
                level: caps[1].len(),
                title: caps[2].trim().to_string(),
                content: String::new(),
                start_pos: i,
                end_pos: i,
            });
        }
        close_outline_section(&mut sections, current, &buffer, lines.len());

        sections
    }

    /// Sections from `<hN>title</hN>` tags. Positions are byte offsets.
    ///
    /// Content between one heading tag and the next belongs to the first.
    /// Untagged leading text becomes an untitled level-0 section.
    pub fn parse_tagged(&self, text: &str) -> Vec<Section> {
        let headings: Vec<(usize, usize, usize, String)> = TAGGED_HEADING
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let level = usize::from(caps[1].as_bytes()[0] - b'0');
                Some((whole.start(), whole.end(), level, caps[2].trim().to_string()))
            })
            .collect();

        let mut sections = Vec::with_capacity(headings.len() + 1);
        let lead_end = headings.first().map_or(text.len(), |h| h.0);
        let lead = text[..lead_end].trim();
        if !lead.is_empty() {
            sections.push(Section {
                level: 0,
                title: String::new(),
                content: lead.to_string(),
                start_pos: 0,
                end_pos: lead_end,
            });
        }

        for (i, (start, end, level, title)) in headings.iter().enumerate() {
            let next_start = headings.get(i + 1).map_or(text.len(), |h| h.0);
            sections.push(Section {
                level: *level,
                title: title.clone(),
                content: text[*end..next_start].trim().to_string(),
                start_pos: *start,
                end_pos: next_start,
            });
        }

        sections
    }
}

fn close_outline_section(
    sections: &mut Vec<Section>,
    current: Option<Section>,
    buffer: &[&str],
    end_pos: usize,
) {
    let content = buffer.join("\n").trim().to_string();
    match current {
        Some(mut section) => {
            section.content = content;
            section.end_pos = end_pos;
            sections.push(section);
        }
        None if !content.is_empty() => sections.push(Section {
            level: 0,
            title: String::new(),
            content,
            start_pos: 0,
            end_pos,
        }),
        None => {}
    }
}

// ── Chunker ─────────────────────────────────────────────────────────────────

/// Parses headings, rebalances section sizes and renders one chunk per section.
#[derive(Debug, Clone, Default)]
pub struct StructuralChunker {
    parser: StructuralParser,
    rebalancer: StructuralRebalancer,
}

impl StructuralChunker {
    pub fn new(config: RebalanceConfig) -> Self {
        Self {
            parser: StructuralParser,
            rebalancer: StructuralRebalancer::new(config),
        }
    }

    pub fn config(&self) -> RebalanceConfig {
        self.rebalancer.config()
    }

    /// Rebalanced sections of `text`, in document order.
    pub fn sections(&self, text: &str, flavor: Flavor) -> Result<Vec<Section>, ChunkError> {
        let sections = self.parser.parse(text, flavor);
        self.rebalancer.rebalance(sections)
    }

    /// Chunk `text` section by section. Empty sections produce no chunk.
    pub fn chunk(&self, text: &str, flavor: Flavor) -> Result<Vec<String>, ChunkError> {
        Ok(self
            .sections(text, flavor)?
            .iter()
            .map(Section::render)
            .filter(|chunk| !chunk.is_empty())
            .collect())
    }

    /// Like [`chunk`](Self::chunk) with the flavor given by name
    /// (`outline`/`markdown` or `tagged`/`html`).
    pub fn chunk_labeled(&self, text: &str, flavor: &str) -> Result<Vec<String>, ChunkError> {
        let flavor: Flavor = flavor.parse()?;
        self.chunk(text, flavor)
    }
}

#[async_trait]
impl TextChunker for StructuralChunker {
    fn strategy(&self) -> Strategy {
        Strategy::Structural
    }

    async fn chunk_text(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        self.chunk(text, heading_flavor(text).unwrap_or(Flavor::Outline))
    }
}
