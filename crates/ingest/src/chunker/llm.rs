//! LLM-driven chunking: the model picks semantic boundaries and returns JSON.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chunkwise_llm::{CompletionOptions, LlmError, LlmProvider, Message};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::ChunkError;
use super::helpers::char_len;
use super::recursive::RecursiveChunker;
use super::strategy::TextChunker;
use super::types::{ChunkerConfig, Strategy};

/// Inputs longer than this (chars) are pre-split before prompting.
pub const LLM_CONTEXT_LIMIT: usize = 8000;

/// Pre-split pieces are packed to stay below this many chars.
const PRE_SPLIT_BUDGET: usize = 7000;

/// Overlap used by the recursive fallback when the provider fails.
const FALLBACK_OVERLAP: usize = 100;

const SYSTEM_PROMPT: &str = "You are a text segmentation expert who finds semantic boundaries \
in documents. Respond with JSON only and nothing else.";

static CONTENT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""content":\s*"([^"]*)""#).expect("valid content field regex")
});

#[derive(Deserialize)]
struct ChunkResponse {
    #[serde(default)]
    chunks: Vec<ChunkItem>,
}

#[derive(Deserialize)]
struct ChunkItem {
    content: String,
}

pub struct LlmChunker {
    provider: Arc<dyn LlmProvider>,
    target_chunk_size: usize,
    options: CompletionOptions,
    fallback: RecursiveChunker,
}

impl LlmChunker {
    /// Fails with `DegenerateConfig` when `target_chunk_size` cannot hold the
    /// fallback overlap.
    pub fn new(provider: Arc<dyn LlmProvider>, target_chunk_size: usize) -> Result<Self, ChunkError> {
        let fallback = RecursiveChunker::new(ChunkerConfig::new(target_chunk_size, FALLBACK_OVERLAP)?);
        Ok(Self {
            provider,
            target_chunk_size,
            options: CompletionOptions::default(),
            fallback,
        })
    }

    pub fn from_config(
        provider: Arc<dyn LlmProvider>,
        config: &chunkwise_core::config::LlmConfig,
    ) -> Result<Self, ChunkError> {
        Ok(Self::new(provider, config.target_chunk_size)?.with_options(CompletionOptions {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }))
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// The segmentation instructions sent as the user message.
    pub fn prompt(&self, text: &str) -> String {
        format!(
            r#"Split the following text into semantically complete chunks. Each chunk should:
1. contain one complete semantic unit (a whole idea or concept)
2. be roughly {size} characters long
3. keep its context coherent
4. end at a natural semantic boundary

Return the result as JSON in exactly this shape:
{{
    "chunks": [
        {{"id": 1, "content": "content of the first chunk", "summary": "short summary"}},
        {{"id": 2, "content": "content of the second chunk", "summary": "short summary"}}
    ]
}}

Text to split:
{text}
"#,
            size = self.target_chunk_size,
        )
    }

    pub async fn chunk(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        if char_len(text) <= LLM_CONTEXT_LIMIT {
            return self.chunk_piece(text).await;
        }

        let pieces = pre_split(text);
        debug!(pieces = pieces.len(), "pre-split oversized input for LLM chunking");
        let mut chunks = Vec::new();
        for piece in &pieces {
            chunks.extend(self.chunk_piece(piece).await?);
        }
        Ok(chunks)
    }

    async fn chunk_piece(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        let messages = [Message::system(SYSTEM_PROMPT), Message::user(self.prompt(text))];
        let response = match self.provider.complete(&messages, self.options).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    error = %e,
                    model = self.provider.model(),
                    "LLM chunking call failed, using recursive chunking for this piece"
                );
                return Ok(self.fallback.chunk(text));
            }
        };

        let chunks = parse_chunks(&response);
        if chunks.is_empty() {
            return Err(LlmError::ParseError("response contained no chunks".into()).into());
        }
        Ok(chunks)
    }
}

#[async_trait]
impl TextChunker for LlmChunker {
    fn strategy(&self) -> Strategy {
        Strategy::Llm
    }

    async fn chunk_text(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        self.chunk(text).await
    }
}

/// Chunk contents from a model response: strict JSON first (optionally inside a
/// code fence), otherwise every `"content": "..."` string found in the text.
fn parse_chunks(response: &str) -> Vec<String> {
    let body = strip_code_fence(response);
    let contents: Vec<String> = match serde_json::from_str::<ChunkResponse>(body) {
        Ok(parsed) => parsed.chunks.into_iter().map(|item| item.content).collect(),
        Err(e) => {
            debug!(error = %e, "LLM response is not valid JSON, scanning for content fields");
            CONTENT_FIELD
                .captures_iter(response)
                .map(|caps| caps[1].to_string())
                .collect()
        }
    };
    contents
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Pack blank-line-separated paragraphs into pieces below the pre-split budget.
fn pre_split(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for para in text.split("\n\n") {
        let para_len = char_len(para);
        if current_len + para_len < PRE_SPLIT_BUDGET {
            current.push_str(para);
            current.push_str("\n\n");
            current_len += para_len + 2;
            continue;
        }
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_string());
        }
        current = format!("{para}\n\n");
        current_len = para_len + 2;
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strict_json() {
        let response = r#"{"chunks": [{"id": 1, "content": "Alpha.", "summary": "a"}, {"id": 2, "content": " Beta. "}]}"#;
        assert_eq!(parse_chunks(response), vec!["Alpha.", "Beta."]);
    }

    #[test]
    fn parses_fenced_json() {
        let response = "```json\n{\"chunks\": [{\"content\": \"Fenced.\"}]}\n```";
        assert_eq!(parse_chunks(response), vec!["Fenced."]);
    }

    #[test]
    fn falls_back_to_content_scan() {
        let response = r#"Sure! chunks: {"content": "One."}, {"content": "Two."} (truncated"#;
        assert_eq!(parse_chunks(response), vec!["One.", "Two."]);
    }

    #[test]
    fn unparseable_response_yields_nothing() {
        assert!(parse_chunks("I cannot help with that.").is_empty());
    }

    #[test]
    fn pre_split_keeps_pieces_under_budget() {
        let para = "x".repeat(3000);
        let text = vec![para.as_str(); 5].join("\n\n");
        let pieces = pre_split(&text);
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| char_len(p) < PRE_SPLIT_BUDGET));
        assert_eq!(pieces.concat().len(), 15000 + 2 * 2);
    }
}
