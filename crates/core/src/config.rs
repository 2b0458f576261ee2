use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ChunkwiseError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chunking: ChunkingConfig,
    pub structural: StructuralConfig,
    pub routing: RoutingConfig,
    pub semantic: SemanticConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CHUNKWISE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CHUNKWISE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            chunking: ChunkingConfig::from_env_profiled(p),
            structural: StructuralConfig::from_env_profiled(p),
            routing: RoutingConfig::from_env_profiled(p),
            semantic: SemanticConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            cache: CacheConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject size combinations the chunkers cannot honour.
    pub fn validate(&self) -> Result<(), ChunkwiseError> {
        if self.chunking.chunk_size == 0 {
            return Err(ChunkwiseError::InvalidConfig {
                key: "CHUNK_SIZE",
                reason: "must be greater than 0".into(),
            });
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(ChunkwiseError::InvalidConfig {
                key: "CHUNK_OVERLAP",
                reason: format!(
                    "{} must be smaller than CHUNK_SIZE ({})",
                    self.chunking.chunk_overlap, self.chunking.chunk_size
                ),
            });
        }
        if self.structural.min_chunk_size > self.structural.max_chunk_size {
            return Err(ChunkwiseError::InvalidConfig {
                key: "STRUCT_MIN_CHUNK_SIZE",
                reason: format!(
                    "{} exceeds STRUCT_MAX_CHUNK_SIZE ({})",
                    self.structural.min_chunk_size, self.structural.max_chunk_size
                ),
            });
        }
        if self.structural.overlap() >= self.structural.max_chunk_size {
            return Err(ChunkwiseError::InvalidConfig {
                key: "STRUCT_OVERLAP",
                reason: format!(
                    "{} must be smaller than STRUCT_MAX_CHUNK_SIZE ({})",
                    self.structural.overlap(),
                    self.structural.max_chunk_size
                ),
            });
        }
        if !(0.0..=100.0).contains(&self.semantic.breakpoint_percentile) {
            return Err(ChunkwiseError::InvalidConfig {
                key: "SEMANTIC_BREAKPOINT_PERCENTILE",
                reason: format!("{} is outside 0..=100", self.semantic.breakpoint_percentile),
            });
        }
        match self.routing.narrative_strategy.as_str() {
            "semantic" | "llm" | "none" => Ok(()),
            other => Err(ChunkwiseError::InvalidConfig {
                key: "NARRATIVE_STRATEGY",
                reason: format!("unknown strategy '{}'", other),
            }),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:    size={}, overlap={}",
            self.chunking.chunk_size,
            self.chunking.chunk_overlap
        );
        tracing::info!(
            "  structural:  min={}, max={}, overlap={}",
            self.structural.min_chunk_size,
            self.structural.max_chunk_size,
            self.structural.overlap()
        );
        tracing::info!(
            "  routing:     narrative_threshold={}, narrative_strategy={}",
            self.routing.narrative_threshold,
            self.routing.narrative_strategy
        );
        tracing::info!("  embedding:   provider={}, model={}", self.embedding.provider, self.embedding.model);
        tracing::info!("  llm:         provider={}, model={}", self.llm.provider, self.llm.model);
        tracing::info!("  cache:       capacity={}, batch_size={}", self.cache.capacity, self.cache.batch_size);
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "chunking": { "size": self.chunking.chunk_size, "overlap": self.chunking.chunk_overlap },
            "structural": {
                "min": self.structural.min_chunk_size,
                "max": self.structural.max_chunk_size,
                "overlap": self.structural.overlap(),
            },
            "routing": {
                "narrative_threshold": self.routing.narrative_threshold,
                "narrative_strategy": self.routing.narrative_strategy,
            },
            "semantic": {
                "breakpoint_percentile": self.semantic.breakpoint_percentile,
                "min_chunk_size": self.semantic.min_chunk_size,
                "buffer_size": self.semantic.buffer_size,
            },
            "embedding": {
                "provider": self.embedding.provider,
                "model": self.embedding.model,
                "dimensions": self.embedding.dimensions,
                "configured": self.embedding.is_configured(),
            },
            "llm": {
                "provider": self.llm.provider,
                "model": self.llm.model,
                "configured": self.llm.is_configured(),
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
            "cache": { "capacity": self.cache.capacity, "batch_size": self.cache.batch_size },
        })
    }
}

// ── Recursive chunking ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters of trailing context copied from the previous chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            chunk_size: profiled_env_parse(p, "CHUNK_SIZE", d.chunk_size),
            chunk_overlap: profiled_env_parse(p, "CHUNK_OVERLAP", d.chunk_overlap),
        }
    }
}

// ── Structural chunking ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralConfig {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
    /// Overlap used when oversized sections are split. Defaults to `min_chunk_size`.
    pub overlap: Option<usize>,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 2000,
            min_chunk_size: 100,
            overlap: None,
        }
    }
}

impl StructuralConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            max_chunk_size: profiled_env_parse(p, "STRUCT_MAX_CHUNK_SIZE", d.max_chunk_size),
            min_chunk_size: profiled_env_parse(p, "STRUCT_MIN_CHUNK_SIZE", d.min_chunk_size),
            overlap: profiled_env_opt(p, "STRUCT_OVERLAP").and_then(|v| v.parse().ok()),
        }
    }

    pub fn overlap(&self) -> usize {
        self.overlap.unwrap_or(self.min_chunk_size)
    }
}

// ── Routing (document type detection) ─────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Mean sentence length (chars) above which text counts as narrative.
    pub narrative_threshold: f64,
    /// "semantic", "llm" or "none"
    pub narrative_strategy: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            narrative_threshold: 80.0,
            narrative_strategy: "semantic".to_string(),
        }
    }
}

impl RoutingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            narrative_threshold: profiled_env_parse(p, "NARRATIVE_SENTENCE_THRESHOLD", d.narrative_threshold),
            narrative_strategy: profiled_env_or(p, "NARRATIVE_STRATEGY", &d.narrative_strategy)
                .to_lowercase(),
        }
    }
}

// ── Semantic chunking ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Percentile of sentence distances used as the breakpoint threshold.
    pub breakpoint_percentile: f64,
    /// Groups shorter than this (chars) are not closed at a breakpoint.
    pub min_chunk_size: usize,
    /// Neighbouring sentences embedded together with each sentence.
    pub buffer_size: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            breakpoint_percentile: 95.0,
            min_chunk_size: 50,
            buffer_size: 1,
        }
    }
}

impl SemanticConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            breakpoint_percentile: profiled_env_parse(p, "SEMANTIC_BREAKPOINT_PERCENTILE", d.breakpoint_percentile),
            min_chunk_size: profiled_env_parse(p, "SEMANTIC_MIN_CHUNK_SIZE", d.min_chunk_size),
            buffer_size: profiled_env_parse(p, "SEMANTIC_BUFFER_SIZE", d.buffer_size),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "openai" (any OpenAI-compatible endpoint) or "ollama"
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "BAAI/bge-m3".to_string(),
            base_url: "https://api.siliconflow.cn".to_string(),
            api_key: None,
            dimensions: 1024,
        }
    }
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", &d.provider).to_lowercase(),
            model: profiled_env_or(p, "EMBEDDING_MODEL", &d.model),
            base_url: profiled_env_or(p, "EMBEDDING_BASE_URL", &d.base_url),
            api_key: profiled_env_opt(p, "EMBEDDING_API_KEY"),
            dimensions: profiled_env_parse(p, "EMBEDDING_DIMENSIONS", d.dimensions),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── LLM (chat completions) ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" (any OpenAI-compatible endpoint) or "ollama"
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Chunk size (chars) the model is asked to aim for.
    pub target_chunk_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "deepseek-ai/DeepSeek-V3".to_string(),
            base_url: "https://api.siliconflow.cn".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 2048,
            target_chunk_size: 800,
        }
    }
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", &d.provider).to_lowercase(),
            model: profiled_env_or(p, "LLM_MODEL", &d.model),
            base_url: profiled_env_or(p, "LLM_BASE_URL", &d.base_url),
            api_key: profiled_env_opt(p, "LLM_API_KEY"),
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", d.temperature),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", d.max_tokens),
            target_chunk_size: profiled_env_parse(p, "LLM_TARGET_CHUNK_SIZE", d.target_chunk_size),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub embedding_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            embedding_model: "bge-m3".to_string(),
        }
    }
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", &d.url),
            model: profiled_env_or(p, "OLLAMA_MODEL", &d.model),
            embedding_model: profiled_env_or(p, "OLLAMA_EMBEDDING_MODEL", &d.embedding_model),
        }
    }
}

// ── Result cache / batching ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached documents; least recently used entries are evicted.
    pub capacity: usize,
    /// Documents chunked concurrently per batch.
    pub batch_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            batch_size: 10,
        }
    }
}

impl CacheConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            capacity: profiled_env_parse(p, "CHUNK_CACHE_CAPACITY", d.capacity),
            batch_size: profiled_env_parse(p, "CHUNK_BATCH_SIZE", d.batch_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.structural.overlap(), 100);
        assert_eq!(config.profile_label(), "default");
    }

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("CFGTEST_A_CHUNK_SIZE", "640");
        let config = Config::for_profile("cfgtest_a");
        assert_eq!(config.profile, "CFGTEST_A");
        assert_eq!(config.chunking.chunk_size, 640);
        env::remove_var("CFGTEST_A_CHUNK_SIZE");
    }

    #[test]
    fn unparsable_value_falls_back_to_default() {
        env::set_var("CFGTEST_B_STRUCT_MAX_CHUNK_SIZE", "lots");
        let config = Config::for_profile("CFGTEST_B");
        assert_eq!(config.structural.max_chunk_size, 2000);
        env::remove_var("CFGTEST_B_STRUCT_MAX_CHUNK_SIZE");
    }

    #[test]
    fn overlap_not_smaller_than_size_is_rejected() {
        let mut config = Config::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("CHUNK_OVERLAP"));
    }

    #[test]
    fn unknown_narrative_strategy_is_rejected() {
        let mut config = Config::default();
        config.routing.narrative_strategy = "magic".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn redacted_summary_hides_keys() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".into());
        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("sk-secret"));
        assert!(summary.contains("\"configured\":true"));
    }
}
