pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use chunkwise_core::config::{EmbeddingConfig, OllamaConfig};

pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

/// Create the embedding backend named by `embedding.provider`.
pub fn create_embedder(
    embedding: &EmbeddingConfig,
    ollama: &OllamaConfig,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match embedding.provider.as_str() {
        "openai" => {
            let api_key = embedding
                .api_key
                .as_ref()
                .ok_or_else(|| EmbeddingError::NotConfigured("EMBEDDING_API_KEY not set".into()))?;
            Ok(Arc::new(OpenAiEmbedder::new(
                api_key.clone(),
                embedding.model.clone(),
                Some(embedding.base_url.clone()),
                embedding.dimensions,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            ollama.url.clone(),
            ollama.embedding_model.clone(),
            embedding.dimensions,
        ))),
        other => Err(EmbeddingError::NotConfigured(format!(
            "unknown embedding provider: '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_api_key() {
        let err = create_embedder(&EmbeddingConfig::default(), &OllamaConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, EmbeddingError::NotConfigured(_)));
    }

    #[test]
    fn ollama_reports_configured_dimensions() {
        let embedding = EmbeddingConfig {
            provider: "ollama".into(),
            dimensions: 768,
            ..EmbeddingConfig::default()
        };
        let embedder = create_embedder(&embedding, &OllamaConfig::default()).unwrap();
        assert_eq!(embedder.dimensions(), 768);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let embedding = EmbeddingConfig {
            provider: "onnx".into(),
            ..EmbeddingConfig::default()
        };
        let err = create_embedder(&embedding, &OllamaConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("onnx"));
    }
}
