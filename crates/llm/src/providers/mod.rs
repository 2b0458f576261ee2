pub mod ollama;
pub mod openai;

use std::sync::Arc;

use chunkwise_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("LLM_API_KEY not set".into()))?;
            Ok(Arc::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm_config.model.clone(),
                llm_config.base_url.clone(),
            )))
        }
        "ollama" => Ok(Arc::new(ollama::OllamaProvider::new(
            ollama_config.url.clone(),
            ollama_config.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_api_key() {
        let llm = LlmConfig::default();
        let err = create_provider(&llm, &OllamaConfig::default()).err().unwrap();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn ollama_uses_ollama_model() {
        let llm = LlmConfig {
            provider: "ollama".into(),
            ..LlmConfig::default()
        };
        let provider = create_provider(&llm, &OllamaConfig::default()).unwrap();
        assert_eq!(provider.model(), "llama3.2");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let llm = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..LlmConfig::default()
        };
        assert!(create_provider(&llm, &OllamaConfig::default()).is_err());
    }
}
