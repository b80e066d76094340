mod client;
pub(crate) mod types;

use async_trait::async_trait;

use crate::error::{AiError, Result};
use crate::traits::{GenerationBackend, Sampling};

use client::OpenAiClient;

// =============================================================================
// OpenAi Backend
// =============================================================================

/// OpenAI chat completions, or any server speaking the same wire format
/// (vLLM, Ollama, LM Studio) via [`OpenAi::with_base_url`].
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    pub(crate) fn request(&self, prompt: &str, sampling: &Sampling) -> types::ChatRequest {
        let request =
            types::ChatRequest::new(&self.model).message(types::WireMessage::user(prompt));

        if types::uses_max_completion_tokens(&self.model) {
            request.max_completion_tokens(sampling.max_tokens)
        } else {
            request
                .max_tokens(sampling.max_tokens)
                .temperature(sampling.temperature)
                .top_p(sampling.top_p)
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAi {
    async fn invoke(&self, prompt: &str, sampling: &Sampling) -> Result<String> {
        let request = self.request(prompt, sampling);
        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::EmptyResponse("OpenAI".into()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
