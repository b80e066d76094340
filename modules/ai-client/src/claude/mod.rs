mod client;
pub(crate) mod types;

use async_trait::async_trait;

use crate::error::{AiError, Result};
use crate::traits::{GenerationBackend, Sampling};

use client::ClaudeClient;
use types::*;

// =============================================================================
// Claude Backend
// =============================================================================

#[derive(Clone)]
pub struct Claude {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl Claude {
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

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> ClaudeClient {
        let client = ClaudeClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Only `temperature` is sent: current Claude models reject requests
    /// that set both `temperature` and `top_p`.
    pub(crate) fn request(&self, prompt: &str, sampling: &Sampling) -> ChatRequest {
        ChatRequest::new(&self.model)
            .message(WireMessage::user(prompt))
            .max_tokens(sampling.max_tokens)
            .temperature(sampling.temperature)
    }
}

#[async_trait]
impl GenerationBackend for Claude {
    async fn invoke(&self, prompt: &str, sampling: &Sampling) -> Result<String> {
        let request = self.request(prompt, sampling);
        let response = self.client().chat(&request).await?;

        response
            .text()
            .ok_or_else(|| AiError::EmptyResponse("Claude".into()))
    }

    fn name(&self) -> &str {
        "claude"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_new() {
        let ai = Claude::new("sk-ant-test", "claude-haiku-4-5-20251001");
        assert_eq!(ai.model(), "claude-haiku-4-5-20251001");
        assert_eq!(ai.api_key, "sk-ant-test");
    }

    #[test]
    fn test_claude_with_base_url() {
        let ai = Claude::new("sk-ant-test", "claude-haiku-4-5-20251001")
            .with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
    }

    #[test]
    fn request_sends_temperature_without_top_p() {
        let ai = Claude::new("sk-ant-test", "claude-haiku-4-5-20251001");
        let sampling = Sampling {
            temperature: 0.3,
            top_p: 0.8,
            max_tokens: 256,
        };
        let json = serde_json::to_value(ai.request("hi", &sampling)).unwrap();

        assert_eq!(json["max_tokens"], 256);
        assert_eq!(json["messages"][0]["content"], "hi");
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!(json.get("top_p").is_none());
    }

    #[test]
    fn response_text_joins_text_blocks() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"question\":"},{"type":"text","text":"\"Q\"}"}]}"#,
        )
        .unwrap();
        assert_eq!(response.text().as_deref(), Some(r#"{"question":"Q"}"#));
    }

    #[test]
    fn response_without_text_is_none() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"content":[{"type":"thinking","thinking":"..."}]}"#).unwrap();
        assert!(response.text().is_none());
    }
}
