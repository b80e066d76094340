use async_trait::async_trait;

use crate::error::Result;

// =============================================================================
// Sampling
// =============================================================================

/// Decoding parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 500,
        }
    }
}

// =============================================================================
// GenerationBackend Trait
// =============================================================================

/// A text-generation service: prompt in, free-form text out.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn invoke(&self, prompt: &str, sampling: &Sampling) -> Result<String>;
    fn name(&self) -> &str;
}
