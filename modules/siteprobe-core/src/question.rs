use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ai_client::{GenerationBackend, Sampling};
use tracing::{info, warn};

use siteprobe_common::{ContentRecord, QuestionSpec, Result};

use crate::parser;
use crate::prompts;

/// Sampling for question generation: moderate temperature for stable
/// category labels, enough tokens for one question and four short options.
pub const QUESTION_SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    top_p: 0.9,
    max_tokens: 500,
};

/// Derives one multiple-choice question from page content.
pub struct QuestionGenerator {
    backend: Arc<dyn GenerationBackend>,
}

impl QuestionGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Fails only when the backend call itself fails. Whatever text comes
    /// back is turned into a question.
    pub async fn generate(&self, content: &ContentRecord) -> Result<QuestionSpec> {
        let prompt = prompts::question_prompt(content);

        let raw = self.backend.invoke(&prompt, &QUESTION_SAMPLING).await?;

        info!(
            backend = self.backend.name(),
            response_len = raw.len(),
            "Question generated"
        );

        let spec = panic::catch_unwind(AssertUnwindSafe(|| parser::parse_question(&raw)))
            .unwrap_or_else(|_| {
                warn!("Question parser panicked, using placeholder question");
                QuestionSpec::placeholder()
            });

        Ok(spec)
    }
}
