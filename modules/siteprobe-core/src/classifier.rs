use std::sync::Arc;

use ai_client::{GenerationBackend, Sampling};
use serde::Deserialize;
use tracing::{info, warn};

use siteprobe_common::{AnswerTranscript, ContentRecord, IntentResult, Result};

use crate::parser;
use crate::prompts;

pub const CLASSIFY_SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    top_p: 0.9,
    max_tokens: 500,
};

/// The shape the backend is asked to return.
#[derive(Debug, Deserialize)]
struct Classification {
    user_intent: String,
    explanation: String,
}

/// Classifies a visitor's intent from page content and their answers.
pub struct ResultClassifier {
    backend: Arc<dyn GenerationBackend>,
}

impl ResultClassifier {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Fails only when the backend call itself fails; unusable output
    /// becomes [`IntentResult::unparsed`]. `session_id` is attached to the
    /// result when given.
    pub async fn classify(
        &self,
        content: &ContentRecord,
        transcript: &AnswerTranscript,
        session_id: Option<&str>,
    ) -> Result<IntentResult> {
        let prompt = prompts::classification_prompt(content, transcript);

        let raw = self.backend.invoke(&prompt, &CLASSIFY_SAMPLING).await?;

        let result = match parser::extract_json::<Classification>(&raw) {
            Some(c) => IntentResult::new(c.user_intent, c.explanation),
            None => {
                warn!(raw_len = raw.len(), "Unparseable classification response");
                IntentResult::unparsed()
            }
        };

        info!(
            backend = self.backend.name(),
            answers = transcript.len(),
            user_intent = result.user_intent.as_str(),
            "Visitor intent classified"
        );

        Ok(match session_id {
            Some(id) => result.with_session(id),
            None => result,
        })
    }
}
