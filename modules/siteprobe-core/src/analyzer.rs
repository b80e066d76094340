use std::sync::Arc;

use tracing::info;

use siteprobe_common::{
    AnswerEntry, AnswerTranscript, ClassificationOutcome, ContentRecord, ProbeError, QuestionSet,
    QuestionSpec, Result,
};

use crate::classifier::ResultClassifier;
use crate::extractor::PageExtractor;
use crate::profile;
use crate::question::QuestionGenerator;
use crate::store::{QuestionCache, SessionStore};

/// The two operations the route layer calls: question generation for a URL
/// and intent classification of the answers.
pub struct Analyzer {
    extractor: PageExtractor,
    generator: QuestionGenerator,
    classifier: ResultClassifier,
    sessions: Arc<dyn SessionStore>,
    cache: Option<Arc<dyn QuestionCache>>,
}

impl Analyzer {
    pub fn new(
        extractor: PageExtractor,
        generator: QuestionGenerator,
        classifier: ResultClassifier,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            extractor,
            generator,
            classifier,
            sessions,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn QuestionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Scrape `url` and derive the question(s) to put to the visitor. A
    /// cached question set for the URL skips generation; the page is
    /// scraped regardless since classification needs its content.
    pub async fn generate_question(&self, url: &str) -> Result<QuestionSet> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ProbeError::InvalidRequest("URL is required".into()));
        }

        let content = self.extractor.extract(url).await?;
        let analysis = profile::profile(&content);

        if let Some(cache) = &self.cache {
            if let Some(questions) = cache.get(url).await? {
                info!(url, questions = questions.len(), "Using cached questions");
                return Ok(QuestionSet {
                    content,
                    questions,
                    analysis,
                });
            }
        }

        let spec = self.generator.generate(&content).await?;
        let questions = vec![spec];

        if let Some(cache) = &self.cache {
            cache.put(url, questions.clone()).await?;
        }

        info!(
            url,
            website_type = %analysis.website_type,
            options = questions[0].options.len(),
            "Question set ready"
        );
        Ok(QuestionSet {
            content,
            questions,
            analysis,
        })
    }

    /// Record the visitor's answers and classify their intent. Answers pair
    /// with questions by position; whichever list is longer is cut short.
    pub async fn classify_results(
        &self,
        content: &ContentRecord,
        questions: &[QuestionSpec],
        answers: &[String],
        session_id: Option<String>,
    ) -> Result<ClassificationOutcome> {
        let transcript = build_transcript(questions, answers);

        let session_id = self.sessions.put(transcript.clone(), session_id).await?;
        info!(
            session_id = session_id.as_str(),
            answers = transcript.len(),
            "Transcript recorded"
        );

        let results = self
            .classifier
            .classify(content, &transcript, Some(&session_id))
            .await?;

        Ok(ClassificationOutcome { results })
    }

    /// Classify a transcript recorded earlier under `session_id`.
    pub async fn classify_session(
        &self,
        content: &ContentRecord,
        session_id: &str,
    ) -> Result<ClassificationOutcome> {
        let transcript = self.sessions.get(session_id).await?;

        let results = self
            .classifier
            .classify(content, &transcript, Some(session_id))
            .await?;

        Ok(ClassificationOutcome { results })
    }
}

/// Pair questions with the selected answers. The selection is not checked
/// against the offered options.
pub fn build_transcript(questions: &[QuestionSpec], answers: &[String]) -> AnswerTranscript {
    questions
        .iter()
        .zip(answers)
        .map(|(q, a)| AnswerEntry {
            question: q.question.clone(),
            options: q.options.clone(),
            selected_answer: a.clone(),
        })
        .collect()
}
