use std::fmt;

use serde::{Deserialize, Serialize};

// --- Page content ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Levels in the order headings are collected.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    pub fn tag(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
}

/// Normalized extraction of a rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRecord {
    pub title: String,
    pub meta_description: String,
    pub main_content: String,
    pub headings: Vec<Heading>,
}

impl ContentRecord {
    /// Heading texts joined with `", "`, in collection order.
    pub fn heading_list(&self) -> String {
        self.headings
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// --- Questions ---

/// Labels every structured option starts with, in order.
pub const OPTION_PREFIXES: [&str; 4] = ["A.", "B.", "C.", "D."];

/// One multiple-choice question. Four options on the structured path; fewer
/// when the options were recovered line by line from unstructured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub question: String,
    pub options: Vec<String>,
}

impl QuestionSpec {
    pub fn new(question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            question: question.into(),
            options,
        }
    }

    /// Static question used when nothing at all could be recovered.
    pub fn placeholder() -> Self {
        Self {
            question: "What are you looking for on this website?".to_string(),
            options: vec![
                "A. Products".to_string(),
                "B. Services".to_string(),
                "C. Information".to_string(),
                "D. Support".to_string(),
            ],
        }
    }
}

// --- Answers ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub selected_answer: String,
}

/// One entry per question answered, in the order asked.
pub type AnswerTranscript = Vec<AnswerEntry>;

// --- Classification ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    pub user_intent: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl IntentResult {
    pub fn new(user_intent: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            user_intent: user_intent.into(),
            explanation: explanation.into(),
            session_id: None,
        }
    }

    /// Result reported when the backend answered but nothing usable came back.
    pub fn unparsed() -> Self {
        Self::new("unknown", "Failed to parse response")
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

// --- Content profile ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WebsiteType {
    ECommerce,
    Educational,
    Informational,
    Service,
    Corporate,
    General,
}

impl fmt::Display for WebsiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WebsiteType::ECommerce => "e-commerce",
            WebsiteType::Educational => "educational",
            WebsiteType::Informational => "informational",
            WebsiteType::Service => "service",
            WebsiteType::Corporate => "corporate",
            WebsiteType::General => "general",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentProfile {
    pub website_type: WebsiteType,
    pub primary_categories: Vec<String>,
}

// --- Operation outputs ---

/// Output of question generation for one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub content: ContentRecord,
    pub questions: Vec<QuestionSpec>,
    pub analysis: ContentProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub results: IntentResult,
}
