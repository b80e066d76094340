use siteprobe_common::{AnswerTranscript, ContentRecord};

/// Main content beyond this many characters is never sent to the backend.
pub const MAIN_CONTENT_LIMIT: usize = 1000;

const QUESTION_INSTRUCTIONS: &str = r#"Analyze the following website content and create a single multiple-choice question to identify the visitor's intent.

Produce exactly one multiple-choice question with four options representing the site's main content categories."#;

const QUESTION_FORMAT: &str = r#"Based on the main categories or themes found in the content, generate:
1. A question about what the visitor is looking for
2. Four multiple choice options (A through D) that cover the main categories found in the content

Return ONLY a JSON object in exactly this format, with nothing before or after it:
{
    "question": "What are you looking for on this website?",
    "options": [
        "A. [First main category]",
        "B. [Second main category]",
        "C. [Third main category]",
        "D. [Fourth main category]"
    ]
}

Remember:
- The question should help identify visitor intent
- Options should be based on actual content categories
- Options should be clear and distinct
- Each option must start with its letter prefix: "A. ", "B. ", "C. ", "D. "
- Format must be valid JSON

Response:"#;

const CLASSIFY_INSTRUCTIONS: &str = r#"Analyze the following website content together with a visitor's answers to multiple-choice questions about it, and classify the visitor's intent."#;

const CLASSIFY_FORMAT: &str = r#"Based on the website content and the visitor's answers, decide what the visitor most likely wants to accomplish on this website.

Return ONLY a JSON object in exactly this format, with nothing before or after it:
{
    "user_intent": "[short label for the visitor's intent]",
    "explanation": "[one or two sentences explaining the classification]"
}

Response:"#;

/// First `limit` characters of `s`, never splitting a character.
pub fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn content_block(content: &ContentRecord) -> String {
    format!(
        "Website Content:\nTitle: {}\nDescription: {}\nMain Content: {}\nHeadings: {}",
        content.title,
        content.meta_description,
        truncate_chars(&content.main_content, MAIN_CONTENT_LIMIT),
        content.heading_list(),
    )
}

/// Prompt asking for one question with four category options.
pub fn question_prompt(content: &ContentRecord) -> String {
    format!(
        "{QUESTION_INSTRUCTIONS}\n\n{}\n\n{QUESTION_FORMAT}",
        content_block(content)
    )
}

/// The transcript as `Q:`/`A:` pairs, one blank line between entries.
pub fn render_transcript(transcript: &AnswerTranscript) -> String {
    transcript
        .iter()
        .map(|entry| format!("Q: {}\nA: {}", entry.question, entry.selected_answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prompt asking for an intent classification of the visitor's answers.
pub fn classification_prompt(content: &ContentRecord, transcript: &AnswerTranscript) -> String {
    format!(
        "{CLASSIFY_INSTRUCTIONS}\n\n{}\n\nVisitor Answers:\n{}\n\n{CLASSIFY_FORMAT}",
        content_block(content),
        render_transcript(transcript)
    )
}
