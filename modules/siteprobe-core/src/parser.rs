//! Turns free-form generation output into structured values.
//!
//! The backend is asked for a bare JSON object but routinely wraps it in
//! prose or markdown. The object is taken to span from the first `{` to the
//! last `}`; once that slice decodes it is trusted as-is. When it does not,
//! questions are recovered line by line.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use siteprobe_common::{QuestionSpec, OPTION_PREFIXES};

/// Decode the JSON object embedded in `raw`, if there is one.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str(&raw[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Embedded JSON did not decode");
            None
        }
    }
}

/// Parse a question from generation output. Never fails: falls back to
/// [`parse_unstructured`] when no decodable object is present.
pub fn parse_question(raw: &str) -> QuestionSpec {
    match extract_json::<QuestionSpec>(raw) {
        Some(spec) => spec,
        None => {
            warn!(
                raw_len = raw.len(),
                "No JSON question in response, using line fallback"
            );
            parse_unstructured(raw)
        }
    }
}

/// Line-based recovery. Lines starting with `A.`..`D.` become options in
/// the order seen; any other non-empty line not starting with `{`, `}` or
/// `"` replaces the question, so the last such line wins.
pub fn parse_unstructured(raw: &str) -> QuestionSpec {
    let mut question = "";
    let mut options = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if OPTION_PREFIXES.iter().any(|p| line.starts_with(p)) {
            options.push(line.to_string());
        } else if !line.is_empty() && !line.starts_with(['{', '}', '"']) {
            question = line;
        }
    }

    QuestionSpec::new(question, options)
}
