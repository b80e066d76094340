// Test mocks for the analyzer pipeline.
//
// - MockBackend (GenerationBackend): scripted replies, records every call
// - MockRenderer (PageRenderer): HashMap-based URL→HTML
//
// Plus `analyzer()` for wiring both into an Analyzer with in-memory stores.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use ai_client::{AiError, GenerationBackend, Sampling};
use async_trait::async_trait;

use siteprobe_common::{ProbeError, Result};

use crate::analyzer::Analyzer;
use crate::classifier::ResultClassifier;
use crate::extractor::PageExtractor;
use crate::question::QuestionGenerator;
use crate::renderer::PageRenderer;
use crate::store::{InMemoryQuestionCache, InMemorySessionStore};

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// One recorded `invoke` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub sampling: Sampling,
}

/// Replays scripted replies in order. Once the script runs out, every call
/// returns an `AiError::Api` 500.
/// Builder pattern: `.reply()`, `.fail()`.
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<VecDeque<std::result::Result<String, AiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    pub fn fail(self, err: AiError) -> Self {
        self.push(Err(err))
    }

    fn push(self, item: std::result::Result<String, AiError>) -> Self {
        self.script.lock().unwrap().push_back(item);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn invoke(&self, prompt: &str, sampling: &Sampling) -> ai_client::Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            sampling: *sampling,
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AiError::Api {
                    status: 500,
                    message: "MockBackend: script exhausted".into(),
                })
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockRenderer
// ---------------------------------------------------------------------------

/// HashMap-based renderer. Returns an extraction error for unregistered URLs.
#[derive(Default)]
pub struct MockRenderer {
    pages: HashMap<String, String>,
    renders: Mutex<Vec<String>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        self.renders.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| {
            ProbeError::Extraction(format!("MockRenderer: no page registered for {url}"))
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Analyzer over the given mocks with in-memory sessions and question cache.
pub fn analyzer(renderer: Arc<MockRenderer>, backend: Arc<MockBackend>) -> Analyzer {
    Analyzer::new(
        PageExtractor::new(renderer),
        QuestionGenerator::new(backend.clone()),
        ResultClassifier::new(backend),
        Arc::new(InMemorySessionStore::new()),
    )
    .with_cache(Arc::new(InMemoryQuestionCache::new()))
}

/// Minimal rendered page with a title, a `<main>` and the given headings.
pub fn page(title: &str, main: &str, headings: &[&str]) -> String {
    let headings: String = headings.iter().map(|h| format!("<h2>{h}</h2>")).collect();
    format!(
        "<html><head><title>{title}</title></head>\
         <body>{headings}<main><p>{main}</p></main></body></html>"
    )
}
