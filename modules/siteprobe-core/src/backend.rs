// Wiring from Config to the concrete collaborators.

use std::sync::Arc;

use ai_client::{Claude, GenerationBackend, OpenAi};
use tracing::info;

use siteprobe_common::{Config, Provider, Result};

use crate::analyzer::Analyzer;
use crate::classifier::ResultClassifier;
use crate::extractor::PageExtractor;
use crate::question::QuestionGenerator;
use crate::renderer::{BrowserlessRenderer, ChromeRenderer, PageRenderer, RenderWaits};
use crate::store::{InMemoryQuestionCache, InMemorySessionStore, DEFAULT_CAPACITY};

pub fn generation_backend(config: &Config) -> Arc<dyn GenerationBackend> {
    match config.provider {
        Provider::OpenAi => {
            let mut backend = OpenAi::new(&config.api_key, &config.model);
            if let Some(url) = &config.generation_base_url {
                backend = backend.with_base_url(url);
            }
            Arc::new(backend)
        }
        Provider::Claude => {
            let mut backend = Claude::new(&config.api_key, &config.model);
            if let Some(url) = &config.generation_base_url {
                backend = backend.with_base_url(url);
            }
            Arc::new(backend)
        }
    }
}

/// Browserless when `BROWSERLESS_URL` is set, local Chromium otherwise.
pub fn page_renderer(config: &Config) -> Result<Arc<dyn PageRenderer>> {
    let waits = RenderWaits {
        page_load: config.page_load_timeout,
        dom_ready: config.dom_ready_timeout,
    };
    Ok(match &config.browserless_url {
        Some(url) => Arc::new(BrowserlessRenderer::new(
            url,
            config.browserless_token.as_deref(),
            waits,
        )?),
        None => Arc::new(ChromeRenderer::new(&config.chrome_bin, waits)),
    })
}

/// Analyzer with in-memory session store and question cache, both
/// expiring per the configured TTLs.
pub fn analyzer(config: &Config) -> Result<Analyzer> {
    let backend = generation_backend(config);
    let renderer = page_renderer(config)?;

    info!(
        backend = backend.name(),
        renderer = renderer.name(),
        "Analyzer components ready"
    );

    Ok(Analyzer::new(
        PageExtractor::new(renderer),
        QuestionGenerator::new(backend.clone()),
        ResultClassifier::new(backend),
        Arc::new(InMemorySessionStore::with_limits(
            config.session_ttl,
            DEFAULT_CAPACITY,
        )),
    )
    .with_cache(Arc::new(InMemoryQuestionCache::with_limits(
        config.question_cache_ttl,
        DEFAULT_CAPACITY,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &'static [(&'static str, &'static str)]) -> Config {
        Config::from_vars(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn provider_selects_backend() {
        let openai = config(&[("OPENAI_API_KEY", "sk-test")]);
        assert_eq!(generation_backend(&openai).name(), "openai");

        let claude = config(&[
            ("GENERATION_PROVIDER", "claude"),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
        ]);
        assert_eq!(generation_backend(&claude).name(), "claude");
    }

    #[test]
    fn browserless_url_selects_remote_renderer() {
        let local = config(&[("OPENAI_API_KEY", "sk-test")]);
        assert_eq!(page_renderer(&local).unwrap().name(), "chrome");

        let remote = config(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BROWSERLESS_URL", "http://browserless:3000"),
        ]);
        assert_eq!(page_renderer(&remote).unwrap().name(), "browserless");
    }
}
