use std::env;
use std::fmt;
use std::time::Duration;

use tracing::info;

use crate::error::{ProbeError, Result};

/// Which generation backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Claude,
}

impl Provider {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "claude" | "anthropic" => Ok(Provider::Claude),
            other => Err(ProbeError::Config(format!(
                "GENERATION_PROVIDER must be 'openai' or 'claude', got '{other}'"
            ))),
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Claude => "claude-haiku-4-5-20251001",
        }
    }

    fn key_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => f.write_str("openai"),
            Provider::Claude => f.write_str("claude"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Generation backend
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub generation_base_url: Option<String>,

    // Rendering
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub chrome_bin: String,
    pub page_load_timeout: Duration,
    pub dom_ready_timeout: Duration,

    // In-memory stores
    pub session_ttl: Duration,
    pub question_cache_ttl: Duration,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let provider = match var("GENERATION_PROVIDER") {
            Some(p) => Provider::parse(&p)?,
            None => Provider::OpenAi,
        };
        let api_key = var(provider.key_var()).ok_or_else(|| {
            ProbeError::Config(format!(
                "{} environment variable is required",
                provider.key_var()
            ))
        })?;

        Ok(Self {
            provider,
            api_key,
            model: var("GENERATION_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            generation_base_url: var("GENERATION_BASE_URL"),
            browserless_url: var("BROWSERLESS_URL"),
            browserless_token: var("BROWSERLESS_TOKEN"),
            chrome_bin: var("CHROME_BIN").unwrap_or_else(|| "chromium".to_string()),
            page_load_timeout: secs(var("PAGE_LOAD_TIMEOUT_SECS"), "PAGE_LOAD_TIMEOUT_SECS", 30)?,
            dom_ready_timeout: secs(var("DOM_READY_TIMEOUT_SECS"), "DOM_READY_TIMEOUT_SECS", 10)?,
            session_ttl: secs(var("SESSION_TTL_SECS"), "SESSION_TTL_SECS", 3600)?,
            question_cache_ttl: secs(
                var("QUESTION_CACHE_TTL_SECS"),
                "QUESTION_CACHE_TTL_SECS",
                86400,
            )?,
            api_host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: match var("API_PORT") {
                Some(p) => p
                    .parse()
                    .map_err(|_| ProbeError::Config(format!("API_PORT must be a number, got '{p}'")))?,
                None => 5000,
            },
        })
    }

    /// Log the effective configuration, secrets omitted.
    pub fn log_redacted(&self) {
        info!(
            provider = %self.provider,
            model = self.model.as_str(),
            generation_base_url = self.generation_base_url.as_deref().unwrap_or("default"),
            renderer = if self.browserless_url.is_some() { "browserless" } else { "chrome" },
            chrome_bin = self.chrome_bin.as_str(),
            page_load_secs = self.page_load_timeout.as_secs(),
            dom_ready_secs = self.dom_ready_timeout.as_secs(),
            session_ttl_secs = self.session_ttl.as_secs(),
            question_cache_ttl_secs = self.question_cache_ttl.as_secs(),
            api_host = self.api_host.as_str(),
            api_port = self.api_port,
            "Configuration loaded"
        );
    }
}

fn secs(value: Option<String>, key: &str, default: u64) -> Result<Duration> {
    match value {
        Some(v) => v
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ProbeError::Config(format!("{key} must be a positive number of seconds, got '{v}'"))
            }),
        None => Ok(Duration::from_secs(default)),
    }
}
