use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{info, warn};

pub use browserless_client::RenderWaits;
use siteprobe_common::{ProbeError, Result};

// --- PageRenderer trait ---

/// Loads a URL in a real browser and returns the DOM after scripts ran.
/// Every call owns its browser session start to finish.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String>;
    fn name(&self) -> &str;
}

/// Only absolute http(s) URLs are handed to a browser.
pub fn validate_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url)
        .map_err(|e| ProbeError::Extraction(format!("Invalid URL '{url}': {e}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ProbeError::Extraction(format!(
            "Only http/https URLs are allowed, got: {}",
            parsed.scheme()
        )));
    }
    Ok(parsed)
}

// --- Local headless Chromium ---

/// Max concurrent Chromium processes. Each instance is heavy (~100MB+ RSS,
/// multiple child processes).
const MAX_CONCURRENT_CHROME: usize = 2;

/// Renders with a local headless Chromium `--dump-dom`. The page-load wait
/// bounds the whole process and is the only give-up deadline on this path:
/// the DOM-ready wait is handed to Chromium as its virtual time budget, which
/// caps how long scripts may run but never fails a render on its own. Use
/// [`BrowserlessRenderer`] when a DOM-ready failure must surface as an error.
pub struct ChromeRenderer {
    chrome_bin: String,
    waits: RenderWaits,
    semaphore: Semaphore,
}

impl ChromeRenderer {
    pub fn new(chrome_bin: impl Into<String>, waits: RenderWaits) -> Self {
        let chrome_bin = chrome_bin.into();
        info!(
            chrome_bin = chrome_bin.as_str(),
            max_concurrent = MAX_CONCURRENT_CHROME,
            "Using ChromeRenderer"
        );
        Self {
            chrome_bin,
            waits,
            semaphore: Semaphore::new(MAX_CONCURRENT_CHROME),
        }
    }

    /// Launch Chrome --dump-dom and return raw stdout bytes. The child is
    /// killed if the page-load wait elapses, and its profile directory is
    /// removed on every exit path.
    async fn run_chrome(&self, url: &str) -> Result<Vec<u8>> {
        let tmp_dir = tempfile::tempdir().map_err(|e| {
            ProbeError::Extraction(format!("Failed to create temp profile dir: {e}"))
        })?;

        let output = tokio::process::Command::new(&self.chrome_bin)
            .arg("--headless")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-data-dir={}", tmp_dir.path().display()))
            .arg(format!(
                "--virtual-time-budget={}",
                self.waits.dom_ready.as_millis()
            ))
            .arg("--dump-dom")
            .arg(url)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.waits.page_load, output).await {
            Ok(Ok(output)) if output.status.success() => Ok(output.stdout),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(url, renderer = "chrome", stderr = %stderr, "Chrome exited with error");
                Err(ProbeError::Extraction(format!(
                    "Chrome exited with {} for {url}",
                    output.status
                )))
            }
            Ok(Err(e)) => Err(ProbeError::Extraction(format!(
                "Failed to run Chrome for {url}: {e}"
            ))),
            Err(_) => Err(ProbeError::Extraction(format!(
                "Chrome timed out after {}s for {url}",
                self.waits.page_load.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        validate_url(url)?;

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ProbeError::Extraction("Chrome semaphore closed".into()))?;

        info!(url, renderer = "chrome", "Rendering URL");

        let html = self.run_chrome(url).await?;
        let text = String::from_utf8_lossy(&html).into_owned();

        info!(url, renderer = "chrome", bytes = text.len(), "Rendered");
        Ok(text)
    }

    fn name(&self) -> &str {
        "chrome"
    }
}

// --- Browserless ---

pub struct BrowserlessRenderer {
    client: browserless_client::BrowserlessClient,
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>, waits: RenderWaits) -> Result<Self> {
        info!(base_url, "Using BrowserlessRenderer");
        Ok(Self {
            client: browserless_client::BrowserlessClient::new(base_url, token, waits)?,
        })
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        validate_url(url)?;

        info!(url, renderer = "browserless", "Rendering URL");

        let html = self.client.content(url).await?;

        info!(url, renderer = "browserless", bytes = html.len(), "Rendered");
        Ok(html)
    }

    fn name(&self) -> &str {
        "browserless"
    }
}
