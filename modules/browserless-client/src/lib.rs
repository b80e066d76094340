pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

/// Slack added on top of the browser-side waits before the HTTP call itself
/// is abandoned.
const REQUEST_GRACE: Duration = Duration::from_secs(5);

/// Browser-side waits applied to a single `/content` render.
#[derive(Debug, Clone, Copy)]
pub struct RenderWaits {
    /// Upper bound for navigation to settle.
    pub page_load: Duration,
    /// Upper bound for `<body>` to appear after navigation.
    pub dom_ready: Duration,
}

impl Default for RenderWaits {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(30),
            dom_ready: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    goto_options: GotoOptions,
    wait_for_selector: WaitForSelector<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions {
    timeout: u64,
    wait_until: &'static str,
}

#[derive(Debug, Serialize)]
struct WaitForSelector<'a> {
    selector: &'a str,
    timeout: u64,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    waits: RenderWaits,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>, waits: RenderWaits) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(waits.page_load + waits.dom_ready + REQUEST_GRACE)
            .build()
            .map_err(|e| BrowserlessError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            waits,
        })
    }

    fn content_body<'a>(&self, url: &'a str) -> ContentRequest<'a> {
        ContentRequest {
            url,
            goto_options: GotoOptions {
                timeout: self.waits.page_load.as_millis() as u64,
                wait_until: "domcontentloaded",
            },
            wait_for_selector: WaitForSelector {
                selector: "body",
                timeout: self.waits.dom_ready.as_millis() as u64,
            },
        }
    }

    /// Fetch fully-rendered HTML content for a URL via Browserless /content endpoint.
    ///
    /// The remote browser session lives only for the duration of this request.
    pub async fn content(&self, url: &str) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        debug!(url, "Browserless content request");

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&self.content_body(url))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            if status.as_u16() == 408 {
                return Err(BrowserlessError::Timeout(message));
            }
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}
