use crate::scraper::ScraperError;
use rand::seq::SliceRandom;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

const RENDER_ENDPOINT: &str = "https://api.zenrows.com/v1/";

/// Modern desktop browsers. One is picked per session.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

pub fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// One scroll of the rendered page followed by a pause for lazy content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollStep {
    pub dy: i32,
    pub pause: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// CSS selector that signals listing content has rendered.
    pub wait_for: Option<String>,
    /// Upper bound on waiting for `wait_for`. The page is used either way.
    pub wait_timeout: Duration,
    /// Overrides the session's whole-request timeout for slow sites.
    pub page_load_timeout: Option<Duration>,
    /// Pause after load, before the first scroll step.
    pub settle: Duration,
    pub scroll: Vec<ScrollStep>,
    /// Where to save a full-page screenshot, if wanted.
    pub screenshot: Option<PathBuf>,
}

/// A browser-like session that turns a URL into rendered markup.
///
/// The orchestrator owns one session for the whole run and calls `close`
/// when it is done, whether the run succeeded or not.
pub trait PageFetcher: Send {
    fn fetch(&mut self, url: &str, opts: &FetchOptions) -> Result<String, ScraperError>;

    fn close(&mut self) {}
}

pub type FetcherFactory =
    Arc<dyn Fn() -> Result<Box<dyn PageFetcher>, ScraperError> + Send + Sync>;

/// Renders pages through a headless-browser HTTP API, so JavaScript-built
/// result lists and scroll-triggered cards are present in the markup.
pub struct RenderingApiFetcher {
    client: Client,
    api_key: String,
    endpoint: String,
    user_agent: &'static str,
    timeout: Duration,
}

impl RenderingApiFetcher {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ScraperError> {
        let user_agent = pick_user_agent();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            endpoint: RENDER_ENDPOINT.to_string(),
            user_agent,
            timeout,
        })
    }

    fn base_params(&self, url: &str) -> HashMap<&'static str, String> {
        let mut params = HashMap::new();
        params.insert("url", url.to_string());
        params.insert("apikey", self.api_key.clone());
        params.insert("js_render", "true".to_string());
        params.insert("custom_headers", "true".to_string());
        params.insert("original_status", "true".to_string());
        params
    }

    fn try_render(
        &self,
        url: &str,
        opts: &FetchOptions,
        wait_for: Option<&str>,
    ) -> Result<String, ScraperError> {
        let mut params = self.base_params(url);
        match wait_for {
            Some(selector) => {
                params.insert("wait_for", selector.to_string());
            }
            None if !opts.wait_timeout.is_zero() => {
                params.insert("wait", opts.wait_timeout.as_millis().to_string());
            }
            None => {}
        }
        if let Some(instructions) = page_instructions(opts) {
            params.insert("js_instructions", instructions.to_string());
        }

        let resp = self
            .client
            .get(&self.endpoint)
            .headers(self.headers())
            .query(&params)
            .timeout(opts.page_load_timeout.unwrap_or(self.timeout))
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();

        let original_status = resp
            .headers()
            .iter()
            .find(|(k, _)| k.as_str().to_ascii_lowercase().contains("original"))
            .map(|(_, v)| v.to_str().unwrap_or("?").to_string())
            .unwrap_or("<none>".to_string());

        let text = resp
            .text()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        if !status.is_success() {
            if let Some(selector) = wait_for.filter(|_| status.as_u16() == 422) {
                return Err(ScraperError::WaitTimeout(selector.to_string()));
            }
            if matches!(original_status.as_str(), "403" | "429") {
                return Err(ScraperError::Blocked(format!("HTTP {original_status}")));
            }
            return Err(ScraperError::Network(format!(
                "render API HTTP {} ({}) : {}",
                status, original_status, text
            )));
        }

        if text.starts_with('{') {
            if let Ok(json) = serde_json::from_str::<Value>(&text) {
                if json.get("code").is_some() {
                    return Err(ScraperError::Network(format!(
                        "render API error ({}) : {}",
                        original_status, text
                    )));
                }
            }
        }

        Ok(text)
    }

    fn save_screenshot(&self, url: &str, opts: &FetchOptions, path: &Path) -> Result<(), ScraperError> {
        let mut params = self.base_params(url);
        params.insert("screenshot", "true".to_string());
        params.insert("screenshot_fullpage", "true".to_string());
        if let Some(instructions) = page_instructions(opts) {
            params.insert("js_instructions", instructions.to_string());
        }

        let resp = self
            .client
            .get(&self.endpoint)
            .headers(self.headers())
            .query(&params)
            .timeout(opts.page_load_timeout.unwrap_or(self.timeout))
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ScraperError::Network(format!(
                "screenshot HTTP {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| ScraperError::Network(e.to_string()))?;
        std::fs::write(path, &bytes)?;
        Ok(())
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(self.user_agent));
        headers
    }
}

impl PageFetcher for RenderingApiFetcher {
    fn fetch(&mut self, url: &str, opts: &FetchOptions) -> Result<String, ScraperError> {
        let start = Instant::now();

        let markup = match self.try_render(url, opts, opts.wait_for.as_deref()) {
            Err(ScraperError::WaitTimeout(selector)) => {
                // proceed without the selector, bounded by a plain wait
                tracing::warn!(%url, %selector, "content selector never appeared, fetching without it");
                self.try_render(url, opts, None)?
            }
            other => other?,
        };

        tracing::debug!(%url, elapsed = ?start.elapsed(), bytes = markup.len(), "rendered page");

        if let Some(path) = &opts.screenshot {
            if let Err(e) = self.save_screenshot(url, opts, path) {
                tracing::warn!(%url, "screenshot failed: {e}");
            }
        }

        Ok(markup)
    }

    fn close(&mut self) {
        tracing::debug!("render session closed");
    }
}

/// Settle wait then scroll steps, or `None` when there is nothing to do.
fn page_instructions(opts: &FetchOptions) -> Option<Value> {
    let mut instructions = Vec::new();
    if !opts.settle.is_zero() {
        instructions.push(json!({ "wait": opts.settle.as_millis() as u64 }));
    }
    if let Value::Array(steps) = scroll_instructions(&opts.scroll) {
        instructions.extend(steps);
    }
    (!instructions.is_empty()).then_some(Value::Array(instructions))
}

fn scroll_instructions(steps: &[ScrollStep]) -> Value {
    let mut instructions = Vec::with_capacity(steps.len() * 2);
    for step in steps {
        instructions.push(json!({ "scroll_y": step.dy }));
        if !step.pause.is_zero() {
            instructions.push(json!({ "wait": step.pause.as_millis() as u64 }));
        }
    }
    Value::Array(instructions)
}

/// Plain HTTP fetch with browser-like headers. Works for server-rendered
/// pages; cannot scroll or wait for client-side content.
pub struct DirectFetcher {
    client: Client,
    timeout: Duration,
}

impl DirectFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(pick_user_agent())
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self { client, timeout })
    }
}

impl PageFetcher for DirectFetcher {
    fn fetch(&mut self, url: &str, opts: &FetchOptions) -> Result<String, ScraperError> {
        if !opts.scroll.is_empty() {
            tracing::debug!(%url, steps = opts.scroll.len(), "direct fetch cannot scroll, skipping");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-IN,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));

        let resp = self
            .client
            .get(url)
            .headers(headers)
            .timeout(opts.page_load_timeout.unwrap_or(self.timeout))
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 403 || status.as_u16() == 429 {
            return Err(ScraperError::Blocked(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(ScraperError::Network(format!("HTTP {status} for {url}")));
        }

        resp.text().map_err(|e| ScraperError::Network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_steps_become_render_instructions() {
        let steps = vec![
            ScrollStep { dy: 1500, pause: Duration::from_millis(1200) },
            ScrollStep { dy: 1500, pause: Duration::ZERO },
        ];

        assert_eq!(
            scroll_instructions(&steps),
            json!([{"scroll_y": 1500}, {"wait": 1200}, {"scroll_y": 1500}])
        );
    }

    #[test]
    fn settle_wait_leads_the_instructions() {
        let opts = FetchOptions {
            settle: Duration::from_millis(4000),
            scroll: vec![ScrollStep { dy: 800, pause: Duration::ZERO }],
            ..Default::default()
        };

        assert_eq!(
            page_instructions(&opts),
            Some(json!([{"wait": 4000}, {"scroll_y": 800}]))
        );
        assert_eq!(page_instructions(&FetchOptions::default()), None);
    }

    #[test]
    fn user_agent_comes_from_the_pool() {
        assert!(USER_AGENTS.contains(&pick_user_agent()));
    }
}
