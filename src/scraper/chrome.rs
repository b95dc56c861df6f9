// chrome.rs
//
// Chromium sessions driven over CDP. Each session owns its own browser process
// and a single-threaded tokio runtime, so a worker thread can drive it with
// plain blocking calls.

use crate::scraper::browser::{Browser, PageSession, RequestProfile};
use crate::scraper::ScraperError;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ChromeBrowser {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl ChromeBrowser {
    pub fn new(headless: bool, executable: Option<PathBuf>) -> Self {
        Self {
            headless,
            executable,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl Browser for ChromeBrowser {
    fn open(&self, profile: &RequestProfile) -> Result<Box<dyn PageSession>, ScraperError> {
        let session = ChromeSession::launch(self, profile)?;
        Ok(Box::new(session))
    }
}

pub struct ChromeSession {
    runtime: Runtime,
    browser: Option<CdpBrowser>,
    handler: JoinHandle<()>,
    page: Option<Page>,
    last_resource_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ReadySnapshot {
    complete: bool,
    anchor: bool,
    resources: u64,
}

fn cdp_err(e: impl std::fmt::Display) -> ScraperError {
    ScraperError::Browser(e.to_string())
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

impl ChromeSession {
    fn launch(cfg: &ChromeBrowser, profile: &RequestProfile) -> Result<Self, ScraperError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(cdp_err)?;

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(cfg.request_timeout)
            .arg(format!("--lang={}", profile.locale()))
            .arg(format!("--user-agent={}", profile.user_agent));
        if !cfg.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &cfg.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScraperError::Browser)?;

        let (browser, mut events) = runtime.block_on(CdpBrowser::launch(config)).map_err(cdp_err)?;
        let handler = runtime.spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let mut session = Self {
            runtime,
            browser: Some(browser),
            handler,
            page: None,
            last_resource_count: None,
        };
        // From here on a failure drops `session`, which closes the browser.
        session.open_page(profile)?;
        Ok(session)
    }

    fn open_page(&mut self, profile: &RequestProfile) -> Result<(), ScraperError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScraperError::Browser("browser already closed".into()))?;

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(profile.user_agent.clone())
            .accept_language(profile.accept_language.clone())
            .build()
            .map_err(ScraperError::Browser)?;
        let headers = SetExtraHttpHeadersParams::new(Headers::new(serde_json::json!({
            "Accept-Language": profile.accept_language,
            "Referer": profile.referer,
        })));

        let page = self.runtime.block_on(async {
            let page = browser.new_page("about:blank").await?;
            page.set_user_agent(user_agent).await?;
            page.execute(headers).await?;
            Ok::<_, chromiumoxide::error::CdpError>(page)
        });
        self.page = Some(page.map_err(cdp_err)?);
        Ok(())
    }

    fn page(&self) -> Result<&Page, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::Browser("no page open".into()))
    }

    fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T, ScraperError> {
        let page = self.page()?;
        let result = self
            .runtime
            .block_on(page.evaluate(script))
            .map_err(|e| ScraperError::Script(e.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|e| ScraperError::Script(e.to_string()))
    }
}

impl PageSession for ChromeSession {
    fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        self.last_resource_count = None;
        let page = self.page()?;
        self.runtime
            .block_on(page.goto(url))
            .map(|_| ())
            .map_err(|e| ScraperError::Navigation(format!("{url}: {e}")))
    }

    fn is_ready(&mut self, anchor: &str) -> Result<bool, ScraperError> {
        let script = format!(
            "(() => ({{ complete: document.readyState === 'complete', anchor: document.querySelector({}) !== null, resources: performance.getEntriesByType('resource').length }}))()",
            js_string(anchor)
        );
        let snapshot: ReadySnapshot = self.eval(script)?;

        // Quiet network: no new resource entries since the previous poll.
        let quiet = self.last_resource_count == Some(snapshot.resources);
        self.last_resource_count = Some(snapshot.resources);
        debug!(?snapshot, quiet, "readiness check");

        Ok(snapshot.complete && snapshot.anchor && quiet)
    }

    fn content(&mut self) -> Result<String, ScraperError> {
        let page = self.page()?;
        self.runtime.block_on(page.content()).map_err(cdp_err)
    }

    fn submit_page_index(&mut self, input: &str, page_no: u32) -> Result<(), ScraperError> {
        let cleared: bool = self.eval(format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; el.value = ''; return true; }})()",
            js_string(input)
        ))?;
        if !cleared {
            return Err(ScraperError::Navigation(format!("page input {input} not found")));
        }

        self.last_resource_count = None;
        let page = self.page()?;
        self.runtime
            .block_on(async {
                let element = page.find_element(input).await?;
                element.click().await?;
                element.type_str(page_no.to_string()).await?;
                element.press_key("Enter").await?;
                Ok::<_, chromiumoxide::error::CdpError>(())
            })
            .map_err(|e| ScraperError::Navigation(format!("advance to page {page_no}: {e}")))
    }

    fn current_page_index(&mut self, input: &str) -> Result<Option<u32>, ScraperError> {
        let value: Option<String> = self.eval(format!(
            "(() => {{ const el = document.querySelector({}); return el ? String(el.value) : null; }})()",
            js_string(input)
        ))?;
        Ok(value.and_then(|v| v.trim().parse().ok()))
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = self.runtime.block_on(browser.close()) {
                warn!("Browser close failed: {e}");
            }
            if let Err(e) = self.runtime.block_on(browser.wait()) {
                warn!("Browser process wait failed: {e}");
            }
        }
        self.handler.abort();
    }
}
