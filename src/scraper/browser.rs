// browser.rs

use crate::scraper::ScraperError;
use rand::Rng;
use std::time::{Duration, Instant};

const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Headers a session presents to the auction site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestProfile {
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
}

impl RequestProfile {
    /// A desktop browser profile with a user agent picked from a fixed pool.
    pub fn realistic(referer: &str) -> Self {
        let ua = USER_AGENTS[rand::thread_rng().gen_range(0..USER_AGENTS.len())];
        Self {
            user_agent: ua.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: referer.to_string(),
        }
    }

    pub fn locale(&self) -> &str {
        self.accept_language
            .split(',')
            .next()
            .unwrap_or("en-US")
    }
}

/// Launches isolated browser sessions. One session is never shared by two tasks.
pub trait Browser: Send + Sync {
    fn open(&self, profile: &RequestProfile) -> Result<Box<dyn PageSession>, ScraperError>;
}

/// A single tab in a single browser context.
///
/// Dropping the session must release the underlying browser process.
pub trait PageSession {
    fn goto(&mut self, url: &str) -> Result<(), ScraperError>;

    /// Readiness predicate: document loaded, `anchor` present and network quiet.
    fn is_ready(&mut self, anchor: &str) -> Result<bool, ScraperError>;

    /// Serialized DOM of the page as currently rendered.
    fn content(&mut self) -> Result<String, ScraperError>;

    /// Writes `page` into the page-index input and submits it.
    fn submit_page_index(&mut self, input: &str, page: u32) -> Result<(), ScraperError>;

    /// Page number shown in the page-index input, if it can be read.
    fn current_page_index(&mut self, input: &str) -> Result<Option<u32>, ScraperError>;
}

/// Polls `predicate` every `poll` until it holds or `timeout` passes.
/// Predicate errors end the wait immediately.
pub fn wait_until<F>(what: &str, timeout: Duration, poll: Duration, mut predicate: F) -> Result<(), ScraperError>
where
    F: FnMut() -> Result<bool, ScraperError>,
{
    let start = Instant::now();
    loop {
        if predicate()? {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(ScraperError::Timeout {
                what: what.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        std::thread::sleep(poll);
    }
}
