// preflight.rs
//
// Plain HTTP check of the preview URL. Catches non-200 responses and
// anti-bot interstitials before a browser process is spent on the task.

use crate::scraper::browser::RequestProfile;
use crate::scraper::site::SiteLayout;
use crate::scraper::ScraperError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

pub struct Preflight {
    client: Client,
}

impl Preflight {
    pub fn new(timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn check(&self, url: &str, profile: &RequestProfile, layout: &SiteLayout) -> Result<(), ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        insert_header(&mut headers, USER_AGENT, &profile.user_agent);
        insert_header(&mut headers, ACCEPT_LANGUAGE, &profile.accept_language);
        insert_header(&mut headers, REFERER, &profile.referer);

        let resp = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .map_err(|e| ScraperError::Navigation(format!("{url}: {e}")))?;

        let status = resp.status();
        debug!(%url, %status, "preflight response");

        if is_block_status(status) {
            return Err(ScraperError::Blocked(format!("HTTP {status} from {url}")));
        }
        if status != StatusCode::OK {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| ScraperError::Navigation(format!("{url}: {e}")))?;
        match layout.is_blocked_page(&body) {
            Some(marker) => Err(ScraperError::Blocked(format!("{marker:?} on {url}"))),
            None => Ok(()),
        }
    }
}

fn insert_header(headers: &mut HeaderMap, name: reqwest::header::HeaderName, value: &str) {
    if let Ok(v) = HeaderValue::from_str(value) {
        headers.insert(name, v);
    }
}

fn is_block_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    )
}
