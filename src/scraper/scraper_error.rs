use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid county slug: {0:?}")]
    InvalidCounty(String),
    #[error("Bad selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Navigation error: {0}")]
    Navigation(String),
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },
    #[error("Blocked by site: {0}")]
    Blocked(String),
    #[error("Timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },
    #[error("Page script error: {0}")]
    Script(String),
}
