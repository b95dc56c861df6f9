use crate::config::Timing;
use crate::domain::Section;
use crate::router::AppState;
use crate::runs::RunRegistry;
use crate::scraper::site::SiteLayout;
use crate::scraper::testing::{FakeBrowser, FakeSection, FakeSite};
use crate::scraper::{AuctionScraper, ScraperError, Strategy, TaskRunner};
use astra::Response;
use std::io::Read;
use std::sync::Arc;

/// Every county serves two Waiting pages (2 + 1 listings) and one Closed page.
pub fn fake_site() -> FakeSite {
    FakeSite::default()
        .with(Section::Waiting, FakeSection::with_pages("W", &[2, 1]))
        .with(Section::Closed, FakeSection::with_pages("C", &[1]))
}

/// App state whose runs scrape the in-memory site instead of launching Chrome.
pub fn test_state(browser: FakeBrowser) -> AppState {
    test_state_with(browser, Strategy::Auto)
}

pub fn test_state_with(browser: FakeBrowser, default_strategy: Strategy) -> AppState {
    let factory = move |strategy: Strategy| -> Result<Arc<dyn TaskRunner>, ScraperError> {
        Ok(Arc::new(AuctionScraper::new(
            browser.clone(),
            SiteLayout::default(),
            strategy,
            Timing::instant(),
        )))
    };
    AppState {
        runs: RunRegistry::new(Arc::new(factory)),
        default_concurrency: 3,
        default_strategy,
    }
}

pub fn read_body(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn read_bytes(resp: Response) -> Vec<u8> {
    let mut body = Vec::new();
    resp.into_body().reader().read_to_end(&mut body).unwrap();
    body
}
