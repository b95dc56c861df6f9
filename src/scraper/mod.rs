pub mod browser;
pub mod chrome;
pub mod coordinator;
pub mod extractor;
pub mod navigator;
pub mod paginator;
pub mod preflight;
mod scraper;
mod scraper_error;
pub mod site;

#[cfg(test)]
pub mod testing;

pub use chrome::ChromeBrowser;
pub use coordinator::{Coordinator, ProgressEvent, RunSummary, TaskRunner};
pub use extractor::Strategy;
pub use scraper::AuctionScraper;
pub use scraper_error::ScraperError;
