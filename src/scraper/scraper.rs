// scraper.rs
use crate::config::{ScrapeSettings, Timing};
use crate::domain::{ListingRecord, ScrapeTask, TaskReport};
use crate::scraper::browser::Browser;
use crate::scraper::coordinator::TaskRunner;
use crate::scraper::extractor::{Extractor, Strategy};
use crate::scraper::navigator::Navigator;
use crate::scraper::paginator::Paginator;
use crate::scraper::preflight::Preflight;
use crate::scraper::site::SiteLayout;
use crate::scraper::ScraperError;
use std::time::Duration;
use tracing::info;

const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one (county, date) task end to end:
/// Navigator → Paginator → Extractor, in a browser session of its own.
pub struct AuctionScraper<B: Browser> {
    browser: B,
    layout: SiteLayout,
    strategy: Strategy,
    timing: Timing,
    preflight: Option<Preflight>,
}

impl<B: Browser> AuctionScraper<B> {
    pub fn new(browser: B, layout: SiteLayout, strategy: Strategy, timing: Timing) -> Self {
        Self {
            browser,
            layout,
            strategy,
            timing,
            preflight: None,
        }
    }

    pub fn from_settings(browser: B, settings: &ScrapeSettings) -> Result<Self, ScraperError> {
        let mut scraper = Self::new(
            browser,
            SiteLayout::with_domain(settings.site_domain.clone()),
            settings.strategy,
            settings.timing,
        );
        if settings.preflight {
            scraper.preflight = Some(Preflight::new(PREFLIGHT_TIMEOUT)?);
        }
        Ok(scraper)
    }

    pub fn scrape(&self, task: &ScrapeTask) -> Result<TaskReport, ScraperError> {
        let extractor = Extractor::new(&self.layout, self.strategy)?;
        let paginator = Paginator::new(&self.layout, &extractor, self.timing)?;
        let navigator = Navigator {
            browser: &self.browser,
            layout: &self.layout,
            timing: self.timing,
            preflight: self.preflight.as_ref(),
        };

        let mut session = navigator.open(&task.county, task.date)?;
        let scraped = paginator.scrape_all(session.as_mut());
        // Release the browser before anything else, success or not.
        drop(session);
        let scraped = scraped?;

        let mut report = TaskReport::default();
        for section in scraped {
            report.sections.push((section.section, section.status));
            report.records.extend(
                section
                    .listings
                    .into_iter()
                    .map(|fields| ListingRecord::new(&task.county, task.date, section.section, fields)),
            );
        }

        info!(task = %task, records = report.records.len(), "Task scraped");
        Ok(report)
    }
}

impl<B: Browser> TaskRunner for AuctionScraper<B> {
    fn run(&self, task: &ScrapeTask) -> Result<TaskReport, ScraperError> {
        self.scrape(task)
    }
}
