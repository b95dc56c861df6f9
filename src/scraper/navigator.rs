// navigator.rs

use crate::config::Timing;
use crate::scraper::browser::{wait_until, Browser, PageSession, RequestProfile};
use crate::scraper::preflight::Preflight;
use crate::scraper::site::SiteLayout;
use crate::scraper::ScraperError;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Opens a ready-to-read preview page for one county and date.
pub struct Navigator<'a> {
    pub browser: &'a dyn Browser,
    pub layout: &'a SiteLayout,
    pub timing: Timing,
    pub preflight: Option<&'a Preflight>,
}

impl<'a> Navigator<'a> {
    /// Returns the open session; on any error the session has already been dropped.
    pub fn open(&self, county: &str, date: NaiveDate) -> Result<Box<dyn PageSession>, ScraperError> {
        let url = self.layout.listing_url(county, date)?;
        let origin = self.layout.origin(county)?;
        let profile = RequestProfile::realistic(origin.as_str());

        if let Some(preflight) = self.preflight {
            preflight.check(url.as_str(), &profile, self.layout)?;
        }

        let mut session = self.browser.open(&profile)?;
        info!(%county, %date, %url, "Opening auction preview");
        session.goto(url.as_str())?;

        let anchor = self.layout.anchor.as_str();
        let waited = wait_until(
            &format!("{anchor} on {url}"),
            self.timing.ready_timeout,
            self.timing.poll_interval,
            || session.is_ready(anchor),
        );
        if let Err(err) = waited {
            // A block page never renders the anchor; report it as such when visible.
            let text = session.content().unwrap_or_default();
            if let Some(marker) = self.layout.is_blocked_page(&text) {
                return Err(ScraperError::Blocked(format!("{marker:?} on {url}")));
            }
            return Err(err);
        }

        debug!(settle = ?self.timing.navigation_settle, "Page ready, settling");
        std::thread::sleep(self.timing.navigation_settle);
        Ok(session)
    }
}
