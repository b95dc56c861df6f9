// testing.rs
//
// In-memory stand-ins for a browser and the auction site, used by the
// navigator/paginator/scraper tests and the route tests.

use crate::domain::Section;
use crate::scraper::browser::{Browser, PageSession, RequestProfile};
use crate::scraper::site::SiteLayout;
use crate::scraper::ScraperError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One listing block in the markup the county sites serve.
pub fn auction_item(case: &str, parcel: &str, city_zip: &str) -> String {
    format!(
        r#"<div class="AUCTION_ITEM">
  <div class="AUCTION_STATS"><div class="ASTAT_MSGA">Auction Starts</div><div class="ASTAT_MSGB Astat_DATA">10/18/2024 09:00 AM ET</div></div>
  <div class="AUCTION_DETAILS"><table class="ad_tab">
    <tr><th class="AD_LBL">Case Status:</th><td class="AD_DTA">ACTIVE</td></tr>
    <tr><th class="AD_LBL">Case #:</th><td class="AD_DTA">{case}</td></tr>
    <tr><th class="AD_LBL">Parcel ID:</th><td class="AD_DTA">{parcel}</td></tr>
    <tr><th class="AD_LBL">Property Address:</th><td class="AD_DTA">123 MAIN ST</td></tr>
    <tr><th class="AD_LBL"></th><td class="AD_DTA">{city_zip}</td></tr>
    <tr><th class="AD_LBL">Appraised Value:</th><td class="AD_DTA">$100,000.00</td></tr>
    <tr><th class="AD_LBL">Opening Bid:</th><td class="AD_DTA">$66,667.00</td></tr>
    <tr><th class="AD_LBL">Deposit Requirement:</th><td class="AD_DTA">$5,000.00</td></tr>
  </table></div>
</div>"#
    )
}

/// Pages of one section: the indicator text and the listing markup per page.
#[derive(Debug, Clone, Default)]
pub struct FakeSection {
    pub indicator: Option<String>,
    pub pages: Vec<Vec<String>>,
}

impl FakeSection {
    /// `counts[i]` listings on page `i + 1`, indicator = number of pages.
    pub fn with_pages(prefix: &str, counts: &[usize]) -> Self {
        let pages = counts
            .iter()
            .enumerate()
            .map(|(p, n)| {
                (0..*n)
                    .map(|i| auction_item(&format!("{prefix}-{}-{i}", p + 1), &format!("{}{i}", p + 1), "COLUMBUS, 43215-0001"))
                    .collect()
            })
            .collect();
        Self {
            indicator: Some(counts.len().to_string()),
            pages,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub sections: HashMap<Section, FakeSection>,
    pub body_prefix: String,
}

impl FakeSite {
    pub fn with(mut self, section: Section, fake: FakeSection) -> Self {
        self.sections.insert(section, fake);
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeLog {
    pub urls: Vec<String>,
    pub advances: Vec<(String, u32)>,
    pub opened: usize,
    pub closed: usize,
}

#[derive(Clone, Default)]
pub struct FakeBrowser {
    pub site: FakeSite,
    pub log: Arc<Mutex<FakeLog>>,
    pub never_ready: bool,
    pub fail_goto: bool,
    /// Page-index submits update the input but never reload the listings.
    pub stale_submit: bool,
}

impl FakeBrowser {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            ..Self::default()
        }
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, FakeLog> {
        self.log.lock().unwrap()
    }
}

impl Browser for FakeBrowser {
    fn open(&self, _profile: &RequestProfile) -> Result<Box<dyn PageSession>, ScraperError> {
        self.log.lock().unwrap().opened += 1;
        Ok(Box::new(FakeSession {
            site: self.site.clone(),
            layout: SiteLayout::default(),
            current: HashMap::new(),
            typed: HashMap::new(),
            log: Arc::clone(&self.log),
            never_ready: self.never_ready,
            fail_goto: self.fail_goto,
            stale_submit: self.stale_submit,
        }))
    }
}

pub struct FakeSession {
    site: FakeSite,
    layout: SiteLayout,
    /// Page whose listings are rendered.
    current: HashMap<Section, u32>,
    /// Value last typed into the page input.
    typed: HashMap<Section, u32>,
    log: Arc<Mutex<FakeLog>>,
    never_ready: bool,
    fail_goto: bool,
    stale_submit: bool,
}

impl FakeSession {
    fn section_for_input(&self, input: &str) -> Option<Section> {
        self.layout
            .sections
            .iter()
            .find(|s| s.page_input == input)
            .map(|s| s.section)
    }

    fn shown_index(&self, section: Section) -> u32 {
        self.typed
            .get(&section)
            .or_else(|| self.current.get(&section))
            .copied()
            .unwrap_or(1)
    }

    fn render(&self) -> String {
        let mut html = format!("<html><body>{}", self.site.body_prefix);
        for layout in &self.layout.sections {
            let Some(fake) = self.site.sections.get(&layout.section) else {
                continue;
            };
            let page = self.current.get(&layout.section).copied().unwrap_or(1);
            let id = |sel: &str| sel.trim_start_matches('#').to_string();

            html.push_str(&format!("<div id=\"{}\">", id(&layout.container)));
            if let Some(indicator) = &fake.indicator {
                html.push_str(&format!("<span id=\"{}\">{indicator}</span>", id(&layout.max_pages)));
            }
            let shown = self.shown_index(layout.section);
            html.push_str(&format!("<input id=\"{}\" value=\"{shown}\">", id(&layout.page_input)));
            if let Some(items) = fake.pages.get(page as usize - 1) {
                for item in items {
                    html.push_str(item);
                }
            }
            html.push_str("</div>");
        }
        html.push_str("</body></html>");
        html
    }
}

impl PageSession for FakeSession {
    fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        self.log.lock().unwrap().urls.push(url.to_string());
        if self.fail_goto {
            return Err(ScraperError::Navigation(format!("{url}: net::ERR_CONNECTION_RESET")));
        }
        Ok(())
    }

    fn is_ready(&mut self, _anchor: &str) -> Result<bool, ScraperError> {
        Ok(!self.never_ready)
    }

    fn content(&mut self) -> Result<String, ScraperError> {
        Ok(self.render())
    }

    fn submit_page_index(&mut self, input: &str, page: u32) -> Result<(), ScraperError> {
        self.log.lock().unwrap().advances.push((input.to_string(), page));
        let section = self
            .section_for_input(input)
            .ok_or_else(|| ScraperError::Navigation(format!("page input {input} not found")))?;
        self.typed.insert(section, page);
        if !self.stale_submit {
            self.current.insert(section, page);
        }
        Ok(())
    }

    fn current_page_index(&mut self, input: &str) -> Result<Option<u32>, ScraperError> {
        Ok(self.section_for_input(input).map(|s| self.shown_index(s)))
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.closed += 1;
        }
    }
}
