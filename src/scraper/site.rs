// site.rs
//
// The DOM contract of the county sheriff-sale preview pages. The element ids
// and classes are owned by the auction site; everything that depends on them
// reads them from here.

use crate::domain::Section;
use crate::scraper::ScraperError;
use chrono::NaiveDate;
use scraper::Selector;
use url::Url;

pub const DEFAULT_DOMAIN: &str = "sheriffsaleauction.ohio.gov";

#[derive(Debug, Clone)]
pub struct SectionLayout {
    pub section: Section,
    pub container: String,
    pub max_pages: String,
    pub page_input: String,
}

impl SectionLayout {
    fn ohio(section: Section) -> Self {
        let code = match section {
            Section::Waiting => 'W',
            Section::Running => 'R',
            Section::Closed => 'C',
        };
        Self {
            section,
            container: format!("#Area_{code}"),
            max_pages: format!("#max{code}A"),
            page_input: format!("#curP{code}A"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteLayout {
    pub domain: String,
    /// Present once the listing widget has rendered.
    pub anchor: String,
    pub block: String,
    pub details: String,
    pub row: String,
    pub label: String,
    pub value: String,
    pub auction_starts: String,
    pub sections: Vec<SectionLayout>,
    pub block_markers: Vec<String>,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            anchor: "#Area_W".to_string(),
            block: ".AUCTION_ITEM".to_string(),
            details: ".AUCTION_DETAILS".to_string(),
            row: "table.ad_tab tr".to_string(),
            label: "th.AD_LBL".to_string(),
            value: "td.AD_DTA".to_string(),
            auction_starts: ".ASTAT_MSGB".to_string(),
            sections: Section::ALL.iter().map(|s| SectionLayout::ohio(*s)).collect(),
            block_markers: vec![
                "Access Denied".to_string(),
                "Request unsuccessful".to_string(),
                "Just a moment".to_string(),
                "Attention Required".to_string(),
            ],
        }
    }
}

impl SiteLayout {
    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn origin(&self, county: &str) -> Result<Url, ScraperError> {
        let slug = county.trim().to_ascii_lowercase();
        let valid = !slug.is_empty() && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(ScraperError::InvalidCounty(county.to_string()));
        }

        Url::parse(&format!("https://{slug}.{}/", self.domain))
            .map_err(|_| ScraperError::InvalidCounty(county.to_string()))
    }

    /// Preview page listing every auction scheduled for `date` in `county`.
    pub fn listing_url(&self, county: &str, date: NaiveDate) -> Result<Url, ScraperError> {
        let origin = self.origin(county)?;
        let raw = format!(
            "{origin}index.cfm?zaction=AUCTION&Zmethod=PREVIEW&AUCTIONDATE={}",
            date.format("%m/%d/%Y")
        );
        Url::parse(&raw).map_err(|e| ScraperError::Navigation(format!("{raw}: {e}")))
    }

    pub fn is_blocked_page(&self, text: &str) -> Option<&str> {
        self.block_markers
            .iter()
            .find(|marker| text.contains(marker.as_str()))
            .map(String::as_str)
    }
}

pub(crate) fn compile(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
