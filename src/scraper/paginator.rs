// paginator.rs

use crate::config::Timing;
use crate::domain::{ListingFields, Section, SectionStatus};
use crate::scraper::browser::{wait_until, PageSession};
use crate::scraper::extractor::Extractor;
use crate::scraper::site::{compile, SectionLayout, SiteLayout};
use crate::scraper::ScraperError;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SectionScrape {
    pub section: Section,
    pub status: SectionStatus,
    pub listings: Vec<ListingFields>,
}

struct CompiledSection<'a> {
    layout: &'a SectionLayout,
    container: Selector,
    max_pages: Selector,
}

/// Walks the pages of each section in turn. Pages are strictly sequential:
/// advancing replaces the listing widget in place.
pub struct Paginator<'a> {
    layout: &'a SiteLayout,
    extractor: &'a Extractor,
    timing: Timing,
    sections: Vec<CompiledSection<'a>>,
}

impl<'a> Paginator<'a> {
    pub fn new(layout: &'a SiteLayout, extractor: &'a Extractor, timing: Timing) -> Result<Self, ScraperError> {
        let sections = layout
            .sections
            .iter()
            .map(|s| -> Result<CompiledSection<'a>, ScraperError> {
                Ok(CompiledSection {
                    layout: s,
                    container: compile(&s.container)?,
                    max_pages: compile(&s.max_pages)?,
                })
            })
            .collect::<Result<Vec<_>, ScraperError>>()?;

        Ok(Self {
            layout,
            extractor,
            timing,
            sections,
        })
    }

    pub fn scrape_all(&self, session: &mut dyn PageSession) -> Result<Vec<SectionScrape>, ScraperError> {
        let mut scraped = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            scraped.push(self.scrape_section(session, section)?);
        }
        Ok(scraped)
    }

    fn scrape_section(
        &self,
        session: &mut dyn PageSession,
        section: &CompiledSection<'_>,
    ) -> Result<SectionScrape, ScraperError> {
        let name = section.layout.section;
        let mut html = Html::parse_document(&session.content()?);

        let Some(max_pages) = read_max_pages(&html, &section.max_pages) else {
            debug!(section = %name, "No page-count indicator; section empty");
            return Ok(SectionScrape {
                section: name,
                status: SectionStatus::IndicatorMissing,
                listings: Vec::new(),
            });
        };

        let mut listings = Vec::new();
        let mut current: u32 = 1;
        let mut pages_read: u32 = 0;

        while current <= max_pages {
            let (blocks, found) = self.extract_page(&html, section);
            if blocks == 0 {
                debug!(section = %name, page = current, "No listings on page; stopping");
                break;
            }
            pages_read = current;
            debug!(section = %name, page = current, max_pages, blocks, records = found.len(), "Page extracted");
            listings.extend(found);

            if current >= max_pages {
                break;
            }
            let next = current + 1;
            if let Err(e) = self.advance(session, section, &html, next) {
                warn!(section = %name, page = next, "Could not advance page: {e}");
                break;
            }
            current = next;
            html = Html::parse_document(&session.content()?);
        }

        let status = if pages_read == 0 {
            SectionStatus::NoListings
        } else {
            SectionStatus::Paged { pages_read, max_pages }
        };
        info!(section = %name, ?status, records = listings.len(), "Section done");

        Ok(SectionScrape {
            section: name,
            status,
            listings,
        })
    }

    /// Number of listing blocks on the page and the records they yielded.
    fn extract_page(&self, html: &Html, section: &CompiledSection<'_>) -> (usize, Vec<ListingFields>) {
        let Some(container) = html.select(&section.container).next() else {
            return (0, Vec::new());
        };
        let blocks = self.extractor.blocks(container);
        let found = blocks
            .iter()
            .enumerate()
            .filter_map(|(i, block)| {
                let fields = self.extractor.extract(*block);
                if fields.is_none() {
                    warn!(block = i + 1, "Listing block yielded no fields; skipped");
                }
                fields
            })
            .collect();
        (blocks.len(), found)
    }

    /// Markup of the section's listing blocks, used to tell a reloaded page from the old one.
    fn listing_signature(&self, html: &Html, section: &CompiledSection<'_>) -> String {
        html.select(&section.container)
            .next()
            .map(|container| self.extractor.blocks(container).iter().map(|b| b.html()).collect())
            .unwrap_or_default()
    }

    /// Submits `page` and waits until the input shows it and the listings were replaced.
    fn advance(
        &self,
        session: &mut dyn PageSession,
        section: &CompiledSection<'_>,
        shown_html: &Html,
        page: u32,
    ) -> Result<(), ScraperError> {
        let input = section.layout.page_input.as_str();
        let before = self.listing_signature(shown_html, section);
        session.submit_page_index(input, page)?;

        let anchor = self.layout.anchor.as_str();
        wait_until(
            &format!("page {page} of {}", section.layout.section),
            self.timing.ready_timeout,
            self.timing.poll_interval,
            || {
                if session.current_page_index(input)? != Some(page) || !session.is_ready(anchor)? {
                    return Ok(false);
                }
                let html = Html::parse_document(&session.content()?);
                Ok(self.listing_signature(&html, section) != before)
            },
        )?;

        std::thread::sleep(self.timing.page_settle);
        Ok(())
    }
}

/// Reads the section's page count; `None` when the indicator is missing or unreadable.
fn read_max_pages(html: &Html, selector: &Selector) -> Option<u32> {
    let text: String = html.select(selector).next()?.text().collect();
    match text.trim().parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(indicator = %text.trim(), "Unreadable page-count indicator");
            None
        }
    }
}
