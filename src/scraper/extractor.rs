// extractor.rs

use crate::domain::listing::{pad_parcel_id, split_city_zip, ListingFields};
use crate::scraper::site::{compile, SiteLayout};
use crate::scraper::ScraperError;
use scraper::{ElementRef, Selector};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Detail lines a positional block must have before any slot is trusted.
pub const MIN_POSITIONAL_LINES: usize = 8;

/// Slot order of the detail lines in a rendered listing. An empty prefix is the
/// unlabeled "City, ZIP" line.
const POSITIONAL_SLOTS: [&str; 8] = [
    "Case Status:",
    "Case #:",
    "Parcel ID:",
    "Property Address:",
    "",
    "Appraised Value:",
    "Opening Bid:",
    "Deposit Requirement:",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    LabeledRows,
    PositionalLines,
    /// Labeled rows, falling back to positional lines when a block has none.
    Auto,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "labeled" | "labeled-rows" | "rows" => Ok(Strategy::LabeledRows),
            "positional" | "positional-lines" | "lines" => Ok(Strategy::PositionalLines),
            "auto" => Ok(Strategy::Auto),
            other => Err(format!("unknown extraction strategy {other:?}")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::LabeledRows => "labeled",
            Strategy::PositionalLines => "positional",
            Strategy::Auto => "auto",
        })
    }
}

/// Tolerant mapper from one listing block to `ListingFields`.
pub struct Extractor {
    strategy: Strategy,
    block: Selector,
    details: Selector,
    row: Selector,
    label: Selector,
    value: Selector,
    auction_starts: Selector,
}

impl Extractor {
    pub fn new(layout: &SiteLayout, strategy: Strategy) -> Result<Self, ScraperError> {
        Ok(Self {
            strategy,
            block: compile(&layout.block)?,
            details: compile(&layout.details)?,
            row: compile(&layout.row)?,
            label: compile(&layout.label)?,
            value: compile(&layout.value)?,
            auction_starts: compile(&layout.auction_starts)?,
        })
    }

    /// All listing blocks below `scope`.
    pub fn blocks<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        scope.select(&self.block).collect()
    }

    /// Maps a block onto the schema, or `None` when nothing labeled could be read.
    pub fn extract(&self, block: ElementRef<'_>) -> Option<ListingFields> {
        let mut fields = match self.strategy {
            Strategy::LabeledRows => self.labeled(block),
            Strategy::PositionalLines => self.positional(block),
            Strategy::Auto => self.labeled(block).or_else(|| self.positional(block)),
        }?;

        if let Some(starts) = block.select(&self.auction_starts).next() {
            fields.auction_starts = element_text(starts);
        }
        Some(fields)
    }

    fn labeled(&self, block: ElementRef<'_>) -> Option<ListingFields> {
        let mut labels = HashMap::new();

        for (i, row) in block.select(&self.row).enumerate() {
            let label = row.select(&self.label).next().map(element_text);
            let value = row.select(&self.value).next().map(element_text);

            match (label, value) {
                (Some(label), Some(value)) => {
                    labels.insert(normalize_label(&label), value);
                }
                _ => warn!(row = i + 1, "Skipping listing row without label/value cells"),
            }
        }

        if labels.is_empty() {
            return None;
        }
        Some(ListingFields::from_labels(&labels))
    }

    fn positional(&self, block: ElementRef<'_>) -> Option<ListingFields> {
        let scope = block.select(&self.details).next().unwrap_or(block);
        positional_fields(&rendered_lines(scope))
    }
}

/// Assigns rendered lines to fields by slot, accepting a line only when it
/// carries the slot's label. Blocks shorter than eight lines are skipped.
pub fn positional_fields(lines: &[String]) -> Option<ListingFields> {
    if lines.len() < MIN_POSITIONAL_LINES {
        debug!(lines = lines.len(), "Skipping short listing block");
        return None;
    }

    let mut slots: [Option<String>; 8] = Default::default();
    for (i, prefix) in POSITIONAL_SLOTS.iter().enumerate() {
        let line = lines[i].trim();
        slots[i] = if prefix.is_empty() {
            // City/ZIP carries no label but always a comma.
            (!line.contains(':') && line.contains(',')).then(|| line.to_string())
        } else {
            line.strip_prefix(prefix).map(|v| v.trim().to_string())
        };
        if slots[i].is_none() {
            warn!(slot = i, expected = prefix, found = line, "Positional line does not match its label");
        }
    }

    if slots.iter().all(Option::is_none) {
        return None;
    }

    let [status, case, parcel, address, city_zip, appraised, opening, deposit] = slots;
    let (city, zip) = split_city_zip(city_zip.as_deref().unwrap_or(""));

    Some(ListingFields {
        case_status: status.unwrap_or_default(),
        case_number: case.unwrap_or_default(),
        parcel_id: pad_parcel_id(parcel.as_deref().unwrap_or("")),
        property_address: address.unwrap_or_default(),
        city,
        zip,
        appraised_value: appraised.unwrap_or_default(),
        opening_bid: opening.unwrap_or_default(),
        deposit_requirement: deposit.unwrap_or_default(),
        auction_starts: String::new(),
    })
}

/// Text lines of a fragment the way a reader sees them: a dangling
/// "Label:" fragment is joined with the value that follows it.
pub fn rendered_lines(scope: ElementRef<'_>) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut pending_label = false;

    for piece in scope.text().map(str::trim).filter(|t| !t.is_empty()) {
        let is_label = piece.ends_with(':');
        if pending_label && !is_label {
            if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(piece);
            }
            pending_label = false;
            continue;
        }
        lines.push(piece.to_string());
        pending_label = is_label;
    }

    lines
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_label(raw: &str) -> String {
    raw.trim().trim_end_matches(':').trim().to_string()
}
