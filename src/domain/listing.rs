// src/domain/listing.rs

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Width the county parcel numbers are zero-padded to.
pub const PARCEL_ID_WIDTH: usize = 9;
const ZIP_WIDTH: usize = 5;

/// One of the three independently paginated auction groups on a preview page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Section {
    Waiting,
    Running,
    Closed,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Waiting, Section::Running, Section::Closed];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Waiting => "Waiting",
            Section::Running => "Running",
            Section::Closed => "Closed",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The fixed field schema harvested from one listing block.
/// Every field is free text and defaults to an empty string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingFields {
    pub case_status: String,
    pub case_number: String,
    pub parcel_id: String,
    pub property_address: String,
    pub city: String,
    pub zip: String,
    pub appraised_value: String,
    pub opening_bid: String,
    pub deposit_requirement: String,
    pub auction_starts: String,
}

impl ListingFields {
    /// Maps a label → value table (labels already colon-stripped) onto the schema.
    /// The City/ZIP pair arrives under the empty label.
    pub fn from_labels(labels: &HashMap<String, String>) -> Self {
        let get = |key: &str| labels.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let (city, zip) = split_city_zip(&get(""));

        ListingFields {
            case_status: get("Case Status"),
            case_number: get("Case #"),
            parcel_id: pad_parcel_id(&get("Parcel ID")),
            property_address: get("Property Address"),
            city,
            zip,
            appraised_value: get("Appraised Value"),
            opening_bid: get("Opening Bid"),
            deposit_requirement: get("Deposit Requirement"),
            auction_starts: get("Auction Starts"),
        }
    }
}

/// A listing placed in the context it was scraped from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRecord {
    pub county: String,
    pub auction_date: NaiveDate,
    pub section: Section,
    pub fields: ListingFields,
}

impl ListingRecord {
    pub fn new(county: &str, auction_date: NaiveDate, section: Section, fields: ListingFields) -> Self {
        Self {
            county: county.to_string(),
            auction_date,
            section,
            fields,
        }
    }
}

/// Splits the combined "City, ZIP" cell on its first comma.
/// Without a comma the whole text is the city and the ZIP is empty.
pub fn split_city_zip(raw: &str) -> (String, String) {
    match raw.split_once(',') {
        Some((city, zip)) => {
            let zip: String = zip.trim().chars().take(ZIP_WIDTH).collect();
            (city.trim().to_string(), zip)
        }
        None => (raw.trim().to_string(), String::new()),
    }
}

/// Left-pads a parcel number with zeros to nine characters.
pub fn pad_parcel_id(raw: &str) -> String {
    let id = raw.trim();
    if id.is_empty() {
        return String::new();
    }
    format!("{id:0>width$}", width = PARCEL_ID_WIDTH)
}
