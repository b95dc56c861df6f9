pub mod export_csv;
pub mod export_xlsx;

pub use export_csv::{export_listings_csv, save_listings_csv};
pub use export_xlsx::{export_listings_xlsx, save_listings_xlsx};

use crate::domain::ListingRecord;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("could not write export: {0}")]
    Io(#[from] std::io::Error),
}

const SINGLE_COLUMNS: &[&str] = &[
    "Case Status",
    "Case #",
    "Parcel ID",
    "Property Address",
    "City",
    "ZIP",
    "Appraised Value",
    "Opening Bid",
    "Deposit Requirement",
];

const MULTI_COLUMNS: &[&str] = &[
    "Case Status",
    "Case #",
    "Parcel ID",
    "Property Address",
    "City",
    "ZIP",
    "Appraised Value",
    "Opening Bid",
    "Deposit Requirement",
    "Auction Starts",
    "County",
    "Section",
    "Auction Date",
];

/// Column set of an export. One county on one date needs no context columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Single,
    Multi,
}

impl OutputMode {
    pub fn for_run(counties: usize, from: NaiveDate, to: NaiveDate) -> Self {
        if counties == 1 && from == to {
            OutputMode::Single
        } else {
            OutputMode::Multi
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            OutputMode::Single => SINGLE_COLUMNS,
            OutputMode::Multi => MULTI_COLUMNS,
        }
    }

    pub fn row(&self, record: &ListingRecord) -> Vec<String> {
        let f = &record.fields;
        let mut row = vec![
            f.case_status.clone(),
            f.case_number.clone(),
            f.parcel_id.clone(),
            f.property_address.clone(),
            f.city.clone(),
            f.zip.clone(),
            f.appraised_value.clone(),
            f.opening_bid.clone(),
            f.deposit_requirement.clone(),
        ];
        if *self == OutputMode::Multi {
            row.push(f.auction_starts.clone());
            row.push(record.county.clone());
            row.push(record.section.label().to_string());
            row.push(record.auction_date.format("%m/%d/%Y").to_string());
        }
        row
    }
}

/// `auction_details_20241018.csv` or `auction_details_20241001_20241031.xlsx`.
pub fn export_filename(from: NaiveDate, to: NaiveDate, extension: &str) -> String {
    let stamp = |d: NaiveDate| d.format("%Y%m%d").to_string();
    if from == to {
        format!("auction_details_{}.{extension}", stamp(from))
    } else {
        format!("auction_details_{}_{}.{extension}", stamp(from), stamp(to))
    }
}
