use crate::domain::ListingRecord;
use crate::spreadsheets::{ExportError, OutputMode};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const SHEET_NAME: &str = "Auctions";

fn build_workbook(records: &[ListingRecord], mode: OutputMode) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();

    // Headers
    for (col, header) in mode.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    // Rows. Everything is written as text; money and parcel values keep the
    // exact formatting the site shows.
    for (i, record) in records.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in mode.row(record).iter().enumerate() {
            worksheet.write_string(r, col as u16, value)?;
        }
    }

    worksheet.autofit();
    Ok(workbook)
}

pub fn export_listings_xlsx(records: &[ListingRecord], mode: OutputMode) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(records, mode)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn save_listings_xlsx(path: &Path, records: &[ListingRecord], mode: OutputMode) -> Result<(), ExportError> {
    let mut workbook = build_workbook(records, mode)?;
    workbook.save(path)?;
    Ok(())
}
