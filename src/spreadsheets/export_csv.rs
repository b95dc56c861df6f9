use crate::domain::ListingRecord;
use crate::spreadsheets::{ExportError, OutputMode};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the header row and one row per record.
pub fn write_listings_csv<W: Write>(writer: W, records: &[ListingRecord], mode: OutputMode) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(mode.columns())?;
    for record in records {
        wtr.write_record(mode.row(record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_listings_csv(records: &[ListingRecord], mode: OutputMode) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    write_listings_csv(&mut buffer, records, mode)?;
    Ok(buffer)
}

pub fn save_listings_csv(path: &Path, records: &[ListingRecord], mode: OutputMode) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_listings_csv(file, records, mode)
}
