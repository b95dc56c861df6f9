// responses/download.rs
use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Return XLSX file as HTTP response
pub fn xlsx_response(buffer: Vec<u8>, filename: &str) -> ResultResp {
    attachment(buffer, filename, XLSX_CONTENT_TYPE)
}

pub fn csv_response(buffer: Vec<u8>, filename: &str) -> ResultResp {
    attachment(buffer, filename, mime::TEXT_CSV_UTF_8.as_ref())
}

fn attachment(buffer: Vec<u8>, filename: &str, content_type: &str) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(buffer))
        .map_err(|_| ServerError::InternalError)
}
