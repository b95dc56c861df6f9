pub mod errors;
pub mod html;
pub mod download;

pub use errors::{error_response, ResultResp};
pub use html::{html_response, redirect_response};
pub use download::{csv_response, xlsx_response};
