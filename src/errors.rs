// errors.rs
use crate::spreadsheets::ExportError;
use thiserror::Error;

/// Errors raised while serving a request. Each one renders as an HTML error page.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Spreadsheet Error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Export(_) | ServerError::InternalError => 500,
        }
    }
}
