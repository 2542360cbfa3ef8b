pub mod format;
pub mod ocr;
pub mod types;

pub use format::*;
pub use ocr::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format for OCR")]
    UnsupportedFormat,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("OCR service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Failed to parse OCR response: {0}")]
    ResponseParsing(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),
}
