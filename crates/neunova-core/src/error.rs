use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid page selection: {0}")]
    InvalidSelection(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),
}

impl From<zip::result::ZipError> for PdfError {
    fn from(err: zip::result::ZipError) -> Self {
        PdfError::ArchiveError(err.to_string())
    }
}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::ArchiveError(err.to_string())
    }
}
