use tabload_core::AppError;
use thiserror::Error;

/// Convenience result type for parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Failures of the tabular parser.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The filename suffix is none of `.csv`, `.xls`, `.xlsx`.
    #[error("'{0}' is not a .csv, .xls or .xlsx file")]
    UnsupportedFileType(String),

    /// The bytes could not be read as a table.
    #[error("{0}")]
    Malformed(String),

    /// Spreadsheet support was compiled out.
    #[error("spreadsheet support is not enabled in this build")]
    ExcelDisabled,
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Malformed(format!("invalid CSV: {}", err))
    }
}

#[cfg(feature = "excel")]
impl From<calamine::Error> for ParseError {
    fn from(err: calamine::Error) -> Self {
        ParseError::Malformed(format!("invalid spreadsheet: {}", err))
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedFileType(name) => AppError::UnsupportedFileType(name),
            ParseError::Malformed(msg) => AppError::MalformedTableData(msg),
            ParseError::ExcelDisabled => AppError::UnsupportedFileType(err.to_string()),
        }
    }
}
