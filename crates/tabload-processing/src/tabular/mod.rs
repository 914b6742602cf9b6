//! Tabular parser: filename suffix decides the format, the bytes become a [`ParsedTable`].

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;

use std::time::Instant;

use tabload_core::{FileKind, ParsedTable, UploadedFile};

use crate::error::{ParseError, ParseResult};

/// Determine the file kind from its name, failing for anything but `.csv`, `.xls`, `.xlsx`.
pub fn detect_kind(filename: &str) -> ParseResult<FileKind> {
    FileKind::from_filename(filename)
        .ok_or_else(|| ParseError::UnsupportedFileType(filename.to_string()))
}

/// Parse `bytes` as the table format implied by `filename`.
pub fn parse_table(bytes: &[u8], filename: &str) -> ParseResult<ParsedTable> {
    let kind = detect_kind(filename)?;
    let start = Instant::now();

    let table = match kind {
        FileKind::Csv => csv::parse_csv(bytes)?,
        #[cfg(feature = "excel")]
        FileKind::Excel => excel::parse_excel(bytes)?,
        #[cfg(not(feature = "excel"))]
        FileKind::Excel => return Err(ParseError::ExcelDisabled),
    };

    tracing::debug!(
        filename = %filename,
        kind = %kind,
        size_bytes = bytes.len(),
        rows = table.row_count(),
        columns = table.column_count(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Parsed tabular upload"
    );

    Ok(table)
}

/// Parse an uploaded file. The file keeps its bytes, so it can still be placed in storage.
pub fn parse_upload(file: &UploadedFile) -> ParseResult<ParsedTable> {
    parse_table(&file.content, &file.filename)
}

/// Header cells that are blank are named `column_<n>` (1-based).
pub(crate) fn header_names<I>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    cells
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

/// Empty (or whitespace-only) cells are stored as `None`.
pub(crate) fn cell_value(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
