//! CSV parsing.

use tabload_core::ParsedTable;

use super::{cell_value, header_names};
use crate::error::{ParseError, ParseResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse CSV bytes. The first record is the header; records may vary in length.
pub fn parse_csv(bytes: &[u8]) -> ParseResult<ParsedTable> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::Malformed("file has no header row".to_string()));
    }
    let column_names = header_names(headers.iter().map(str::to_string));

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(cell_value).collect());
    }

    Ok(ParsedTable::new(column_names, rows))
}
