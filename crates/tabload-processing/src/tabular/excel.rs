//! Spreadsheet parsing (`.xls` / `.xlsx`).
//!
//! Only the first worksheet is read. The first non-empty row is the header; trailing rows
//! that are entirely empty are dropped.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tabload_core::ParsedTable;

use super::header_names;
use crate::error::{ParseError, ParseResult};

pub fn parse_excel(bytes: &[u8]) -> ParseResult<ParsedTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParseError::Malformed("workbook has no sheets".to_string()))?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows().skip_while(|row| is_empty_row(row));
    let header = rows.next().ok_or_else(|| {
        ParseError::Malformed(format!("sheet '{}' has no header row", sheet))
    })?;
    let column_names = header_names(header.iter().map(cell_to_string));

    let mut data: Vec<Vec<Option<String>>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    while data
        .last()
        .is_some_and(|row| row.iter().all(Option::is_none))
    {
        data.pop();
    }

    Ok(ParsedTable::new(column_names, data))
}

fn is_empty_row(row: &[Data]) -> bool {
    row.iter().all(|c| matches!(c, Data::Empty))
}

fn cell_value(c: &Data) -> Option<String> {
    match c {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        other => Some(cell_to_string(other)),
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn people_xlsx() -> Vec<u8> {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 0, "id").unwrap();
        ws.write_string(0, 1, "name").unwrap();
        ws.write_string(0, 2, "score").unwrap();
        ws.write_number(1, 0, 1).unwrap();
        ws.write_string(1, 1, "Ada").unwrap();
        ws.write_number(1, 2, 98.5).unwrap();
        ws.write_number(2, 0, 2).unwrap();
        ws.write_string(2, 1, "Grace").unwrap();
        wb.save_to_buffer().unwrap()
    }

    #[test]
    fn test_parse_first_sheet() {
        let table = parse_excel(&people_xlsx()).unwrap();
        assert_eq!(table.column_names(), &["id", "name", "score"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.sample_rows()[0], vec!["1", "Ada", "98.5"]);
        assert_eq!(table.sample_rows()[1], vec!["2", "Grace", ""]);
    }

    #[test]
    fn test_leading_blank_rows_are_skipped() {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(2, 0, "region").unwrap();
        ws.write_string(3, 0, "north").unwrap();
        let bytes = wb.save_to_buffer().unwrap();

        let table = parse_excel(&bytes).unwrap();
        assert_eq!(table.column_names(), &["region"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_garbage_bytes_are_malformed() {
        let err = parse_excel(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn test_dispatch_by_suffix() {
        let table = crate::parse_table(&people_xlsx(), "People.XLSX").unwrap();
        assert_eq!(table.column_count(), 3);
    }
}
