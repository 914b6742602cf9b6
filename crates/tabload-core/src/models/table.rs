use std::fmt::{Display, Formatter, Result as FmtResult};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::PREVIEW_ROWS;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Tabular file formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Excel,
}

impl FileKind {
    /// Determine the kind from the filename suffix (case-insensitive).
    ///
    /// `.csv` is CSV, `.xls` and `.xlsx` are spreadsheets, anything else is unsupported.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Some(FileKind::Csv)
        } else if lower.ends_with(".xls") || lower.ends_with(".xlsx") {
            Some(FileKind::Excel)
        } else {
            None
        }
    }

    /// MIME type for the exact suffix, so `.xls` and `.xlsx` are stored as what they are.
    pub fn content_type_for(filename: &str) -> Option<&'static str> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Some("text/csv")
        } else if lower.ends_with(".xlsx") {
            Some(XLSX_CONTENT_TYPE)
        } else if lower.ends_with(".xls") {
            Some("application/vnd.ms-excel")
        } else {
            None
        }
    }
}

impl Display for FileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileKind::Csv => write!(f, "csv"),
            FileKind::Excel => write!(f, "excel"),
        }
    }
}

/// A file received in one request. Never persisted unless explicitly placed in storage.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    /// Reference-counted, so preview and storage placement can both read the full content.
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_filename(&self.filename)
    }

    pub fn content_type(&self) -> Option<&'static str> {
        FileKind::content_type_for(&self.filename)
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// A fully materialized table plus its display sample.
///
/// Every row (including the sample) has exactly `column_count` cells: short rows are padded
/// with empty cells and long rows are truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    column_names: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    sample_rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn new(column_names: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = column_names.len();
        let rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        let sample_rows = rows
            .iter()
            .take(PREVIEW_ROWS)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.clone().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            column_names,
            rows,
            sample_rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Full row set; `None` marks an empty cell.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// First rows, stringified with empty cells rendered blank.
    pub fn sample_rows(&self) -> &[Vec<String>] {
        &self.sample_rows
    }

    pub fn preview(&self) -> TablePreview {
        TablePreview {
            row_count: self.row_count(),
            column_count: self.column_count(),
            columns: self.column_names.clone(),
            sample_rows: self.sample_rows.clone(),
        }
    }
}

/// Serializable summary of a [`ParsedTable`] for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePreview {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
}
