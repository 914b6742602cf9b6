//! Upload and notification fixtures.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rust_xlsxwriter::Workbook;

pub const SALES_CSV: &str = "id,amount\n1,10\n2,20\n3,30\n";

pub fn csv_part(filename: &str, content: &str) -> Part {
    Part::bytes(content.as_bytes().to_vec())
        .file_name(filename.to_string())
        .mime_type("text/csv")
}

/// Multipart form with a file and an action.
pub fn upload_form(filename: &str, content: &str, action: &str) -> MultipartForm {
    MultipartForm::new()
        .add_part("file", csv_part(filename, content))
        .add_text("action", action.to_string())
}

/// Two-sheet workbook; only the first sheet is read.
pub fn sales_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "region").expect("write");
    sheet.write_string(0, 1, "units").expect("write");
    sheet.write_string(1, 0, "north").expect("write");
    sheet.write_number(1, 1, 12).expect("write");
    sheet.write_string(2, 0, "south").expect("write");
    sheet.write_number(2, 1, 7.5).expect("write");
    let other = workbook.add_worksheet();
    other.write_string(0, 0, "ignored").expect("write");
    workbook.save_to_buffer().expect("save workbook")
}

/// Push envelope carrying `event` as base64 JSON.
pub fn push_envelope(event: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "message": {
            "data": STANDARD.encode(event.to_string()),
            "messageId": "1234567890",
        },
        "subscription": "projects/test-project/subscriptions/uploads",
    })
}
