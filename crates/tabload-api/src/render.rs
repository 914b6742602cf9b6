//! HTML status page.

use std::fmt::Write;

use tabload_core::IngestionLogEntry;

use crate::history::RecentUploadRecord;
use crate::services::UploadOutcome;

/// Everything shown on the page.
pub struct StatusPage<'a> {
    pub buckets: &'a [String],
    pub datasets: &'a [String],
    pub default_dataset: &'a str,
    pub table_store_enabled: bool,
    pub recent_uploads: &'a [RecentUploadRecord],
    pub recent_ingests: &'a [IngestionLogEntry],
    pub outcome: Option<&'a UploadOutcome>,
    pub error: Option<&'a str>,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render_page(page: &StatusPage<'_>) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>tabload</title>\n</head>\n<body>\n<h1>Table upload</h1>\n",
    );

    if let Some(error) = page.error {
        let _ = writeln!(html, "<p class=\"error\">{}</p>", escape_html(error));
    }
    if let Some(outcome) = page.outcome {
        render_outcome(&mut html, outcome);
    }

    render_form(&mut html, page);
    render_recent_uploads(&mut html, page.recent_uploads);
    render_recent_ingests(&mut html, page.recent_ingests);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_outcome(html: &mut String, outcome: &UploadOutcome) {
    let preview = &outcome.preview;
    let _ = writeln!(
        html,
        "<section id=\"preview\">\n<h2>{}</h2>\n<p>Rows: {} &middot; Columns: {}</p>",
        escape_html(&outcome.filename),
        preview.row_count,
        preview.column_count
    );

    html.push_str("<table>\n<tr>");
    for column in &preview.columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr>\n");
    for row in &preview.sample_rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    if !outcome.placements.is_empty() {
        html.push_str("<ul class=\"placements\">\n");
        for placement in &outcome.placements {
            match &placement.result {
                Ok(stored) => {
                    let _ = writeln!(
                        html,
                        "<li>Uploaded to {} ({} bytes)</li>",
                        escape_html(&stored.display_name()),
                        stored.size_bytes
                    );
                }
                Err(error) => {
                    let _ = writeln!(
                        html,
                        "<li class=\"error\">Failed for {}: {}</li>",
                        escape_html(&placement.bucket),
                        escape_html(error)
                    );
                }
            }
        }
        html.push_str("</ul>\n");
    }

    if let Some(load) = &outcome.load {
        let _ = writeln!(
            html,
            "<p class=\"loaded\">Loaded {} rows into {}</p>",
            load.rows_loaded,
            escape_html(&load.destination.qualified_name())
        );
    }

    html.push_str("</section>\n");
}

fn render_form(html: &mut String, page: &StatusPage<'_>) {
    html.push_str(
        "<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
         <p><input type=\"file\" name=\"file\" accept=\".csv,.xls,.xlsx\"></p>\n\
         <p><label>Folder <input type=\"text\" name=\"folder\"></label></p>\n",
    );

    if page.buckets.is_empty() {
        html.push_str("<p>No buckets configured.</p>\n");
    } else {
        html.push_str("<fieldset><legend>Buckets</legend>\n");
        for bucket in page.buckets {
            let bucket = escape_html(bucket);
            let _ = writeln!(
                html,
                "<label><input type=\"checkbox\" name=\"buckets\" value=\"{0}\" checked> {0}</label>",
                bucket
            );
        }
        html.push_str("</fieldset>\n");
    }

    if page.table_store_enabled {
        html.push_str("<p><label>Dataset <select name=\"dataset\">\n");
        for dataset in page.datasets {
            let selected = if dataset == page.default_dataset {
                " selected"
            } else {
                ""
            };
            let _ = writeln!(
                html,
                "<option value=\"{0}\"{1}>{0}</option>",
                escape_html(dataset),
                selected
            );
        }
        html.push_str(
            "</select></label>\n<label>or new dataset <input type=\"text\" name=\"new_dataset\">\
             </label></p>\n",
        );
    } else {
        html.push_str("<p>Table store not configured.</p>\n");
    }

    html.push_str(
        "<p><button name=\"action\" value=\"preview\">Preview</button>\n\
         <button name=\"action\" value=\"upload\">Upload</button>\n\
         <button name=\"action\" value=\"ingest\">Upload and load</button></p>\n</form>\n",
    );
}

fn render_recent_uploads(html: &mut String, uploads: &[RecentUploadRecord]) {
    html.push_str("<h2>Recent uploads</h2>\n");
    if uploads.is_empty() {
        html.push_str("<p>None yet.</p>\n");
        return;
    }
    html.push_str("<ul>\n");
    for upload in uploads {
        let ok = upload.placements.iter().filter(|p| p.is_ok()).count();
        let _ = writeln!(
            html,
            "<li>{} {} ({} rows) to {}/{} buckets</li>",
            upload.timestamp.format("%Y-%m-%d %H:%M:%S"),
            escape_html(&upload.filename),
            upload.rows,
            ok,
            upload.placements.len()
        );
    }
    html.push_str("</ul>\n");
}

fn render_recent_ingests(html: &mut String, ingests: &[IngestionLogEntry]) {
    html.push_str("<h2>Recent ingests</h2>\n");
    if ingests.is_empty() {
        html.push_str("<p>None yet.</p>\n");
        return;
    }
    html.push_str("<table>\n<tr><th>Time</th><th>Bucket</th><th>Object</th><th>Rows</th><th>Status</th></tr>\n");
    for entry in ingests {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            escape_html(&entry.bucket),
            escape_html(&entry.object_name),
            entry.rows_loaded,
            escape_html(&entry.status.to_string())
        );
    }
    html.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_page<'a>() -> StatusPage<'a> {
        StatusPage {
            buckets: &[],
            datasets: &[],
            default_dataset: "uploads",
            table_store_enabled: false,
            recent_uploads: &[],
            recent_ingests: &[],
            outcome: None,
            error: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">O'Brien & co</a>"),
            "&lt;a href=&quot;x&quot;&gt;O&#39;Brien &amp; co&lt;/a&gt;"
        );
    }

    #[test]
    fn test_error_is_escaped() {
        let page = StatusPage {
            error: Some("Unsupported file type: <script>.txt"),
            ..empty_page()
        };
        let html = render_page(&page);
        assert!(html.contains("Unsupported file type: &lt;script&gt;.txt"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_recent_ingests_show_status() {
        let ingests = vec![IngestionLogEntry::failure("b", "", "Missing event fields: name is blank")];
        let page = StatusPage {
            recent_ingests: &ingests,
            ..empty_page()
        };
        let html = render_page(&page);
        assert!(html.contains("ERROR: Missing event fields: name is blank"));
    }
}
