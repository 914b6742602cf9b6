//! Destination naming rules.

use tabload_core::constants::INGESTION_LOG_TABLE;

use crate::error::{WarehouseError, WarehouseResult};

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Derive a table name from an object name.
///
/// Takes the base name after the last `/`, strips the last extension and replaces every
/// character outside `[A-Za-z0-9_]` with `_`. An empty result becomes `_`.
///
/// Different objects can map to the same name (`a/sales.csv`, `b/sales.xlsx`); the later load
/// replaces the earlier table.
pub fn sanitize_table_name(object_name: &str) -> String {
    let base = object_name.rsplit('/').next().unwrap_or(object_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => base,
    };

    let name: String = stem
        .chars()
        .map(|c| if is_identifier_char(c) { c } else { '_' })
        .collect();

    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}

/// Table names the loader must never replace. Identifiers compare case-insensitively.
pub fn is_reserved_table_name(table: &str) -> bool {
    table.eq_ignore_ascii_case(INGESTION_LOG_TABLE)
}

/// Datasets are named with letters, digits and underscores only.
pub fn validate_dataset_name(dataset: &str) -> WarehouseResult<()> {
    if dataset.is_empty() || !dataset.chars().all(is_identifier_char) {
        return Err(WarehouseError::InvalidName(format!(
            "dataset '{}' may only contain letters, digits and underscores",
            dataset
        )));
    }
    Ok(())
}

/// Double-quote an identifier for SQL.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote a string literal for SQL.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_examples() {
        assert_eq!(sanitize_table_name("sales.csv"), "sales");
        assert_eq!(sanitize_table_name("incoming/2024/Q1 sales.xlsx"), "Q1_sales");
        assert_eq!(sanitize_table_name("report.final.csv"), "report_final");
        assert_eq!(sanitize_table_name("no_extension"), "no_extension");
        assert_eq!(sanitize_table_name("dir/.csv"), "_");
        assert_eq!(sanitize_table_name("données-brutes.csv"), "donn_es_brutes");
    }

    #[test]
    fn test_names_collide_across_folders_and_formats() {
        assert_eq!(
            sanitize_table_name("a/sales.csv"),
            sanitize_table_name("b/sales.xlsx")
        );
    }

    #[test]
    fn test_log_table_name_is_reserved() {
        assert!(is_reserved_table_name(&sanitize_table_name("ingestion_log.csv")));
        assert!(is_reserved_table_name(&sanitize_table_name("x/ingestion-log.xlsx")));
        assert!(is_reserved_table_name("INGESTION_LOG"));
        assert!(!is_reserved_table_name("ingestion_log_2024"));
    }

    #[test]
    fn test_validate_dataset_name() {
        assert!(validate_dataset_name("uploads").is_ok());
        assert!(validate_dataset_name("sales_2024").is_ok());
        assert!(validate_dataset_name("").is_err());
        assert!(validate_dataset_name("sales-2024").is_err());
        assert!(validate_dataset_name("a.b").is_err());
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote_ident("my-project"), "\"my-project\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_literal("/tmp/it's.csv"), "'/tmp/it''s.csv'");
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(name in ".*") {
            let once = sanitize_table_name(&name);
            prop_assert_eq!(sanitize_table_name(&once), once.clone());
        }

        #[test]
        fn prop_sanitize_output_is_identifier(name in ".*") {
            let out = sanitize_table_name(&name);
            prop_assert!(!out.is_empty());
            prop_assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }
}
