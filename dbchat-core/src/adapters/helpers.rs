//! Helper utilities shared by the engine adapters.
//!
//! DDL rendering and statement classification live here so the three engines
//! produce identically shaped output.

use crate::models::{ColumnDescriptor, DatabaseSchema, TableSchema};
use regex::Regex;
use std::sync::OnceLock;

/// Leading `SELECT` keyword, case-insensitive, after optional whitespace.
fn select_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^\s*select\b").expect("Invalid select pattern"))
}

/// Returns true if the statement takes the row-returning path.
///
/// Only the leading token is inspected: `WITH ... SELECT` and `EXEC` go down the
/// mutation path.
pub fn is_select_statement(query: &str) -> bool {
    select_pattern().is_match(query)
}

/// Renders one column as a DDL line body: `name type[ NOT NULL][ DEFAULT x][ PRIMARY KEY]`.
pub fn render_column(column: &ColumnDescriptor) -> String {
    let mut line = format!("{} {}", column.name, column.data_type);
    if !column.nullable {
        line.push_str(" NOT NULL");
    }
    if let Some(default) = column.default_value.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(" DEFAULT ");
        line.push_str(default);
    }
    if column.is_primary_key {
        line.push_str(" PRIMARY KEY");
    }
    line
}

/// Renders a table as a canonical `CREATE TABLE` statement.
///
/// Keys beyond the inline `PRIMARY KEY` marker, indexes and foreign keys are not
/// reconstructed.
///
/// # Example
/// ```rust
/// use dbchat_core::adapters::helpers::render_create_table;
/// use dbchat_core::models::{ColumnDescriptor, TableSchema};
///
/// let table = TableSchema::new(
///     "customers",
///     vec![
///         ColumnDescriptor::new("id", "int").primary_key(),
///         ColumnDescriptor::new("name", "varchar(100)"),
///     ],
/// );
/// assert_eq!(
///     render_create_table(&table),
///     "CREATE TABLE customers (\n  id int NOT NULL PRIMARY KEY,\n  name varchar(100)\n);"
/// );
/// ```
pub fn render_create_table(table: &TableSchema) -> String {
    let lines: Vec<String> = table.columns.iter().map(render_column).collect();
    format!("CREATE TABLE {} (\n  {}\n);", table.name, lines.join(",\n  "))
}

/// Builds a schema whose `raw_ddl` is rendered from `tables`, one entry per
/// table in the same order.
pub fn assemble_schema(name: impl Into<String>, tables: Vec<TableSchema>) -> DatabaseSchema {
    let raw_ddl = tables.iter().map(render_create_table).collect();
    DatabaseSchema {
        name: name.into(),
        tables,
        raw_ddl,
    }
}

/// Encodes binary column data for JSON output.
pub fn encode_binary(bytes: &[u8]) -> serde_json::Value {
    use base64::Engine as _;
    serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// ISO-8601 rendering of a zone-less timestamp, e.g. `2024-05-01T09:30:00`.
pub fn format_naive_datetime(value: &chrono::NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_select_statement() {
        assert!(is_select_statement("SELECT 1"));
        assert!(is_select_statement("  select * from t"));
        assert!(is_select_statement("\n\tSeLeCt\n1"));
        assert!(!is_select_statement("UPDATE t SET x = 1"));
        assert!(!is_select_statement("selection_log"));
        assert!(!is_select_statement("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(!is_select_statement(""));
    }

    #[test]
    fn test_render_column_annotations() {
        let column = ColumnDescriptor::new("status", "varchar(20)")
            .not_null()
            .with_default("'new'");
        assert_eq!(render_column(&column), "status varchar(20) NOT NULL DEFAULT 'new'");

        let empty_default = ColumnDescriptor::new("note", "text").with_default("");
        assert_eq!(render_column(&empty_default), "note text");
    }

    #[test]
    fn test_assemble_schema_keeps_ddl_aligned() {
        let tables = vec![
            TableSchema::new("a", vec![ColumnDescriptor::new("id", "int").primary_key()]),
            TableSchema::new("b", vec![ColumnDescriptor::new("a_id", "int")]),
        ];
        let schema = assemble_schema("db", tables);
        assert_eq!(schema.raw_ddl.len(), schema.tables.len());
        for (table, ddl) in schema.tables.iter().zip(&schema.raw_ddl) {
            assert!(ddl.starts_with(&format!("CREATE TABLE {} (", table.name)));
            for column in &table.columns {
                assert!(ddl.contains(&column.name));
            }
        }
    }

    #[test]
    fn test_format_naive_datetime() {
        let value = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(format_naive_datetime(&value), "2024-05-01T09:30:00");
    }

    #[test]
    fn test_encode_binary() {
        assert_eq!(encode_binary(b"hi"), serde_json::json!("aGk="));
    }
}
