//! MySQL statement execution and row conversion.

use crate::Result;
use crate::adapters::helpers::{encode_binary, format_naive_datetime, is_select_statement};
use crate::error::DbChatError;
use crate::models::{QueryResult, Row as ResultRow};
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, MySqlPool, Row};

/// Runs a statement, choosing the row or affected-count path by its leading token.
pub(crate) async fn execute_query(pool: &MySqlPool, query: &str) -> Result<QueryResult> {
    if is_select_statement(query) {
        let rows = sqlx::query(query)
            .fetch_all(pool)
            .await
            .map_err(|e| DbChatError::query_failed("MySQL query failed", e))?;
        tracing::debug!("MySQL query returned {} rows", rows.len());
        Ok(QueryResult::from_rows(rows.iter().map(row_to_json).collect()))
    } else {
        let done = sqlx::raw_sql(query)
            .execute(pool)
            .await
            .map_err(|e| DbChatError::query_failed("MySQL statement failed", e))?;
        Ok(QueryResult::affected(done.rows_affected()))
    }
}

/// Converts a row into a column-name keyed map. Later duplicate names win.
fn row_to_json(row: &MySqlRow) -> ResultRow {
    let mut map = ResultRow::new();
    for column in row.columns() {
        map.insert(
            column.name().to_string(),
            extract_column_value(row, column.ordinal()),
        );
    }
    map
}

/// Extract a column value as a JSON value, trying types in order of likelihood.
fn extract_column_value(row: &MySqlRow, index: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(JsonValue::Null, JsonValue::String);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(JsonValue::Null, |n| JsonValue::Number(n.into()));
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
        return v.map_or(JsonValue::Null, |n| JsonValue::Number(n.into()));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map_or(JsonValue::Null, JsonValue::Number);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(index) {
        return v
            .and_then(|f| serde_json::Number::from_f64(f64::from(f)))
            .map_or(JsonValue::Null, JsonValue::Number);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map_or(JsonValue::Null, JsonValue::Bool);
    }
    if let Ok(v) = row.try_get::<Option<sqlx::types::BigDecimal>, _>(index) {
        return v.map_or(JsonValue::Null, |d| JsonValue::String(d.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
        return v.map_or(JsonValue::Null, |t| {
            JsonValue::String(format_naive_datetime(&t))
        });
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
        return v.map_or(JsonValue::Null, |t| JsonValue::String(t.to_rfc3339()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return v.map_or(JsonValue::Null, |d| JsonValue::String(d.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(index) {
        return v.map_or(JsonValue::Null, |t| JsonValue::String(t.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<JsonValue>, _>(index) {
        return v.unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(JsonValue::Null, |b| encode_binary(&b));
    }

    // Default to null for unsupported types
    JsonValue::Null
}
