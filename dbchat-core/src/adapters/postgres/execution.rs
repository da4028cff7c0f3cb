//! PostgreSQL statement execution and row conversion.

use crate::Result;
use crate::adapters::helpers::{encode_binary, format_naive_datetime, is_select_statement};
use crate::error::DbChatError;
use crate::models::{QueryResult, Row as ResultRow};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgHasArrayType, PgRow, PgTypeKind};
use sqlx::{Column, Decode, PgPool, Postgres, Row, Type, ValueRef};

/// Runs a statement, choosing the row or affected-count path by its leading token.
pub(crate) async fn execute_query(pool: &PgPool, query: &str) -> Result<QueryResult> {
    if is_select_statement(query) {
        let rows = sqlx::query(query)
            .fetch_all(pool)
            .await
            .map_err(|e| DbChatError::query_failed("PostgreSQL query failed", e))?;
        tracing::debug!("PostgreSQL query returned {} rows", rows.len());
        Ok(QueryResult::from_rows(rows.iter().map(row_to_json).collect()))
    } else {
        let done = sqlx::raw_sql(query)
            .execute(pool)
            .await
            .map_err(|e| DbChatError::query_failed("PostgreSQL statement failed", e))?;
        Ok(QueryResult::affected(done.rows_affected()))
    }
}

/// Converts a row into a column-name keyed map. Later duplicate names win.
fn row_to_json(row: &PgRow) -> ResultRow {
    let mut map = ResultRow::new();
    for column in row.columns() {
        map.insert(
            column.name().to_string(),
            extract_column_value(row, column.ordinal()),
        );
    }
    map
}

fn number<N: Into<serde_json::Number>>(value: Option<N>) -> JsonValue {
    value.map_or(JsonValue::Null, |n| JsonValue::Number(n.into()))
}

fn float(value: Option<f64>) -> JsonValue {
    value
        .and_then(serde_json::Number::from_f64)
        .map_or(JsonValue::Null, JsonValue::Number)
}

/// Decodes a one-dimensional array column, keeping NULL elements as `null`.
fn array_value<T>(row: &PgRow, index: usize, convert: fn(T) -> JsonValue) -> Option<JsonValue>
where
    T: for<'r> Decode<'r, Postgres> + Type<Postgres> + PgHasArrayType,
{
    let items = row.try_get::<Option<Vec<Option<T>>>, _>(index).ok()?;
    Some(items.map_or(JsonValue::Null, |items| {
        JsonValue::Array(
            items
                .into_iter()
                .map(|item| item.map_or(JsonValue::Null, convert))
                .collect(),
        )
    }))
}

/// Extract a column value as a JSON value.
///
/// PostgreSQL decoding is strict about widths, so each integer and float size
/// is tried on its own.
fn extract_column_value(row: &PgRow, index: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(JsonValue::Null, JsonValue::String);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
        return number(v);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return number(v);
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(index) {
        return number(v);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return float(v);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(index) {
        return float(v.map(f64::from));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map_or(JsonValue::Null, JsonValue::Bool);
    }
    if let Ok(v) = row.try_get::<Option<sqlx::types::BigDecimal>, _>(index) {
        return v.map_or(JsonValue::Null, |d| JsonValue::String(d.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<sqlx::types::Uuid>, _>(index) {
        return v.map_or(JsonValue::Null, |u| JsonValue::String(u.to_string()));
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

    if let Some(v) = array_value::<String>(row, index, JsonValue::String) {
        return v;
    }
    if let Some(v) = array_value::<i32>(row, index, |n| JsonValue::Number(n.into())) {
        return v;
    }
    if let Some(v) = array_value::<i64>(row, index, |n| JsonValue::Number(n.into())) {
        return v;
    }
    if let Some(v) = array_value::<f64>(row, index, |f| float(Some(f))) {
        return v;
    }
    if let Some(v) = array_value::<bool>(row, index, JsonValue::Bool) {
        return v;
    }

    fallback_text(row, index)
}

/// Last resort for types without a typed decode.
///
/// Enums travel as their label, so they are read as text. Anything else that
/// is not valid text stays `null`.
fn fallback_text(row: &PgRow, index: usize) -> JsonValue {
    let Ok(raw) = row.try_get_raw(index) else {
        return JsonValue::Null;
    };
    if raw.is_null() {
        return JsonValue::Null;
    }
    let is_enum = matches!(raw.type_info().kind(), PgTypeKind::Enum(_));

    match row.try_get_unchecked::<String, _>(index) {
        Ok(text) if is_enum || !text.chars().any(char::is_control) => JsonValue::String(text),
        _ => {
            tracing::debug!(
                "PostgreSQL column {} has an unsupported type; returning null",
                index
            );
            JsonValue::Null
        }
    }
}
