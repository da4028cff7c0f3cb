//! SQL Server statement execution and row conversion.

use super::connection::SqlServerClient;
use crate::Result;
use crate::adapters::helpers::{encode_binary, format_naive_datetime, is_select_statement};
use crate::error::DbChatError;
use crate::models::{QueryResult, Row as ResultRow};
use serde_json::Value as JsonValue;
use tiberius::{ColumnData, FromSql};

/// Runs a statement, choosing the row or affected-count path by its leading token.
pub(crate) async fn execute_query(client: &mut SqlServerClient, query: &str) -> Result<QueryResult> {
    if is_select_statement(query) {
        let rows = client
            .simple_query(query)
            .await
            .map_err(|e| DbChatError::query_failed("SQL Server query failed", e))?
            .into_first_result()
            .await
            .map_err(|e| DbChatError::query_failed("SQL Server query failed", e))?;
        tracing::debug!("SQL Server query returned {} rows", rows.len());
        Ok(QueryResult::from_rows(rows.into_iter().map(row_to_json).collect()))
    } else {
        let done = client
            .execute(query, &[])
            .await
            .map_err(|e| DbChatError::query_failed("SQL Server statement failed", e))?;
        Ok(QueryResult::affected(done.total()))
    }
}

/// Converts a row into a column-name keyed map. Later duplicate names win.
fn row_to_json(row: tiberius::Row) -> ResultRow {
    let names: Vec<String> = row
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();

    let mut map = ResultRow::new();
    for (name, data) in names.into_iter().zip(row) {
        map.insert(name, column_data_to_json(&data));
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

fn chrono_string<'a, T, F>(data: &'a ColumnData<'static>, render: F) -> JsonValue
where
    T: FromSql<'a>,
    F: FnOnce(T) -> String,
{
    match T::from_sql(data) {
        Ok(Some(value)) => JsonValue::String(render(value)),
        _ => JsonValue::Null,
    }
}

/// Converts one TDS value to JSON.
pub fn column_data_to_json(data: &ColumnData<'static>) -> JsonValue {
    match data {
        ColumnData::U8(v) => number(*v),
        ColumnData::I16(v) => number(*v),
        ColumnData::I32(v) => number(*v),
        ColumnData::I64(v) => number(*v),
        ColumnData::F32(v) => float(v.map(f64::from)),
        ColumnData::F64(v) => float(*v),
        ColumnData::Bit(v) => (*v).map_or(JsonValue::Null, JsonValue::Bool),
        ColumnData::String(v) => v
            .as_ref()
            .map_or(JsonValue::Null, |s| JsonValue::String(s.to_string())),
        ColumnData::Guid(v) => v
            .as_ref()
            .map_or(JsonValue::Null, |g| JsonValue::String(g.to_string())),
        ColumnData::Numeric(v) => v
            .as_ref()
            .map_or(JsonValue::Null, |n| JsonValue::String(n.to_string())),
        ColumnData::Binary(v) => v.as_ref().map_or(JsonValue::Null, |b| encode_binary(b)),
        ColumnData::Xml(v) => v.as_ref().map_or(JsonValue::Null, |x| {
            JsonValue::String(x.clone().into_owned().into_string())
        }),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            chrono_string(data, |t: chrono::NaiveDateTime| format_naive_datetime(&t))
        }
        ColumnData::Date(_) => chrono_string(data, |d: chrono::NaiveDate| d.to_string()),
        ColumnData::Time(_) => chrono_string(data, |t: chrono::NaiveTime| t.to_string()),
        ColumnData::DateTimeOffset(_) => {
            chrono_string(data, |t: chrono::DateTime<chrono::FixedOffset>| t.to_rfc3339())
        }
        #[allow(unreachable_patterns)]
        _ => JsonValue::Null,
    }
}
