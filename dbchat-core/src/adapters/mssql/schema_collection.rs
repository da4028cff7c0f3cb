//! SQL Server schema collection.
//!
//! Base tables of the current database across all schemas, columns in ordinal
//! order with their length or precision folded into the type name. Tables
//! outside the login's default schema are named `schema.table`.

use super::connection::SqlServerClient;
use crate::Result;
use crate::adapters::helpers::assemble_schema;
use crate::error::DbChatError;
use crate::models::{ColumnDescriptor, DatabaseSchema, TableSchema};

/// A base table located by schema and name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableRef {
    schema: String,
    name: String,
}

/// Main entry point for schema collection
pub(crate) async fn collect_schema(client: &mut SqlServerClient) -> Result<DatabaseSchema> {
    let rows = client
        .simple_query("SELECT DB_NAME(), SCHEMA_NAME()")
        .await
        .map_err(|e| DbChatError::collection_failed("Failed to get database name", e))?
        .into_first_result()
        .await
        .map_err(|e| DbChatError::collection_failed("Failed to get database name", e))?;
    let first = rows.first();
    let db_name = first
        .and_then(|row| row.get::<&str, _>(0))
        .unwrap_or("unknown")
        .to_string();
    let default_schema = first
        .and_then(|row| row.get::<&str, _>(1))
        .unwrap_or("dbo")
        .to_string();

    tracing::debug!(
        "Enumerating SQL Server tables in '{}' (default schema '{}')",
        db_name,
        default_schema
    );
    let table_refs = collect_table_refs(client).await?;

    let mut tables = Vec::with_capacity(table_refs.len());
    for table in table_refs {
        let columns = collect_table_columns(client, &table).await?;
        let display_name = qualified_table_name(&table.schema, &table.name, &default_schema);
        tracing::debug!(
            "Collected table '{}' with {} columns",
            display_name,
            columns.len()
        );
        tables.push(TableSchema::new(display_name, columns));
    }

    tracing::info!("SQL Server schema collection found {} tables", tables.len());
    Ok(assemble_schema(db_name, tables))
}

/// Name a table the way queries against the default schema can refer to it.
pub fn qualified_table_name(schema: &str, table: &str, default_schema: &str) -> String {
    if schema.eq_ignore_ascii_case(default_schema) {
        table.to_string()
    } else {
        format!("{schema}.{table}")
    }
}

async fn collect_table_refs(client: &mut SqlServerClient) -> Result<Vec<TableRef>> {
    let tables_query = "SELECT TABLE_SCHEMA, TABLE_NAME
         FROM INFORMATION_SCHEMA.TABLES
         WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_CATALOG = DB_NAME()
         ORDER BY CASE WHEN TABLE_SCHEMA = SCHEMA_NAME() THEN 0 ELSE 1 END,
                  TABLE_SCHEMA, TABLE_NAME";

    let rows = client
        .simple_query(tables_query)
        .await
        .map_err(|e| DbChatError::collection_failed("Failed to enumerate tables", e))?
        .into_first_result()
        .await
        .map_err(|e| DbChatError::collection_failed("Failed to enumerate tables", e))?;

    Ok(rows
        .iter()
        .filter_map(|row| {
            Some(TableRef {
                schema: row.get::<&str, _>(0)?.to_string(),
                name: row.get::<&str, _>(1)?.to_string(),
            })
        })
        .collect())
}

/// Collects column metadata for a specific table
async fn collect_table_columns(
    client: &mut SqlServerClient,
    table: &TableRef,
) -> Result<Vec<ColumnDescriptor>> {
    let columns_query = "SELECT
            c.COLUMN_NAME,
            c.DATA_TYPE,
            CAST(c.CHARACTER_MAXIMUM_LENGTH AS int) AS CHARACTER_MAXIMUM_LENGTH,
            CAST(c.NUMERIC_PRECISION AS int) AS NUMERIC_PRECISION,
            CAST(c.NUMERIC_SCALE AS int) AS NUMERIC_SCALE,
            c.IS_NULLABLE,
            c.COLUMN_DEFAULT,
            CAST(CASE WHEN pk.COLUMN_NAME IS NULL THEN 0 ELSE 1 END AS int) AS IS_PRIMARY_KEY
         FROM INFORMATION_SCHEMA.COLUMNS c
         LEFT JOIN (
            SELECT ku.TABLE_CATALOG, ku.TABLE_SCHEMA, ku.TABLE_NAME, ku.COLUMN_NAME
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
            JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE ku
                ON tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
                AND tc.CONSTRAINT_NAME = ku.CONSTRAINT_NAME
                AND tc.TABLE_SCHEMA = ku.TABLE_SCHEMA
         ) pk
            ON c.TABLE_CATALOG = pk.TABLE_CATALOG
            AND c.TABLE_SCHEMA = pk.TABLE_SCHEMA
            AND c.TABLE_NAME = pk.TABLE_NAME
            AND c.COLUMN_NAME = pk.COLUMN_NAME
         WHERE c.TABLE_SCHEMA = @P1 AND c.TABLE_NAME = @P2 AND c.TABLE_CATALOG = DB_NAME()
         ORDER BY c.ORDINAL_POSITION";

    let rows = client
        .query(columns_query, &[&table.schema, &table.name])
        .await
        .map_err(|e| {
            DbChatError::collection_failed(
                format!(
                    "Failed to collect columns for table '{}.{}'",
                    table.schema, table.name
                ),
                e,
            )
        })?
        .into_first_result()
        .await
        .map_err(|e| {
            DbChatError::collection_failed(
                format!(
                    "Failed to collect columns for table '{}.{}'",
                    table.schema, table.name
                ),
                e,
            )
        })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name = row
            .try_get::<&str, _>("COLUMN_NAME")
            .map_err(|e| DbChatError::collection_failed("Failed to parse column name", e))?
            .unwrap_or_default()
            .to_string();
        let data_type = row.get::<&str, _>("DATA_TYPE").unwrap_or_default();
        let max_length = row.get::<i32, _>("CHARACTER_MAXIMUM_LENGTH");
        let precision = row.get::<i32, _>("NUMERIC_PRECISION");
        let scale = row.get::<i32, _>("NUMERIC_SCALE");
        let is_nullable = row.get::<&str, _>("IS_NULLABLE").unwrap_or_default();
        let default_value = row.get::<&str, _>("COLUMN_DEFAULT").map(str::to_string);
        let is_primary_key = row.get::<i32, _>("IS_PRIMARY_KEY").unwrap_or(0) == 1;

        columns.push(ColumnDescriptor {
            name,
            data_type: format_column_type(data_type, max_length, precision, scale),
            nullable: is_nullable.eq_ignore_ascii_case("YES"),
            is_primary_key,
            default_value,
        });
    }

    Ok(columns)
}

/// Folds length or precision into a SQL Server type name.
///
/// Character and binary types get their maximum length, with `-1` rendered as
/// `MAX`; `decimal`/`numeric` get `(precision,scale)`.
pub fn format_column_type(
    data_type: &str,
    max_length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> String {
    let lower = data_type.to_ascii_lowercase();
    match lower.as_str() {
        "char" | "varchar" | "nchar" | "nvarchar" | "binary" | "varbinary" => match max_length {
            Some(-1) => format!("{data_type}(MAX)"),
            Some(length) if length > 0 => format!("{data_type}({length})"),
            _ => data_type.to_string(),
        },
        "decimal" | "numeric" => match precision {
            Some(p) => format!("{data_type}({p},{})", scale.unwrap_or(0)),
            None => data_type.to_string(),
        },
        _ => data_type.to_string(),
    }
}
