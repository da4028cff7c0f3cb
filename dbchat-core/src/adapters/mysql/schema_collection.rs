//! MySQL schema collection.
//!
//! Base tables of the session's default database, with columns in ordinal
//! order and primary-key membership taken from the constraint catalog.

use crate::Result;
use crate::adapters::helpers::assemble_schema;
use crate::error::DbChatError;
use crate::models::{ColumnDescriptor, DatabaseSchema, TableSchema};
use sqlx::{MySqlPool, Row};

/// Main entry point for schema collection
pub(crate) async fn collect_schema(pool: &MySqlPool) -> Result<DatabaseSchema> {
    let db_name: Option<String> = sqlx::query_scalar("SELECT CAST(DATABASE() AS CHAR)")
        .fetch_one(pool)
        .await
        .map_err(|e| DbChatError::collection_failed("Failed to get database name", e))?;
    let db_name = db_name.unwrap_or_else(|| "unknown".to_string());

    tracing::debug!("Enumerating MySQL tables in '{}'", db_name);
    let table_names = collect_table_names(pool).await?;

    let mut tables = Vec::with_capacity(table_names.len());
    for table_name in table_names {
        let columns = collect_table_columns(pool, &table_name).await?;
        tracing::debug!(
            "Collected table '{}' with {} columns",
            table_name,
            columns.len()
        );
        tables.push(TableSchema::new(table_name, columns));
    }

    tracing::info!("MySQL schema collection found {} tables", tables.len());
    Ok(assemble_schema(db_name, tables))
}

async fn collect_table_names(pool: &MySqlPool) -> Result<Vec<String>> {
    // Cast to CHAR to avoid VARBINARY type issues in MySQL 8.0+
    let tables_query = r#"
        SELECT CAST(TABLE_NAME AS CHAR) AS TABLE_NAME
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_TYPE = 'BASE TABLE'
        ORDER BY TABLE_NAME
    "#;

    sqlx::query_scalar(tables_query)
        .fetch_all(pool)
        .await
        .map_err(|e| DbChatError::collection_failed("Failed to enumerate tables", e))
}

/// Collects column metadata for a specific table
async fn collect_table_columns(
    pool: &MySqlPool,
    table_name: &str,
) -> Result<Vec<ColumnDescriptor>> {
    // COLUMN_TYPE carries the length/precision annotation, e.g. varchar(255)
    let columns_query = r#"
        SELECT
            CAST(c.COLUMN_NAME AS CHAR) AS COLUMN_NAME,
            CAST(c.COLUMN_TYPE AS CHAR) AS COLUMN_TYPE,
            CAST(c.IS_NULLABLE AS CHAR) AS IS_NULLABLE,
            CAST(c.COLUMN_DEFAULT AS CHAR) AS COLUMN_DEFAULT,
            CAST(CASE WHEN pk.COLUMN_NAME IS NULL THEN 0 ELSE 1 END AS SIGNED) AS IS_PRIMARY_KEY
        FROM INFORMATION_SCHEMA.COLUMNS c
        LEFT JOIN (
            SELECT kcu.TABLE_SCHEMA, kcu.TABLE_NAME, kcu.COLUMN_NAME
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
            JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
                ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
                AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA
                AND tc.TABLE_NAME = kcu.TABLE_NAME
            WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
        ) pk
            ON c.TABLE_SCHEMA = pk.TABLE_SCHEMA
            AND c.TABLE_NAME = pk.TABLE_NAME
            AND c.COLUMN_NAME = pk.COLUMN_NAME
        WHERE c.TABLE_SCHEMA = DATABASE()
        AND c.TABLE_NAME = ?
        ORDER BY c.ORDINAL_POSITION
    "#;

    let column_rows = sqlx::query(columns_query)
        .bind(table_name)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            DbChatError::collection_failed(
                format!("Failed to collect columns for table '{}'", table_name),
                e,
            )
        })?;

    let mut columns = Vec::with_capacity(column_rows.len());
    for row in &column_rows {
        let name: String = row
            .try_get("COLUMN_NAME")
            .map_err(|e| DbChatError::collection_failed("Failed to parse column name", e))?;
        let column_type: String = row.try_get("COLUMN_TYPE").unwrap_or_default();
        let is_nullable: String = row.try_get("IS_NULLABLE").unwrap_or_default();
        let default_value: Option<String> = row.try_get("COLUMN_DEFAULT").ok().flatten();
        let is_primary_key: i64 = row.try_get("IS_PRIMARY_KEY").unwrap_or(0);

        columns.push(ColumnDescriptor {
            name,
            data_type: column_type,
            nullable: is_nullable.eq_ignore_ascii_case("YES"),
            is_primary_key: is_primary_key == 1,
            default_value,
        });
    }

    Ok(columns)
}
