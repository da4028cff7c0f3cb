//! PostgreSQL schema collection.
//!
//! Only the `public` schema is introspected.

use crate::Result;
use crate::adapters::helpers::assemble_schema;
use crate::error::DbChatError;
use crate::models::{ColumnDescriptor, DatabaseSchema, TableSchema};
use sqlx::{PgPool, Row};

/// Main entry point for schema collection
pub(crate) async fn collect_schema(pool: &PgPool) -> Result<DatabaseSchema> {
    let db_name: String = sqlx::query_scalar("SELECT current_database()::text")
        .fetch_one(pool)
        .await
        .map_err(|e| DbChatError::collection_failed("Failed to get database name", e))?;

    tracing::debug!("Enumerating PostgreSQL tables in '{}'", db_name);
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

    tracing::info!("PostgreSQL schema collection found {} tables", tables.len());
    Ok(assemble_schema(db_name, tables))
}

async fn collect_table_names(pool: &PgPool) -> Result<Vec<String>> {
    let tables_query = r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = 'public'
        AND table_type = 'BASE TABLE'
        ORDER BY table_name
    "#;

    sqlx::query_scalar(tables_query)
        .fetch_all(pool)
        .await
        .map_err(|e| DbChatError::collection_failed("Failed to enumerate tables", e))
}

/// Collects column metadata for a specific table
async fn collect_table_columns(pool: &PgPool, table_name: &str) -> Result<Vec<ColumnDescriptor>> {
    // Re-attach length/precision so the type reads like DDL, e.g. varchar(255);
    // array udt names carry a leading underscore (_text is text[])
    let columns_query = r#"
        SELECT
            c.column_name::text AS column_name,
            (CASE
                WHEN c.character_maximum_length IS NOT NULL
                    THEN c.data_type || '(' || c.character_maximum_length || ')'
                WHEN c.data_type = 'numeric' AND c.numeric_precision IS NOT NULL
                    THEN c.data_type || '(' || c.numeric_precision || ',' || COALESCE(c.numeric_scale, 0) || ')'
                WHEN c.data_type = 'ARRAY'
                    THEN substr(c.udt_name::text, 2) || '[]'
                WHEN c.data_type = 'USER-DEFINED'
                    THEN c.udt_name::text
                ELSE c.data_type
            END)::text AS column_type,
            c.is_nullable::text AS is_nullable,
            c.column_default::text AS column_default,
            EXISTS (
                SELECT 1
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                    AND tc.table_name = kcu.table_name
                WHERE tc.constraint_type = 'PRIMARY KEY'
                AND tc.table_schema = c.table_schema
                AND tc.table_name = c.table_name
                AND kcu.column_name = c.column_name
            ) AS is_primary_key
        FROM information_schema.columns c
        WHERE c.table_schema = 'public'
        AND c.table_name = $1
        ORDER BY c.ordinal_position
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
            .try_get("column_name")
            .map_err(|e| DbChatError::collection_failed("Failed to parse column name", e))?;
        let column_type: String = row.try_get("column_type").unwrap_or_default();
        let is_nullable: String = row.try_get("is_nullable").unwrap_or_default();
        let default_value: Option<String> = row.try_get("column_default").ok().flatten();
        let is_primary_key: bool = row.try_get("is_primary_key").unwrap_or(false);

        columns.push(ColumnDescriptor {
            name,
            data_type: column_type,
            nullable: is_nullable.eq_ignore_ascii_case("YES"),
            is_primary_key,
            default_value,
        });
    }

    Ok(columns)
}
