//! SQL Server adapter tests against a real server.
//!
//! Each test starts its own container; run with `cargo test -- --ignored`.
//! The image needs the EULA accepted and about 2 GB of memory.

#![cfg(feature = "mssql")]
#![allow(clippy::unwrap_used)]

use dbchat_core::{
    ConnectionConfig, DatabaseAdapter, DatabaseManager, EngineType, Result,
    adapters::mssql::SqlServerAdapter, error::DbChatError,
};
use std::time::Duration;
use testcontainers_modules::{mssql_server::MssqlServer, testcontainers::runners::AsyncRunner};

/// SA password the module configures by default.
const SA_PASSWORD: &str = "yourStrong(!)Password";

async fn wait_for_mssql_ready(database_url: &str, max_attempts: u32) -> Result<()> {
    let probe = SqlServerAdapter::new(ConnectionConfig::default());
    let mut last_error = None;
    for _ in 0..max_attempts {
        match probe.test_connection(database_url).await {
            Ok(()) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Err(last_error.unwrap_or(DbChatError::NotConnected))
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_container_schema_and_execution() {
    let container = MssqlServer::default()
        .with_accept_eula()
        .start()
        .await
        .unwrap();
    let port = container.get_host_port_ipv4(1433).await.unwrap();
    let database_url = format!("mssql://sa:{}@localhost:{}/master", SA_PASSWORD, port);
    wait_for_mssql_ready(&database_url, 90).await.unwrap();

    let mut adapter = SqlServerAdapter::new(ConnectionConfig::default());
    adapter.connect(&database_url).await.unwrap();

    adapter
        .execute(
            "CREATE TABLE customers (
                id INT IDENTITY(1,1) PRIMARY KEY,
                name NVARCHAR(100) NOT NULL,
                notes NVARCHAR(MAX),
                balance DECIMAL(10, 2) DEFAULT 0
            )",
        )
        .await
        .unwrap();

    adapter.execute("CREATE SCHEMA sales").await.unwrap();
    adapter
        .execute(
            "CREATE TABLE sales.customers (
                code NVARCHAR(10) PRIMARY KEY,
                region NVARCHAR(50)
            )",
        )
        .await
        .unwrap();

    let schema = adapter.get_schema().await.unwrap();
    assert_eq!(schema.name, "master");
    assert_eq!(schema.tables.len(), schema.raw_ddl.len());

    // Same table name in two schemas stays two separate tables
    let sales_customers = schema.table("sales.customers").unwrap();
    let sales_names: Vec<&str> = sales_customers
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(sales_names, ["code", "region"]);
    assert!(sales_customers.columns[0].is_primary_key);
    assert_eq!(
        schema
            .tables
            .iter()
            .filter(|t| t.name == "customers")
            .count(),
        1
    );

    let customers = schema.table("customers").unwrap();
    let types: Vec<&str> = customers
        .columns
        .iter()
        .map(|c| c.data_type.as_str())
        .collect();
    assert_eq!(types, ["int", "nvarchar(100)", "nvarchar(MAX)", "decimal(10,2)"]);
    assert!(customers.columns[0].is_primary_key);
    assert!(!customers.columns[1].nullable);

    let inserted = adapter
        .execute("INSERT INTO customers (name) VALUES (N'Ada'), (N'Grace')")
        .await
        .unwrap();
    assert_eq!(inserted.affected_row_count(), Some(2));

    let rows = adapter
        .execute("SELECT TOP 10 id, name, notes FROM customers ORDER BY id")
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.rows[0]["id"], 1);
    assert_eq!(rows.rows[1]["name"], "Grace");
    assert!(rows.rows[0]["notes"].is_null());

    let updated = adapter
        .execute("UPDATE customers SET notes = N'vip' WHERE name = N'Ada'")
        .await
        .unwrap();
    assert_eq!(updated.affected_row_count(), Some(1));

    let deleted = adapter
        .execute("DELETE FROM customers WHERE id > 0")
        .await
        .unwrap();
    assert_eq!(deleted.affected_row_count(), Some(2));

    let one = adapter.execute("SELECT 1 AS one").await.unwrap();
    assert_eq!(one.len(), 1);

    adapter.close().await;
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_container_manager_routes_mssql() {
    let container = MssqlServer::default()
        .with_accept_eula()
        .start()
        .await
        .unwrap();
    let port = container.get_host_port_ipv4(1433).await.unwrap();
    let database_url = format!("mssql://sa:{}@localhost:{}/master", SA_PASSWORD, port);
    wait_for_mssql_ready(&database_url, 90).await.unwrap();

    let mut manager = DatabaseManager::default();
    assert!(manager.connect(&database_url).await);
    assert_eq!(manager.current_engine(), Some(EngineType::SqlServer));

    let bad = manager.execute("SELECT missing_column FROM sys.objects").await;
    assert!(matches!(bad, Err(DbChatError::QueryExecution { .. })));

    manager.disconnect().await;
}
