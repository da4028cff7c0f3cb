//! SQL Server database adapter built on `tiberius`.
//!
//! # Module Structure
//! - `connection`: Client setup, TLS trust and the liveness probe
//! - `schema_collection`: Table and column introspection via `INFORMATION_SCHEMA`
//! - `execution`: Statement dispatch and TDS value conversion
//!
//! The adapter owns a single client behind an async mutex, so concurrent calls
//! on one adapter run one at a time.

mod connection;
mod execution;
mod schema_collection;


use super::{ConnectionConfig, ConnectionDescriptor, DatabaseAdapter};
use crate::Result;
use crate::models::{AdapterState, DatabaseSchema, EngineType, QueryResult};
use async_trait::async_trait;
use tokio::sync::Mutex;

pub use connection::tiberius_config;
pub use execution::column_data_to_json;
pub use schema_collection::{format_column_type, qualified_table_name};

/// SQL Server database adapter
pub struct SqlServerAdapter {
    client: Option<Mutex<connection::SqlServerClient>>,
    /// Connection settings applied on connect
    pub config: ConnectionConfig,
    state: AdapterState,
}

impl std::fmt::Debug for SqlServerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServerAdapter")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("has_client", &self.client.is_some())
            .finish()
    }
}

#[async_trait]
impl DatabaseAdapter for SqlServerAdapter {
    async fn connect(&mut self, connection_string: &str) -> Result<()> {
        let outcome = self.open(connection_string).await;
        if outcome.is_err() {
            self.state = AdapterState::Disconnected;
        }
        outcome
    }

    async fn test_connection(&self, connection_string: &str) -> Result<()> {
        connection::probe(connection_string, &self.config).await
    }

    async fn get_schema(&self) -> Result<DatabaseSchema> {
        let mut client = self.connected_client()?.lock().await;
        schema_collection::collect_schema(&mut client).await
    }

    async fn execute(&self, query: &str) -> Result<QueryResult> {
        let mut client = self.connected_client()?.lock().await;
        execution::execute_query(&mut client, query).await
    }

    fn engine_type(&self) -> EngineType {
        EngineType::SqlServer
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    async fn close(&mut self) {
        self.release().await;
        if self.state == AdapterState::Connected {
            tracing::info!("SQL Server adapter closed");
            self.state = AdapterState::Closed;
        }
    }
}
