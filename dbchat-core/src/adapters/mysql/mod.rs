//! MySQL database adapter with connection pooling and schema collection.
//!
//! # Module Structure
//! - `connection`: Connection pool management and the liveness probe
//! - `schema_collection`: Table and column introspection via `INFORMATION_SCHEMA`
//! - `execution`: Statement dispatch and row-to-JSON conversion

mod connection;
mod execution;
mod schema_collection;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, ConnectionDescriptor, DatabaseAdapter};
use crate::Result;
use crate::models::{AdapterState, DatabaseSchema, EngineType, QueryResult};
use async_trait::async_trait;
use sqlx::MySqlPool;

pub use connection::mysql_connect_options;

/// MySQL database adapter with connection pooling and schema collection
pub struct MySqlAdapter {
    /// Connection pool, present only while connected
    pool: Option<MySqlPool>,
    /// Pool settings applied on connect
    pub config: ConnectionConfig,
    state: AdapterState,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("pool_size", &self.pool.as_ref().map(MySqlPool::size))
            .finish()
    }
}

#[async_trait]
impl DatabaseAdapter for MySqlAdapter {
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
        schema_collection::collect_schema(self.connected_pool()?).await
    }

    async fn execute(&self, query: &str) -> Result<QueryResult> {
        execution::execute_query(self.connected_pool()?, query).await
    }

    fn engine_type(&self) -> EngineType {
        EngineType::MySql
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    async fn close(&mut self) {
        self.release().await;
        if self.state == AdapterState::Connected {
            tracing::info!("MySQL adapter closed");
            self.state = AdapterState::Closed;
        }
    }
}
