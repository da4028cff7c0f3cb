//! PostgreSQL database adapter with connection pooling and schema collection.
//!
//! # Module Structure
//! - `connection`: Connection pool management and the liveness probe
//! - `schema_collection`: Table and column introspection of the `public` schema
//! - `execution`: Statement dispatch and row-to-JSON conversion

mod connection;
mod execution;
mod schema_collection;


use super::{ConnectionConfig, ConnectionDescriptor, DatabaseAdapter};
use crate::{
    Result,
    models::{AdapterState, DatabaseSchema, EngineType, QueryResult},
};
use async_trait::async_trait;
use sqlx::PgPool;

pub use connection::pg_connect_options;

/// PostgreSQL database adapter with connection pooling and schema collection
pub struct PostgresAdapter {
    pool: Option<PgPool>,
    /// Connection settings applied on connect
    pub config: ConnectionConfig,
    state: AdapterState,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("pool_size", &self.pool.as_ref().map(PgPool::size))
            .finish()
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
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
        EngineType::PostgreSql
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    async fn close(&mut self) {
        self.release().await;
        if self.state == AdapterState::Connected {
            tracing::info!("PostgreSQL adapter closed");
            self.state = AdapterState::Closed;
        }
    }
}
