//! PostgreSQL connection pool management.

use super::{ConnectionConfig, ConnectionDescriptor, PostgresAdapter};
use crate::Result;
use crate::error::DbChatError;
use crate::models::{AdapterState, EngineType};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

impl PostgresAdapter {
    /// Creates a disconnected PostgreSQL adapter.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            pool: None,
            config,
            state: AdapterState::Disconnected,
        }
    }

    /// Parses the connection string and opens the pool.
    pub(super) async fn open(&mut self, connection_string: &str) -> Result<()> {
        self.release().await;

        let descriptor = ConnectionDescriptor::parse(EngineType::PostgreSql, connection_string)?;
        let pool = create_connection_pool(&descriptor, &self.config).await?;

        tracing::info!("Connected to PostgreSQL at {}", descriptor);
        self.pool = Some(pool);
        self.state = AdapterState::Connected;
        Ok(())
    }

    /// Closes the pool if one is open.
    pub(super) async fn release(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            tracing::debug!("PostgreSQL connection pool closed");
        }
    }

    /// Returns the pool, or `NotConnected` outside the `Connected` state.
    pub(super) fn connected_pool(&self) -> Result<&PgPool> {
        match (&self.pool, self.state) {
            (Some(pool), AdapterState::Connected) => Ok(pool),
            _ => Err(DbChatError::NotConnected),
        }
    }
}

/// Connect options for a descriptor.
///
/// An empty database name falls back to the server default (the user's name).
pub fn pg_connect_options(descriptor: &ConnectionDescriptor) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&descriptor.host)
        .port(descriptor.port)
        .username(&descriptor.user)
        .password(descriptor.password())
        .application_name(concat!("dbchat-", env!("CARGO_PKG_VERSION")));

    if descriptor.has_database() {
        options.database(&descriptor.database)
    } else {
        options
    }
}

/// Creates a PostgreSQL connection pool and verifies it can hand out a connection.
///
/// # Errors
/// Returns `Connection` if the first connection cannot be established within
/// the configured timeout.
pub(crate) async fn create_connection_pool(
    descriptor: &ConnectionDescriptor,
    config: &ConnectionConfig,
) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_idle_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .test_before_acquire(true)
        .connect_with(pg_connect_options(descriptor))
        .await
        .map_err(|e| {
            DbChatError::connection_failed(
                format!("Failed to connect to PostgreSQL at {descriptor}"),
                e,
            )
        })
}

/// Opens a single-connection pool, runs `SELECT 1`, and closes it.
pub(crate) async fn probe(connection_string: &str, config: &ConnectionConfig) -> Result<()> {
    let descriptor = ConnectionDescriptor::parse(EngineType::PostgreSql, connection_string)?;
    let probe_config = ConnectionConfig {
        max_connections: 1,
        min_idle_connections: 0,
        ..config.clone()
    };
    let pool = create_connection_pool(&descriptor, &probe_config).await?;

    let outcome = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await
        .map_err(|e| DbChatError::connection_failed("PostgreSQL liveness query failed", e));

    pool.close().await;
    outcome.map(|_| ())
}
