//! MySQL connection pool management.
//!
//! Pools are built from a parsed [`ConnectionDescriptor`] rather than from the
//! raw URL, so the hand-split connection-string grammar applies uniformly.

use super::{ConnectionConfig, ConnectionDescriptor, MySqlAdapter};
use crate::Result;
use crate::error::DbChatError;
use crate::models::{AdapterState, EngineType};
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

impl MySqlAdapter {
    /// Creates a disconnected MySQL adapter.
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

        let descriptor = ConnectionDescriptor::parse(EngineType::MySql, connection_string)?;
        let pool = create_mysql_connection_pool(&descriptor, &self.config).await?;

        tracing::info!("Connected to MySQL at {}", descriptor);
        self.pool = Some(pool);
        self.state = AdapterState::Connected;
        Ok(())
    }

    /// Closes the pool if one is open.
    pub(super) async fn release(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            tracing::debug!("MySQL connection pool closed");
        }
    }

    /// Returns the pool, or `NotConnected` outside the `Connected` state.
    pub(super) fn connected_pool(&self) -> Result<&MySqlPool> {
        match (&self.pool, self.state) {
            (Some(pool), AdapterState::Connected) => Ok(pool),
            _ => Err(DbChatError::NotConnected),
        }
    }
}

/// Connect options for a descriptor. An empty database name leaves the
/// session without a default schema.
pub fn mysql_connect_options(descriptor: &ConnectionDescriptor) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&descriptor.host)
        .port(descriptor.port)
        .username(&descriptor.user)
        .password(descriptor.password());

    if descriptor.has_database() {
        options.database(&descriptor.database)
    } else {
        options
    }
}

/// Creates a MySQL connection pool and verifies it can hand out a connection.
///
/// # Errors
/// Returns `Connection` if the first connection cannot be established within
/// the configured timeout.
pub(crate) async fn create_mysql_connection_pool(
    descriptor: &ConnectionDescriptor,
    config: &ConnectionConfig,
) -> Result<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_idle_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .test_before_acquire(true)
        .connect_with(mysql_connect_options(descriptor))
        .await
        .map_err(|e| {
            DbChatError::connection_failed(format!("Failed to connect to MySQL at {descriptor}"), e)
        })
}

/// Opens a single-connection pool, runs `SELECT 1`, and closes it.
pub(crate) async fn probe(connection_string: &str, config: &ConnectionConfig) -> Result<()> {
    let descriptor = ConnectionDescriptor::parse(EngineType::MySql, connection_string)?;
    let probe_config = ConnectionConfig {
        max_connections: 1,
        min_idle_connections: 0,
        ..config.clone()
    };
    let pool = create_mysql_connection_pool(&descriptor, &probe_config).await?;

    let outcome = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&pool)
        .await
        .map_err(|e| DbChatError::connection_failed("MySQL liveness query failed", e));

    pool.close().await;
    outcome.map(|_| ())
}
