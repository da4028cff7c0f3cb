//! Database adapter trait and factory for unified database access.
//!
//! This module defines the capability interface every engine implements and
//! the prefix-based factory that picks the engine for a connection string.
//!
//! # Module Structure
//! - `config`: Pool settings and connection-string parsing
//! - `helpers`: DDL rendering and statement classification shared by engines
//! - Engine modules (`mysql`, `postgres`, `mssql`), each feature-gated
//!
//! Engines share no connection state; each owns its native handle type.

use crate::{
    Result,
    error::DbChatError,
    models::{AdapterState, DatabaseSchema, EngineType, QueryResult},
};
use async_trait::async_trait;

pub mod config;
pub mod helpers;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "postgresql")]
pub mod postgres;

#[cfg(feature = "mssql")]
pub mod mssql;

pub use config::{ConnectionConfig, ConnectionDescriptor};

/// Capability interface implemented by each engine adapter.
///
/// An adapter starts `Disconnected`, becomes `Connected` after a successful
/// [`connect`](DatabaseAdapter::connect) and `Closed` after
/// [`close`](DatabaseAdapter::close). Schema and execute calls in any other
/// state fail with [`DbChatError::NotConnected`].
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn DatabaseAdapter>`.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Opens the adapter's connection from an engine-prefixed connection string.
    ///
    /// Any handle from an earlier connect is released first. On failure the
    /// adapter is left `Disconnected`.
    ///
    /// # Errors
    /// Returns `Configuration` for an unparseable connection string and
    /// `Connection` if the server cannot be reached or rejects the login.
    async fn connect(&mut self, connection_string: &str) -> Result<()>;

    /// Opens a short-lived connection, runs `SELECT 1`, and releases it.
    ///
    /// Does not touch the adapter's own connection or state.
    ///
    /// # Errors
    /// Returns error if connecting or the liveness query fails
    async fn test_connection(&self, connection_string: &str) -> Result<()>;

    /// Introspects base tables and their columns.
    ///
    /// The returned schema is built fresh on every call; `raw_ddl[i]` renders
    /// `tables[i]`.
    ///
    /// # Errors
    /// Returns `NotConnected` outside the `Connected` state, or `Collection`
    /// if a catalog query fails.
    async fn get_schema(&self) -> Result<DatabaseSchema>;

    /// Executes a statement.
    ///
    /// A leading `SELECT` returns every row; anything else returns a single
    /// row holding the affected-row count.
    ///
    /// # Errors
    /// Returns `NotConnected` outside the `Connected` state, or `QueryExecution`
    /// carrying the driver's message.
    async fn execute(&self, query: &str) -> Result<QueryResult>;

    /// Engine this adapter talks to.
    fn engine_type(&self) -> EngineType;

    /// Dialect name (`MySQL`, `PostgreSQL` or `SQL Server`).
    fn engine_name(&self) -> &'static str {
        self.engine_type().dialect_name()
    }

    /// Current lifecycle state.
    fn state(&self) -> AdapterState;

    /// Releases the connection. Calling it again is a no-op.
    async fn close(&mut self);
}

/// Determines the engine from the connection-string prefix.
///
/// Only `mysql://`, `postgresql://` and `mssql://` are recognised; the rest of
/// the string is not inspected.
///
/// # Errors
/// Returns `UnsupportedEngine` for any other prefix
pub fn detect_engine(connection_string: &str) -> Result<EngineType> {
    EngineType::ALL
        .into_iter()
        .find(|engine| {
            connection_string
                .strip_prefix(engine.scheme())
                .is_some_and(|rest| rest.starts_with("://"))
        })
        .ok_or_else(|| DbChatError::UnsupportedEngine {
            scheme: connection_string
                .split_once("://")
                .map_or(connection_string, |(scheme, _)| scheme)
                .to_string(),
        })
}

/// Factory function creating a disconnected adapter for a connection string.
///
/// # Errors
/// Returns error if:
/// - The prefix is not a supported engine
/// - The engine's cargo feature is not compiled in
/// - `config` fails validation
pub fn create_adapter(
    connection_string: &str,
    config: &ConnectionConfig,
) -> Result<Box<dyn DatabaseAdapter>> {
    let engine = detect_engine(connection_string)?;
    config.validate()?;

    match engine {
        #[cfg(feature = "mysql")]
        EngineType::MySql => Ok(Box::new(mysql::MySqlAdapter::new(config.clone()))),
        #[cfg(not(feature = "mysql"))]
        EngineType::MySql => Err(DbChatError::unsupported_feature("mysql", "MySQL")),
        #[cfg(feature = "postgresql")]
        EngineType::PostgreSql => Ok(Box::new(postgres::PostgresAdapter::new(config.clone()))),
        #[cfg(not(feature = "postgresql"))]
        EngineType::PostgreSql => Err(DbChatError::unsupported_feature("postgresql", "PostgreSQL")),
        #[cfg(feature = "mssql")]
        EngineType::SqlServer => Ok(Box::new(mssql::SqlServerAdapter::new(config.clone()))),
        #[cfg(not(feature = "mssql"))]
        EngineType::SqlServer => Err(DbChatError::unsupported_feature("mssql", "SQL Server")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_engine_by_prefix() {
        assert_eq!(detect_engine("mysql://u:p@h/db").unwrap(), EngineType::MySql);
        assert_eq!(
            detect_engine("postgresql://u:p@h/db").unwrap(),
            EngineType::PostgreSql
        );
        assert_eq!(detect_engine("mssql://sa:p@h/master").unwrap(), EngineType::SqlServer);
    }

    #[test]
    fn test_detect_engine_ignores_rest_of_string() {
        // Unparseable remainder still routes on the prefix alone
        assert_eq!(detect_engine("mysql://").unwrap(), EngineType::MySql);
        assert_eq!(detect_engine("mssql://garbage").unwrap(), EngineType::SqlServer);
    }

    #[test]
    fn test_detect_engine_rejects_unknown_prefix() {
        match detect_engine("oracle://scott:tiger@h/orcl") {
            Err(DbChatError::UnsupportedEngine { scheme }) => assert_eq!(scheme, "oracle"),
            other => panic!("expected UnsupportedEngine, got {other:?}"),
        }
        assert!(detect_engine("postgres://u:p@h/db").is_err());
        assert!(detect_engine("mysqlx://u:p@h/db").is_err());
        assert!(detect_engine("").is_err());
    }

    #[test]
    fn test_create_adapter_starts_disconnected() {
        let config = ConnectionConfig::default();
        #[cfg(feature = "postgresql")]
        {
            let adapter = create_adapter("postgresql://u:p@h/db", &config).unwrap();
            assert_eq!(adapter.engine_type(), EngineType::PostgreSql);
            assert_eq!(adapter.engine_name(), "PostgreSQL");
            assert_eq!(adapter.state(), AdapterState::Disconnected);
        }
        #[cfg(feature = "mssql")]
        {
            let adapter = create_adapter("mssql://sa:p@h/master", &config).unwrap();
            assert_eq!(adapter.engine_name(), "SQL Server");
        }
        assert!(create_adapter("sqlite://file.db", &config).is_err());
    }

    #[test]
    fn test_create_adapter_validates_config() {
        let config = ConnectionConfig::default().with_max_connections(0);
        assert!(create_adapter("mysql://u:p@h/db", &config).is_err());
    }
}
