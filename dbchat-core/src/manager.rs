//! Engine router holding the single active database connection.
//!
//! A `DatabaseManager` owns at most one connected adapter. Connecting again
//! closes the previous adapter before the new one is selected.
//!
//! # Concurrency
//! Reconnecting needs `&mut self`, so a manager shared between tasks must sit
//! behind a lock (e.g. `tokio::sync::RwLock`), which serializes a reconnect
//! against in-flight queries. Request-scoped managers need no locking.

use crate::Result;
use crate::adapters::{self, ConnectionConfig, DatabaseAdapter};
use crate::error::{DbChatError, redact_database_url};
use crate::models::{DatabaseSchema, EngineType, QueryResult};

/// Selects, connects and holds the current engine adapter.
pub struct DatabaseManager {
    current: Option<Box<dyn DatabaseAdapter>>,
    config: ConnectionConfig,
}

impl std::fmt::Debug for DatabaseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("config", &self.config)
            .field(
                "current",
                &self.current.as_ref().map(|adapter| adapter.engine_name()),
            )
            .finish()
    }
}

impl Default for DatabaseManager {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl DatabaseManager {
    /// Creates a manager with no current adapter.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            current: None,
            config,
        }
    }

    /// Picks a disconnected adapter by connection-string prefix.
    ///
    /// # Errors
    /// Returns `UnsupportedEngine` for an unknown prefix, whether or not the
    /// rest of the string parses.
    pub fn select_adapter(&self, connection_string: &str) -> Result<Box<dyn DatabaseAdapter>> {
        adapters::create_adapter(connection_string, &self.config)
    }

    /// Connects to a database and makes it the current adapter.
    ///
    /// Any previous adapter is closed first. Failures are logged and reported
    /// as `false`, leaving no current adapter.
    pub async fn connect(&mut self, connection_string: &str) -> bool {
        self.disconnect().await;

        match self.try_connect(connection_string).await {
            Ok(adapter) => {
                tracing::info!("Now connected to {}", adapter.engine_name());
                self.current = Some(adapter);
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to {}: {}",
                    redact_database_url(connection_string),
                    e
                );
                false
            }
        }
    }

    async fn try_connect(&self, connection_string: &str) -> Result<Box<dyn DatabaseAdapter>> {
        let mut adapter = self.select_adapter(connection_string)?;
        adapter.connect(connection_string).await?;
        Ok(adapter)
    }

    /// Checks that a connection string reaches a live server.
    ///
    /// Uses a throwaway adapter; the current adapter is not touched.
    pub async fn test_connection(&self, connection_string: &str) -> bool {
        let outcome = match self.select_adapter(connection_string) {
            Ok(adapter) => adapter.test_connection(connection_string).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Connection test failed for {}: {}",
                    redact_database_url(connection_string),
                    e
                );
                false
            }
        }
    }

    /// The current adapter, if connected.
    pub fn current_adapter(&self) -> Option<&dyn DatabaseAdapter> {
        self.current.as_deref()
    }

    /// Engine of the current adapter.
    pub fn current_engine(&self) -> Option<EngineType> {
        self.current.as_ref().map(|adapter| adapter.engine_type())
    }

    /// Schema of the current database.
    ///
    /// # Errors
    /// Returns `NotConnected` without a current adapter, otherwise whatever
    /// the adapter reports.
    pub async fn get_schema(&self) -> Result<DatabaseSchema> {
        self.current
            .as_ref()
            .ok_or(DbChatError::NotConnected)?
            .get_schema()
            .await
    }

    /// Executes a statement on the current database.
    ///
    /// # Errors
    /// Returns `NotConnected` without a current adapter, otherwise whatever
    /// the adapter reports.
    pub async fn execute(&self, query: &str) -> Result<QueryResult> {
        self.current
            .as_ref()
            .ok_or(DbChatError::NotConnected)?
            .execute(query)
            .await
    }

    /// Closes and drops the current adapter, if any.
    pub async fn disconnect(&mut self) {
        if let Some(mut previous) = self.current.take() {
            tracing::debug!("Closing previous {} adapter", previous.engine_name());
            previous.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdapterState;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Adapter that is always connected and records whether it was closed.
    struct RecordingAdapter {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl DatabaseAdapter for RecordingAdapter {
        async fn connect(&mut self, _connection_string: &str) -> Result<()> {
            Ok(())
        }

        async fn test_connection(&self, _connection_string: &str) -> Result<()> {
            Ok(())
        }

        async fn get_schema(&self) -> Result<DatabaseSchema> {
            Ok(crate::adapters::helpers::assemble_schema("fake", Vec::new()))
        }

        async fn execute(&self, _query: &str) -> Result<QueryResult> {
            Ok(QueryResult::affected(1))
        }

        fn engine_type(&self) -> EngineType {
            EngineType::MySql
        }

        fn state(&self) -> AdapterState {
            if self.closed.load(Ordering::SeqCst) {
                AdapterState::Closed
            } else {
                AdapterState::Connected
            }
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_no_adapter_means_not_connected() {
        let manager = DatabaseManager::default();
        assert!(manager.current_adapter().is_none());
        assert!(matches!(
            manager.get_schema().await,
            Err(DbChatError::NotConnected)
        ));
        assert!(matches!(
            manager.execute("SELECT 1").await,
            Err(DbChatError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_unsupported_engine_reports_false() {
        let mut manager = DatabaseManager::default();
        assert!(!manager.connect("oracle://scott:tiger@h/orcl").await);
        assert!(!manager.test_connection("oracle://scott:tiger@h/orcl").await);
        assert!(manager.current_adapter().is_none());
    }

    #[tokio::test]
    async fn test_reconnect_closes_previous_adapter() {
        let closed = Arc::new(AtomicBool::new(false));
        let mut manager = DatabaseManager::default();
        manager.current = Some(Box::new(RecordingAdapter {
            closed: Arc::clone(&closed),
        }));
        assert_eq!(manager.current_engine(), Some(EngineType::MySql));
        assert_eq!(manager.execute("DELETE FROM t").await.unwrap().affected_row_count(), Some(1));

        // Fails, but the previous adapter must still be closed and dropped
        assert!(!manager.connect("sqlite://local.db").await);
        assert!(closed.load(Ordering::SeqCst));
        assert!(manager.current_adapter().is_none());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let closed = Arc::new(AtomicBool::new(false));
        let mut manager = DatabaseManager::default();
        manager.current = Some(Box::new(RecordingAdapter {
            closed: Arc::clone(&closed),
        }));
        manager.disconnect().await;
        manager.disconnect().await;
        assert!(closed.load(Ordering::SeqCst));
        assert!(manager.current_engine().is_none());
    }

    #[test]
    fn test_select_adapter_routes_on_prefix() {
        let manager = DatabaseManager::default();
        #[cfg(feature = "postgresql")]
        assert_eq!(
            manager
                .select_adapter("postgresql://u:p@h/db")
                .unwrap()
                .engine_type(),
            EngineType::PostgreSql
        );
        assert!(matches!(
            manager.select_adapter("oracle://u:p@h/db"),
            Err(DbChatError::UnsupportedEngine { .. })
        ));
    }
}
