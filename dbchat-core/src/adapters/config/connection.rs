//! Connection pool configuration.
//!
//! This module provides the `ConnectionConfig` struct shared by every engine
//! adapter. It carries pool sizing and timeouts only; host, credentials and
//! database come from the connection string.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pool settings applied when an adapter connects.
///
/// # Example
/// ```rust
/// use dbchat_core::adapters::ConnectionConfig;
/// use std::time::Duration;
///
/// let config = ConnectionConfig::default()
///     .with_max_connections(4)
///     .with_connect_timeout(Duration::from_secs(5));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Maximum number of connections in pool
    pub max_connections: u32,
    /// Minimum idle connections kept open
    pub min_idle_connections: u32,
    /// Time allowed to establish (or acquire) a connection
    pub connect_timeout: Duration,
    /// Idle connection timeout
    pub idle_timeout: Duration,
    /// Maximum connection lifetime
    pub max_lifetime: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_idle_connections: 0,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

impl ConnectionConfig {
    /// Validates pool parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are out of range
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_connections == 0 {
            return Err(crate::error::DbChatError::configuration(
                "max_connections must be greater than 0",
            ));
        }

        if self.max_connections > 100 {
            return Err(crate::error::DbChatError::configuration(
                "max_connections should not exceed 100",
            ));
        }

        if self.min_idle_connections > self.max_connections {
            return Err(crate::error::DbChatError::configuration(
                "min_idle_connections cannot exceed max_connections",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::DbChatError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Builder method to set the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
