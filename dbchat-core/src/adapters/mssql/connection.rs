//! SQL Server connection management.
//!
//! `tiberius` has no pool, so the adapter keeps one client. Each connection is
//! a TCP stream wrapped for `futures` I/O compatibility.

use super::{ConnectionConfig, ConnectionDescriptor, SqlServerAdapter};
use crate::Result;
use crate::error::DbChatError;
use crate::models::{AdapterState, EngineType};
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

pub(crate) type SqlServerClient = Client<Compat<TcpStream>>;

impl SqlServerAdapter {
    /// Creates a disconnected SQL Server adapter.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
            state: AdapterState::Disconnected,
        }
    }

    /// Parses the connection string and opens the client.
    pub(super) async fn open(&mut self, connection_string: &str) -> Result<()> {
        self.release().await;

        let descriptor = ConnectionDescriptor::parse(EngineType::SqlServer, connection_string)?;
        let client = connect_client(&descriptor, &self.config).await?;

        tracing::info!("Connected to SQL Server at {}", descriptor);
        self.client = Some(Mutex::new(client));
        self.state = AdapterState::Connected;
        Ok(())
    }

    /// Closes the client if one is open.
    pub(super) async fn release(&mut self) {
        if let Some(client) = self.client.take()
            && let Err(e) = client.into_inner().close().await
        {
            tracing::debug!("SQL Server client did not close cleanly: {}", e);
        }
    }

    /// Returns the client, or `NotConnected` outside the `Connected` state.
    pub(super) fn connected_client(&self) -> Result<&Mutex<SqlServerClient>> {
        match (&self.client, self.state) {
            (Some(client), AdapterState::Connected) => Ok(client),
            _ => Err(DbChatError::NotConnected),
        }
    }
}

/// Builds the tiberius configuration for a descriptor.
///
/// The server certificate is trusted as presented.
pub fn tiberius_config(descriptor: &ConnectionDescriptor) -> Config {
    let mut config = Config::new();
    config.host(&descriptor.host);
    config.port(descriptor.port);
    config.authentication(AuthMethod::sql_server(
        &descriptor.user,
        descriptor.password(),
    ));
    if descriptor.has_database() {
        config.database(&descriptor.database);
    }
    config.application_name("dbchat");
    config.trust_cert();
    config
}

/// Opens a client within the configured connect timeout.
///
/// # Errors
/// Returns `Connection` if the TCP connect or the TDS login fails, or the
/// timeout elapses first.
pub(crate) async fn connect_client(
    descriptor: &ConnectionDescriptor,
    config: &ConnectionConfig,
) -> Result<SqlServerClient> {
    let tds_config = tiberius_config(descriptor);
    let context = || format!("Failed to connect to SQL Server at {descriptor}");

    let handshake = async {
        let tcp = TcpStream::connect(tds_config.get_addr())
            .await
            .map_err(|e| DbChatError::connection_failed(context(), e))?;
        tcp.set_nodelay(true)
            .map_err(|e| DbChatError::connection_failed(context(), e))?;

        Client::connect(tds_config.clone(), tcp.compat_write())
            .await
            .map_err(|e| DbChatError::connection_failed(context(), e))
    };

    tokio::time::timeout(config.connect_timeout, handshake)
        .await
        .map_err(|e| DbChatError::connection_failed(context(), e))?
}

/// Opens a throwaway client, runs `SELECT 1`, and closes it.
pub(crate) async fn probe(connection_string: &str, config: &ConnectionConfig) -> Result<()> {
    let descriptor = ConnectionDescriptor::parse(EngineType::SqlServer, connection_string)?;
    let mut client = connect_client(&descriptor, config).await?;

    let outcome = match client.simple_query("SELECT 1").await {
        Ok(stream) => stream
            .into_first_result()
            .await
            .map(|_| ())
            .map_err(|e| DbChatError::connection_failed("SQL Server liveness query failed", e)),
        Err(e) => Err(DbChatError::connection_failed(
            "SQL Server liveness query failed",
            e,
        )),
    };

    if let Err(e) = client.close().await {
        tracing::debug!("SQL Server probe client did not close cleanly: {}", e);
    }
    outcome
}
