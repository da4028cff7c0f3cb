//! Connection-string parsing.
//!
//! Grammar: `<scheme>://<user>[:<password>]@<host>[:<port>]/<database>`.
//!
//! Parsing is a plain split on the separators. Nothing is percent-decoded, so an
//! `@`, `:` or `/` inside the user name or password misparses.

use crate::error::DbChatError;
use crate::models::EngineType;
use zeroize::Zeroizing;

/// Fields of a parsed connection string.
///
/// Lives for one connect or test call and is never persisted.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    /// Engine named by the scheme
    pub engine: EngineType,
    /// Login name
    pub user: String,
    password: Zeroizing<String>,
    /// Server host name or address
    pub host: String,
    /// Server port, the engine default when omitted
    pub port: u16,
    /// Empty when the connection string names no database
    pub database: String,
}

impl ConnectionDescriptor {
    /// Parses a connection string for the given engine.
    ///
    /// The scheme prefix must match `engine`; routing on the prefix is the
    /// manager's job, this only strips it.
    ///
    /// # Errors
    /// Returns `Configuration` if the prefix is wrong, the `@` or `/` separator
    /// is missing, the host is empty, or the port is not a number.
    ///
    /// # Example
    /// ```rust
    /// use dbchat_core::adapters::ConnectionDescriptor;
    /// use dbchat_core::models::EngineType;
    ///
    /// let d = ConnectionDescriptor::parse(EngineType::MySql, "mysql://u:p@h/db").unwrap();
    /// assert_eq!(d.port, 3306);
    /// assert_eq!(d.password(), "p");
    /// ```
    pub fn parse(engine: EngineType, connection_string: &str) -> crate::Result<Self> {
        let prefix = format!("{}://", engine.scheme());
        let rest = connection_string.strip_prefix(&prefix).ok_or_else(|| {
            DbChatError::configuration(format!(
                "Connection string must start with {prefix}"
            ))
        })?;

        let (user_pass, host_port_db) = rest.split_once('@').ok_or_else(|| {
            DbChatError::configuration("Connection string is missing the '@' separator")
        })?;

        let (user, password) = match user_pass.split_once(':') {
            Some((user, password)) => (user, password),
            None => (user_pass, ""),
        };

        let (host_port, database) = host_port_db.split_once('/').ok_or_else(|| {
            DbChatError::configuration("Connection string is missing the '/' separator")
        })?;

        let (host, port) = match host_port.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    DbChatError::configuration(format!("Invalid port number: '{port}'"))
                })?;
                (host, port)
            }
            None => (host_port, engine.default_port()),
        };

        if host.is_empty() {
            return Err(DbChatError::configuration(
                "Connection string is missing a host",
            ));
        }

        Ok(Self {
            engine,
            user: user.to_string(),
            password: Zeroizing::new(password.to_string()),
            host: host.to_string(),
            port,
            database: database.to_string(),
        })
    }

    /// Password, empty when the connection string has none.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Whether a database name was given.
    pub fn has_database(&self) -> bool {
        !self.database.is_empty()
    }
}

impl std::fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("engine", &self.engine)
            .field("user", &self.user)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            // password intentionally omitted
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}://{}@{}:{}/{}",
            self.engine.scheme(),
            self.user,
            self.host,
            self.port,
            self.database
        )
    }
}
