//! Core data models shared by the engine adapters and the AI pipeline.
//!
//! Schemas are created fresh on every request and owned by the caller; nothing
//! here is cached. Query results are rows of JSON scalars keyed by column name.

use serde::{Deserialize, Serialize};

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineType {
    /// MySQL (`mysql://`)
    MySql,
    /// PostgreSQL (`postgresql://`)
    PostgreSql,
    /// Microsoft SQL Server (`mssql://`)
    SqlServer,
}

impl EngineType {
    /// All engines, in the order they are listed to users.
    pub const ALL: [EngineType; 3] = [Self::MySql, Self::PostgreSql, Self::SqlServer];

    /// Connection-string scheme (the part before `://`).
    pub fn scheme(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::SqlServer => "mssql",
        }
    }

    /// Port used when the connection string omits one.
    pub fn default_port(self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::PostgreSql => 5432,
            Self::SqlServer => 1433,
        }
    }

    /// Dialect name reported by adapters and used to select prompt advice.
    pub fn dialect_name(self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::PostgreSql => "PostgreSQL",
            Self::SqlServer => "SQL Server",
        }
    }

    /// Looks up an engine by its exact scheme.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|engine| engine.scheme() == scheme)
    }
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dialect_name())
    }
}

/// Lifecycle of an engine adapter.
///
/// `Disconnected -> Connected` on a successful connect, `Connected -> Closed`
/// on close. A failed connect always lands in `Disconnected`. Schema and
/// execute calls are only valid while `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterState {
    /// No live connection; the initial state and the state after a failed connect
    Disconnected,
    /// Connection open; schema and execute calls are allowed
    Connected,
    /// Released by `close`
    Closed,
}

/// Column information in physical order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Dialect-native type, with length/precision where the engine exposes it
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Whether the column belongs to the primary key
    pub is_primary_key: bool,
    /// Default expression as reported by the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl ColumnDescriptor {
    /// Creates a nullable, non-key column without a default.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            is_primary_key: false,
            default_value: None,
        }
    }

    /// Builder method marking the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Builder method marking the column as (part of) the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Builder method setting the column default expression.
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// A base table and its columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name, schema-qualified when outside the default schema
    pub name: String,
    /// Columns in physical order
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    /// Creates a table from its columns.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Primary-key columns in physical order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }
}

/// Introspected database schema.
///
/// `raw_ddl[i]` is the `CREATE TABLE` rendering of `tables[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// Database name
    pub name: String,
    /// Base tables
    pub tables: Vec<TableSchema>,
    /// One `CREATE TABLE` statement per entry of `tables`
    pub raw_ddl: Vec<String>,
}

impl DatabaseSchema {
    /// Number of tables in the schema
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// All DDL statements joined by newlines, as embedded in prompts.
    pub fn ddl_block(&self) -> String {
        self.raw_ddl.join("\n")
    }

    /// Finds a table by exact name.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// One result row: column name to JSON scalar. A duplicated column name keeps
/// the last value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Key of the single cell returned for non-row-returning statements.
pub const AFFECTED_ROWS_KEY: &str = "affected_rows";

/// Rows returned by `execute`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResult {
    /// Result rows in the order the server returned them
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Wraps the rows of a row-returning statement.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Single-row result reporting how many rows a statement touched.
    pub fn affected(count: u64) -> Self {
        let mut row = Row::new();
        row.insert(AFFECTED_ROWS_KEY.to_string(), count.into());
        Self { rows: vec![row] }
    }

    /// Affected-row count, if this is a mutation result.
    pub fn affected_row_count(&self) -> Option<u64> {
        match self.rows.as_slice() {
            [row] if row.len() == 1 => row.get(AFFECTED_ROWS_KEY).and_then(|v| v.as_u64()),
            _ => None,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows were returned
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions that frame the conversation
    System,
    /// Text written by the person asking
    User,
    /// Text produced by the model
    Assistant,
}

/// A single message of a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message
    pub role: ChatRole,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Creates a `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an `assistant` message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Structured output of the query-generation pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuery {
    /// Model's explanation of how the query was built
    pub summary: String,
    /// Single SQL statement without line breaks
    pub query: String,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
