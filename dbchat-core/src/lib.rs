//! Core library for dbchat: talk to a database in plain language.
//!
//! This crate provides the engine adapters, the connection router and the AI
//! pipeline shared by the `dbchat` binary and any other front end.
//!
//! # Guarantees
//! - Passwords and API keys never appear in logs, errors or `Debug` output
//! - One capability interface per concern: [`DatabaseAdapter`] for engines,
//!   [`ai::ChatClient`] for chat providers
//! - Every failure is a distinguishable [`DbChatError`] variant
//!
//! # Architecture
//! - `adapters`: MySQL, PostgreSQL and SQL Server behind one trait, selected by
//!   connection-string prefix
//! - `manager`: holds the single current connection
//! - `ai`: chat clients, schema enhancer, prompt templates and the orchestrator
//! - `history`: owned store of generated queries

pub mod adapters;
pub mod ai;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod manager;
pub mod models;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, ConnectionDescriptor, DatabaseAdapter};
pub use ai::{AiOrchestrator, AiService, ChatClient};
pub use config::AiSettings;
pub use error::{DbChatError, Result};
pub use history::{HistoryItem, HistoryStore};
pub use manager::DatabaseManager;
pub use models::{
    AdapterState, ChatMessage, ChatRole, ColumnDescriptor, DatabaseSchema, EngineType,
    GeneratedQuery, QueryResult, Row, TableSchema,
};
