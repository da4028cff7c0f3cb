//! Configuration types for database adapters.
//!
//! - `ConnectionConfig`: pool sizing and timeouts
//! - `ConnectionDescriptor`: fields parsed from an engine-prefixed connection string
//!
//! # Security
//! `ConnectionConfig` never stores credentials. The descriptor keeps the password
//! in a zeroizing buffer and omits it from `Debug` and `Display`.

mod connection;
mod descriptor;

pub use connection::ConnectionConfig;
pub use descriptor::ConnectionDescriptor;
