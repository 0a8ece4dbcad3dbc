//! simple-crud core - shared abstractions for the CRUD layers
//!
//! This crate provides the fundamental traits and types the other
//! simple-crud crates depend on. It defines:
//!
//! - `DatabaseDriver` - Trait for database driver implementations
//! - `Connection` - Trait for database connections
//! - `SessionStore` - Capability for per-user session storage
//! - Common types like `Value`, `Row`, `QueryResult`

mod connection;
mod driver;
mod error;
pub mod session;
mod types;

pub use connection::*;
pub use driver::*;
pub use error::*;
pub use session::{MemorySessionStore, SessionSection, SessionStore};
pub use types::*;
