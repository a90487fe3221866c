//! Repository ports and their adapters.
//!
//! Ports live in [`ports`]; the PostgreSQL adapter lives under
//! [`infrastructure::postgres`] and an in-process adapter in [`memory`] backs
//! tests and the in-memory server mode.

pub mod infrastructure;
pub mod memory;
pub mod ports;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresDatabase;
