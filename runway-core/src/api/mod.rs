pub mod messages;
pub mod routes;

pub use messages::{ObserverMessage, SnapshotMessage};
