pub mod connection;
pub mod manager;

pub use connection::*;
pub use manager::*;
