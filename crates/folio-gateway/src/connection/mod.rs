//! Connection management
//!
//! Tracks live ban page sockets and which visitor each belongs to.

mod connection;
mod manager;

pub use connection::{Connection, Outbound};
pub use manager::ConnectionManager;
