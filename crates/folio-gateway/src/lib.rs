//! # folio-gateway
//!
//! WebSocket gateway for live ban pages. Each connection runs one ban page
//! session and streams its updates as DISPATCH frames.

pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::run;
