//! Integration test utilities for the portfolio ban system
//!
//! Spawns the HTTP API and the WebSocket gateway over one shared in-memory
//! store, so admin actions made over HTTP reach live ban pages.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
