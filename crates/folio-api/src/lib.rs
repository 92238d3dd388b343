//! # folio-api
//!
//! HTTP server built with Axum: the portfolio entry routes, the server-rendered
//! ban page, the tracking beacon, appeals, and the admin API.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;
