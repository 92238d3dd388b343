//! Request handlers
//!
//! Thin adapters from HTTP to the service layer.

pub mod admin;
pub mod appeals;
pub mod designs;
pub mod health;
pub mod pages;
pub mod policy;
pub mod visitors;
