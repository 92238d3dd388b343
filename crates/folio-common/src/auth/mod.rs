//! Admin authentication: credential check and signed bearer tokens

mod jwt;

pub use jwt::{credentials_match, AdminClaims, AdminToken, JwtService};
