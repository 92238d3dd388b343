//! # folio-common
//!
//! Shared utilities including configuration, error handling, admin authentication,
//! telemetry, and the retry policy used around storage reads.

pub mod auth;
pub mod config;
pub mod error;
pub mod retry;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{credentials_match, AdminClaims, AdminToken, JwtService};
pub use config::{
    AdminConfig, AppConfig, AppSettings, BanPageConfig, ConfigError, CorsConfig, DatabaseConfig,
    Environment, RateLimitConfig, RedisConfig, RetrySettings, ServerConfig,
};
pub use error::{domain_status, AppError, AppResult, ErrorResponse};
pub use retry::{RetryError, RetryPolicy};
pub use telemetry::{
    try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError,
};
