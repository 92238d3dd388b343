//! Configuration structs

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, AppSettings, BanPageConfig, ConfigError, CorsConfig, DatabaseConfig,
    Environment, RateLimitConfig, RedisConfig, RetrySettings, ServerConfig,
};
