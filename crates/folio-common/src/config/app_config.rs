//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).
//! Storage and the admin surface are optional: without them the app still serves
//! the portfolio and ban pages.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub gateway: ServerConfig,
    /// `None` runs against the offline store
    pub database: Option<DatabaseConfig>,
    pub redis: RedisConfig,
    /// `None` disables the admin endpoints (503)
    pub admin: Option<AdminConfig>,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub ban_page: BanPageConfig,
    pub retry: RetrySettings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Server configuration (for both API and Gateway)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Admin credentials and token signing
#[derive(Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub jwt_secret: String,
    #[serde(default = "default_admin_token_expiry")]
    pub token_expiry: i64,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("token_expiry", &self.token_expiry)
            .finish_non_exhaustive()
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Ban page behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct BanPageConfig {
    #[serde(default = "default_design_cache_ttl")]
    pub design_cache_ttl_secs: u64,
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// Heartbeat period announced to live ban pages
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,
}

impl BanPageConfig {
    pub fn design_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.design_cache_ttl_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// A socket missing two heartbeats in a row is dropped
    pub fn heartbeat_timeout(&self) -> Duration {
        self.heartbeat_interval() * 2
    }
}

impl Default for BanPageConfig {
    fn default() -> Self {
        Self {
            design_cache_ttl_secs: default_design_cache_ttl(),
            settle_delay_ms: default_settle_delay(),
            heartbeat_interval_ms: default_heartbeat_interval(),
        }
    }
}

/// Retry settings for storage reads and policy reference fetches
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_policy_fetch_timeout")]
    pub attempt_timeout_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            attempt_timeout_secs: default_policy_fetch_timeout(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "folio".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_gateway_port() -> u16 {
    8081
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_admin_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_design_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_settle_delay() -> u64 {
    300
}

fn default_heartbeat_interval() -> u64 {
    45_000
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_policy_fetch_timeout() -> u64 {
    15
}

/// Read and parse an optional variable, falling back to `default` when unset
fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        _ => Ok(default),
    }
}

/// Read a variable, treating empty values as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = match non_empty_var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", default_max_connections())?,
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS", default_min_connections())?,
            }),
            None => None,
        };

        let admin = match (
            non_empty_var("ADMIN_USERNAME"),
            non_empty_var("ADMIN_PASSWORD"),
            non_empty_var("ADMIN_JWT_SECRET"),
        ) {
            (Some(username), Some(password), Some(jwt_secret)) => Some(AdminConfig {
                username,
                password,
                jwt_secret,
                token_expiry: parse_var("ADMIN_TOKEN_EXPIRY", default_admin_token_expiry())?,
            }),
            _ => None,
        };

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("API_PORT", default_api_port())?,
            },
            gateway: ServerConfig {
                host: env::var("GATEWAY_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("GATEWAY_PORT", default_gateway_port())?,
            },
            database,
            redis: RedisConfig {
                url: non_empty_var("REDIS_URL").ok_or(ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: parse_var(
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections(),
                )?,
            },
            admin,
            rate_limit: RateLimitConfig {
                requests_per_second: parse_var(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second(),
                )?,
                burst: parse_var("RATE_LIMIT_BURST", default_burst())?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            ban_page: BanPageConfig {
                design_cache_ttl_secs: parse_var("DESIGN_CACHE_TTL_SECS", default_design_cache_ttl())?,
                settle_delay_ms: parse_var("BAN_PAGE_SETTLE_DELAY_MS", default_settle_delay())?,
                heartbeat_interval_ms: parse_var(
                    "GATEWAY_HEARTBEAT_INTERVAL_MS",
                    default_heartbeat_interval(),
                )?,
            },
            retry: RetrySettings {
                max_attempts: parse_var("RETRY_MAX_ATTEMPTS", default_retry_max_attempts())?,
                attempt_timeout_secs: parse_var(
                    "POLICY_FETCH_TIMEOUT_SECS",
                    default_policy_fetch_timeout(),
                )?,
            },
        })
    }

    /// Whether a database is configured
    #[must_use]
    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    /// Defaults for an in-process run: no database, no admin, local Redis
    #[must_use]
    pub fn local() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
            },
            api: ServerConfig {
                host: default_host(),
                port: default_api_port(),
            },
            gateway: ServerConfig {
                host: default_host(),
                port: default_gateway_port(),
            },
            database: None,
            redis: RedisConfig {
                url: "redis://127.0.0.1:6379".to_string(),
                max_connections: default_redis_max_connections(),
            },
            admin: None,
            rate_limit: RateLimitConfig {
                requests_per_second: default_requests_per_second(),
                burst: default_burst(),
            },
            cors: CorsConfig {
                allowed_origins: Vec::new(),
            },
            ban_page: BanPageConfig::default(),
            retry: RetrySettings::default(),
        }
    }

    #[must_use]
    pub fn with_admin(mut self, admin: AdminConfig) -> Self {
        self.admin = Some(admin);
        self
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
