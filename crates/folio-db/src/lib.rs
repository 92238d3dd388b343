//! # folio-db
//!
//! Storage layer implementing the repository traits from `folio-core`.
//!
//! Three backends are provided:
//!
//! - PostgreSQL repositories keeping each document as JSONB (`Pg*Repository`)
//! - `MemoryStore`, an in-process store that also implements the live document
//!   feed, used by tests and single-process development runs
//! - `OfflineStore`, used when no database is configured: reads find nothing
//!   and writes are skipped
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use folio_db::PgVisitorRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let visitors = PgVisitorRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod models;
pub mod offline;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use offline::OfflineStore;
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgAppealRepository, PgDesignRepository, PgVisitorRepository};
