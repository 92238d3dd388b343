//! Ban page design database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for ban_page_designs table
#[derive(Debug, Clone, FromRow)]
pub struct DesignModel {
    pub category: String,
    pub version: i32,
    pub document: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
