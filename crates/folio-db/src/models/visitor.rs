//! Visitor database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for visitors table
#[derive(Debug, Clone, FromRow)]
pub struct VisitorModel {
    pub id: Uuid,
    pub status: String,
    pub document: serde_json::Value,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
