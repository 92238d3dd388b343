//! Appeal database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for appeals table
#[derive(Debug, Clone, FromRow)]
pub struct AppealModel {
    pub id: Uuid,
    pub visitor_id: Uuid,
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
