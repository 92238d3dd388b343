//! Appeal entity - a banned visitor's request for review

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::VisitorId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appeal {
    pub id: Uuid,
    pub visitor_id: VisitorId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appeal {
    pub fn new(
        visitor_id: VisitorId,
        name: String,
        email: String,
        subject: String,
        message: String,
        ban_reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            visitor_id,
            name,
            email,
            subject,
            message,
            ban_reason,
            created_at: Utc::now(),
        }
    }
}
