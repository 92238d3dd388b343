//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`; bodies also implement `Validate`.

use serde::Deserialize;
use validator::Validate;

use folio_core::{BanPageDesign, DeviceInfo, LocationInfo};

// ============================================================================
// Visitor Requests
// ============================================================================

/// Beacon sent when the portfolio page loads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackVisitRequest {
    #[serde(default)]
    pub device: DeviceInfo,

    #[serde(default)]
    pub location: Option<LocationInfo>,
}

/// Periodic presence beacon
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatRequest {
    #[serde(default = "default_online")]
    pub online: bool,
}

impl Default for HeartbeatRequest {
    fn default() -> Self {
        Self { online: true }
    }
}

fn default_online() -> bool {
    true
}

// ============================================================================
// Admin Requests
// ============================================================================

/// Admin login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

/// Ban a visitor; the category is derived from the reason unless given
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BanVisitorRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,

    /// `normal`, `medium`, `danger`, or `severe`
    pub category: Option<String>,

    #[validate(range(min = 1.0, max = 10.0, message = "Severity must be between 1 and 10"))]
    pub severity: Option<f64>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Replace the admin notes on a visitor
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateNotesRequest {
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Query for the admin visitor list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListVisitorsQuery {
    /// `active` or `banned`
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Publish a new revision of a tier's design
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertDesignRequest {
    pub design: BanPageDesign,

    #[validate(length(min = 1, max = 200, message = "Summary must be 1-200 characters"))]
    pub summary: String,
}

// ============================================================================
// Public Requests
// ============================================================================

/// Classify a reason or a severity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifyQuery {
    pub reason: Option<String>,
    pub severity: Option<f64>,
}

/// Appeal submitted from the ban page
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppealRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,

    #[validate(length(min = 1, message = "Visitor ID is required"))]
    pub visitor_id: String,

    #[validate(length(max = 500, message = "Ban reason must be at most 500 characters"))]
    pub ban_reason: Option<String>,
}
