//! Response DTOs for API endpoints

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use folio_core::{BanCategory, CategoryClassifier, VisitorId, VisitorRecord, VisitorStatus};

// ============================================================================
// Visitor Responses
// ============================================================================

/// What the portfolio page needs to know about its visitor
#[derive(Debug, Clone, Serialize)]
pub struct VisitorStatusResponse {
    pub visitor_id: VisitorId,
    pub status: VisitorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_category: Option<BanCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_reference: Option<String>,
    /// Ban page URL when banned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl VisitorStatusResponse {
    /// Unknown visitors are active
    pub fn active(visitor_id: VisitorId) -> Self {
        Self {
            visitor_id,
            status: VisitorStatus::Active,
            ban_reason: None,
            ban_category: None,
            policy_reference: None,
            redirect_to: None,
        }
    }

    pub fn from_record(record: &VisitorRecord) -> Self {
        if !record.is_banned() {
            return Self::active(record.id);
        }

        let category = record.effective_category();
        Self {
            visitor_id: record.id,
            status: VisitorStatus::Banned,
            ban_reason: record.ban_reason.clone(),
            ban_category: Some(category),
            policy_reference: record.policy_reference.clone(),
            redirect_to: Some(ban_page_url(record)),
        }
    }

    pub fn is_banned(&self) -> bool {
        self.status == VisitorStatus::Banned
    }
}

/// `/ban/{id}?reason=&policyReference=&category=`
pub fn ban_page_url(record: &VisitorRecord) -> String {
    let mut url = format!(
        "/ban/{}?category={}",
        record.id,
        record.effective_category()
    );
    if let Some(reason) = &record.ban_reason {
        url.push_str("&reason=");
        url.push_str(&urlencoding::encode(reason));
    }
    if let Some(reference) = &record.policy_reference {
        url.push_str("&policyReference=");
        url.push_str(&urlencoding::encode(reference));
    }
    url
}

/// Policy reference lookup result
#[derive(Debug, Clone, Serialize)]
pub struct PolicyReferenceResponse {
    pub visitor_id: VisitorId,
    /// `None` while it could not be fetched or generated
    pub policy_reference: Option<String>,
}

// ============================================================================
// Policy Responses
// ============================================================================

/// Result of classifying a reason or severity
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResponse {
    pub category: BanCategory,
    pub severity: i32,
    pub processing_time: &'static str,
}

impl ClassificationResponse {
    pub fn new(category: BanCategory) -> Self {
        Self {
            category,
            severity: CategoryClassifier::to_severity(category),
            processing_time: CategoryClassifier::appeal_processing_time(category),
        }
    }
}

/// Appeal accepted
#[derive(Debug, Clone, Serialize)]
pub struct AppealResponse {
    pub success: bool,
    pub id: Uuid,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

fn check_label(healthy: Option<bool>) -> String {
    match healthy {
        Some(true) => "healthy",
        Some(false) => "unhealthy",
        None => "not_configured",
    }
    .to_string()
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    /// `healthy`, `unhealthy`, or `not_configured`
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    /// `None` marks a backing service this process runs without
    pub fn ready(database_healthy: Option<bool>, redis_healthy: Option<bool>) -> Self {
        let all_healthy = database_healthy.unwrap_or(true) && redis_healthy.unwrap_or(true);
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: check_label(database_healthy),
                redis: check_label(redis_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
