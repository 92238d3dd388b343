//! Test fixtures and data generators

use folio_core::VisitorId;
use serde::{Deserialize, Serialize};

/// A fresh visitor id in path form
pub fn new_visitor() -> VisitorId {
    VisitorId::generate()
}

/// Admin ban request
#[derive(Debug, Serialize)]
pub struct BanRequest {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<f64>,
}

impl BanRequest {
    pub fn reason(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
            category: None,
            severity: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// Appeal submission
#[derive(Debug, Serialize)]
pub struct AppealSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub visitor_id: String,
    pub ban_reason: Option<String>,
}

impl AppealSubmission {
    pub fn for_visitor(visitor_id: VisitorId) -> Self {
        Self {
            name: "Sam Visitor".to_string(),
            email: "sam@example.com".to_string(),
            subject: "Please review my ban".to_string(),
            message: "I believe this ban was applied by mistake.".to_string(),
            visitor_id: visitor_id.to_string(),
            ban_reason: Some("spam".to_string()),
        }
    }
}

/// `/api/v1/visitors/{id}/status` body
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub visitor_id: String,
    pub status: String,
    pub ban_reason: Option<String>,
    pub ban_category: Option<String>,
    pub policy_reference: Option<String>,
    pub redirect_to: Option<String>,
}

impl StatusBody {
    /// Gateway path for the ban page this status redirects to
    pub fn live_path(&self) -> Option<String> {
        let redirect = self.redirect_to.as_deref()?;
        Some(match redirect.split_once('?') {
            Some((path, query)) => format!("{path}/live?{query}"),
            None => format!("{redirect}/live"),
        })
    }
}
