//! Ban page parameters

use serde::Deserialize;

use folio_core::{is_valid_policy_reference, BanCategory, CategoryClassifier, VisitorId};

/// Raw query string of `/ban/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanPageQuery {
    pub reason: Option<String>,
    pub policy_reference: Option<String>,
    pub category: Option<String>,
    /// 1-10, used when no category is given
    pub severity: Option<String>,
}

/// What the page knows before any document is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanPageParams {
    pub visitor_id: Option<VisitorId>,
    pub ban_reason: Option<String>,
    pub policy_reference: Option<String>,
    pub initial_category: BanCategory,
}

impl BanPageParams {
    pub fn new(visitor_id: Option<VisitorId>) -> Self {
        Self {
            visitor_id,
            ban_reason: None,
            policy_reference: None,
            initial_category: BanCategory::default(),
        }
    }

    /// Category comes from `category`, else `severity`, else the reason.
    /// Unparseable values fall through to the next source.
    pub fn from_query(visitor_id: Option<VisitorId>, query: &BanPageQuery) -> Self {
        let ban_reason = query
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let explicit = query
            .category
            .as_deref()
            .and_then(|c| c.parse::<BanCategory>().ok());
        let from_severity = || {
            query
                .severity
                .as_deref()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|s| s.is_finite())
                .map(CategoryClassifier::from_severity_f64)
        };
        let initial_category = explicit
            .or_else(from_severity)
            .unwrap_or_else(|| CategoryClassifier::from_reason(ban_reason.as_deref().unwrap_or_default()));

        let policy_reference = query
            .policy_reference
            .as_deref()
            .map(str::trim)
            .filter(|r| is_valid_policy_reference(r))
            .map(str::to_string);

        Self {
            visitor_id,
            ban_reason,
            policy_reference,
            initial_category,
        }
    }
}
