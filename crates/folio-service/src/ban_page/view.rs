//! Render state of a ban page

use serde::Serialize;

use folio_core::{BanCategory, BanPageDesign, CategoryClassifier, VisitorId};

use super::params::BanPageParams;

const NO_REASON: &str = "No reason provided";

/// Visitor-side facts the page displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BanPageFacts {
    pub visitor_id: Option<VisitorId>,
    pub category: BanCategory,
    pub ban_reason: Option<String>,
    pub policy_reference: Option<String>,
    pub connection_lost: bool,
}

impl From<&BanPageParams> for BanPageFacts {
    fn from(params: &BanPageParams) -> Self {
        Self {
            visitor_id: params.visitor_id,
            category: params.initial_category,
            ban_reason: params.ban_reason.clone(),
            policy_reference: params.policy_reference.clone(),
            connection_lost: false,
        }
    }
}

/// Everything needed to draw the page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanPageView {
    pub visitor_id: Option<VisitorId>,
    pub category: BanCategory,
    pub severity: i32,
    pub ban_reason: String,
    /// `None` renders as a "generating" placeholder
    pub policy_reference: Option<String>,
    pub processing_time: String,
    pub appeal_url: Option<String>,
    pub connection_lost: bool,
    pub design: BanPageDesign,
}

impl BanPageView {
    /// Combine the latest facts with the latest design
    pub(crate) fn derive(facts: &BanPageFacts, design: &BanPageDesign) -> Self {
        let processing_time = if design.content.processing_time.trim().is_empty() {
            CategoryClassifier::appeal_processing_time(facts.category).to_string()
        } else {
            design.content.processing_time.clone()
        };

        let appeal_url = design.layout.show_appeal.then(|| match facts.visitor_id {
            Some(id) => format!("/appeal?visitor={id}"),
            None => "/appeal".to_string(),
        });

        Self {
            visitor_id: facts.visitor_id,
            category: facts.category,
            severity: CategoryClassifier::to_severity(facts.category),
            ban_reason: facts
                .ban_reason
                .clone()
                .unwrap_or_else(|| NO_REASON.to_string()),
            policy_reference: facts.policy_reference.clone(),
            processing_time,
            appeal_url,
            connection_lost: facts.connection_lost,
            design: design.clone(),
        }
    }

    /// Portfolio URL to return to once unbanned
    pub fn portfolio_url(&self) -> Option<String> {
        self.visitor_id.map(|id| id.portfolio_path())
    }
}
