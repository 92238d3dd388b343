//! Visitor entity - one document per portfolio visitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::policy::CategoryClassifier;
use crate::value_objects::{BanCategory, VisitorId};

/// Moderation status of a visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitorStatus {
    #[default]
    Active,
    Banned,
}

impl VisitorStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Banned => "banned",
        }
    }
}

/// Device metadata captured by the tracking beacon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub language: Option<String>,
    pub screen_resolution: Option<String>,
    pub timezone: Option<String>,
}

/// Coarse location metadata captured by the tracking beacon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationInfo {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

/// Visitor document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub id: VisitorId,
    #[serde(default)]
    pub status: VisitorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ban_category: Option<BanCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unbanned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub device: DeviceInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
    #[serde(default)]
    pub online: bool,
    #[serde(default = "Utc::now")]
    pub last_seen: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub first_seen: DateTime<Utc>,
    #[serde(default)]
    pub visit_count: u64,
}

impl VisitorRecord {
    /// Create an active visitor seen for the first time now
    pub fn new(id: VisitorId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: VisitorStatus::Active,
            ban_reason: None,
            ban_category: None,
            banned_at: None,
            unbanned_at: None,
            policy_reference: None,
            admin_notes: None,
            device: DeviceInfo::default(),
            location: None,
            online: false,
            last_seen: now,
            first_seen: now,
            visit_count: 0,
        }
    }

    /// Parse and validate a raw document read from storage
    pub fn from_document(value: serde_json::Value) -> Result<Self, DomainError> {
        serde_json::from_value(value)
            .map_err(|e| DomainError::InvalidDocument(format!("visitor: {e}")))
    }

    /// Serialize into a storage document
    pub fn to_document(&self) -> Result<serde_json::Value, DomainError> {
        serde_json::to_value(self).map_err(|e| DomainError::InternalError(e.to_string()))
    }

    #[inline]
    pub fn is_banned(&self) -> bool {
        self.status == VisitorStatus::Banned
    }

    /// Category to theme the ban page with.
    /// Falls back to classifying the reason when no category was stored.
    pub fn effective_category(&self) -> BanCategory {
        self.ban_category.unwrap_or_else(|| {
            CategoryClassifier::from_reason(self.ban_reason.as_deref().unwrap_or_default())
        })
    }

    /// Ban the visitor
    pub fn ban(&mut self, reason: String, category: BanCategory, policy_reference: Option<String>) {
        self.status = VisitorStatus::Banned;
        self.ban_reason = Some(reason);
        self.ban_category = Some(category);
        self.banned_at = Some(Utc::now());
        self.unbanned_at = None;
        if policy_reference.is_some() {
            self.policy_reference = policy_reference;
        }
    }

    /// Lift the ban; reason and category are kept for the audit trail
    pub fn unban(&mut self) {
        self.status = VisitorStatus::Active;
        self.unbanned_at = Some(Utc::now());
    }

    /// Record a page visit from the tracking beacon
    pub fn record_visit(&mut self, device: DeviceInfo, location: Option<LocationInfo>) {
        self.device = device;
        if location.is_some() {
            self.location = location;
        }
        self.visit_count += 1;
        self.touch(true);
    }

    /// Update presence from a heartbeat
    pub fn touch(&mut self, online: bool) {
        self.online = online;
        self.last_seen = Utc::now();
    }
}
