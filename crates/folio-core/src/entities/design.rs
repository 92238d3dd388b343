//! Ban page design - theme, copy, and layout knobs for one severity tier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::BanCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTheme {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub gradient: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignContent {
    pub title: String,
    pub subtitle: String,
    pub message: String,
    pub appeal_button_label: String,
    pub processing_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignIcons {
    pub main_icon: String,
    pub badge_icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    #[default]
    Minimal,
    Bordered,
    Elevated,
    Alert,
}

impl CardStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Bordered => "bordered",
            Self::Elevated => "elevated",
            Self::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignLayout {
    #[serde(default)]
    pub card_style: CardStyle,
    pub max_width: u32,
    pub show_policy_reference: bool,
    pub show_appeal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntranceStyle {
    #[default]
    Fade,
    Slide,
    Zoom,
    Shake,
}

impl EntranceStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Slide => "slide",
            Self::Zoom => "zoom",
            Self::Shake => "shake",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignAnimation {
    pub pulse: bool,
    pub shake: bool,
    #[serde(default)]
    pub entrance: EntranceStyle,
    pub duration_ms: u32,
}

/// One entry of the design's revision trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignChange {
    pub version: u32,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// Design document for one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanPageDesign {
    pub category: BanCategory,
    pub theme: DesignTheme,
    pub content: DesignContent,
    pub icons: DesignIcons,
    pub layout: DesignLayout,
    pub animation: DesignAnimation,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub changelog: Vec<DesignChange>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl BanPageDesign {
    /// Parse and validate a raw document read from storage
    pub fn from_document(value: serde_json::Value) -> Result<Self, DomainError> {
        let design: Self = serde_json::from_value(value)
            .map_err(|e| DomainError::InvalidDocument(format!("design: {e}")))?;
        design.validate()?;
        Ok(design)
    }

    /// Serialize into a storage document
    pub fn to_document(&self) -> Result<serde_json::Value, DomainError> {
        serde_json::to_value(self).map_err(|e| DomainError::InternalError(e.to_string()))
    }

    /// Check that the design can be rendered
    pub fn validate(&self) -> Result<(), DomainError> {
        let colors = [
            ("primaryColor", &self.theme.primary_color),
            ("secondaryColor", &self.theme.secondary_color),
            ("accentColor", &self.theme.accent_color),
            ("backgroundColor", &self.theme.background_color),
            ("textColor", &self.theme.text_color),
        ];
        for (field, value) in colors {
            if !is_hex_color(value) {
                return Err(DomainError::InvalidDocument(format!(
                    "design {}: {field} is not a hex color: {value}",
                    self.category
                )));
            }
        }

        if self.content.title.trim().is_empty() {
            return Err(DomainError::InvalidDocument(format!(
                "design {}: title is empty",
                self.category
            )));
        }

        if self.layout.max_width == 0 {
            return Err(DomainError::InvalidDocument(format!(
                "design {}: maxWidth must be positive",
                self.category
            )));
        }

        Ok(())
    }

    /// Turn an edited design into the next revision of `previous`
    pub fn revise(
        mut self,
        previous: Option<&BanPageDesign>,
        summary: impl Into<String>,
        changed_by: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let (version, mut changelog) = match previous {
            Some(prev) => (prev.version + 1, prev.changelog.clone()),
            None => (1, Vec::new()),
        };
        changelog.push(DesignChange {
            version,
            summary: summary.into(),
            changed_by,
            changed_at: now,
        });
        self.version = version;
        self.changelog = changelog;
        self.updated_at = now;
        self
    }
}

/// `#rgb` or `#rrggbb`
fn is_hex_color(value: &str) -> bool {
    value.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit())
    })
}
