//! Ban category - the four severity tiers a ban page can be themed with

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity tier of a ban
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BanCategory {
    #[default]
    Normal,
    Medium,
    Danger,
    Severe,
}

/// Error returned when a string does not name a category
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown ban category: {0}")]
pub struct BanCategoryParseError(pub String);

impl BanCategory {
    /// All tiers, least to most severe
    pub const ALL: [Self; 4] = [Self::Normal, Self::Medium, Self::Danger, Self::Severe];

    /// Lowercase name used in documents, URLs, and channel names
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Medium => "medium",
            Self::Danger => "danger",
            Self::Severe => "severe",
        }
    }
}

impl FromStr for BanCategory {
    type Err = BanCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "medium" => Ok(Self::Medium),
            "danger" => Ok(Self::Danger),
            "severe" => Ok(Self::Severe),
            _ => Err(BanCategoryParseError(s.to_string())),
        }
    }
}

impl fmt::Display for BanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
