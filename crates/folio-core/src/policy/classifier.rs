//! Category classifier - maps a ban reason or a 1-10 severity score to a tier
//!
//! Lookup order for reason text:
//! 1. Exact match against the reason table (after lowercase + trim)
//! 2. Severe keywords
//! 3. Danger keywords
//! 4. Medium keywords
//! 5. `normal`

use crate::value_objects::BanCategory;

/// Exact reason -> category table
const REASON_TABLE: &[(&str, BanCategory)] = &[
    ("spam", BanCategory::Normal),
    ("custom", BanCategory::Normal),
    ("off-topic", BanCategory::Normal),
    ("minor violation", BanCategory::Normal),
    ("excessive requests", BanCategory::Normal),
    ("inappropriate content", BanCategory::Medium),
    ("misleading information", BanCategory::Medium),
    ("impersonation", BanCategory::Medium),
    ("offensive language", BanCategory::Medium),
    ("harassment", BanCategory::Danger),
    ("hate speech", BanCategory::Danger),
    ("bullying", BanCategory::Danger),
    ("abuse", BanCategory::Severe),
    ("threats", BanCategory::Severe),
    ("illegal activity", BanCategory::Severe),
    ("security exploit", BanCategory::Severe),
];

const SEVERE_KEYWORDS: &[&str] = &[
    "abuse", "threat", "violence", "illegal", "exploit", "attack", "doxx", "malware", "terror",
];

const DANGER_KEYWORDS: &[&str] = &[
    "harass", "hate", "bully", "stalk", "intimidat", "discriminat", "slur",
];

const MEDIUM_KEYWORDS: &[&str] = &[
    "inappropriate", "offensive", "misleading", "misinformation", "impersonat", "vulgar", "nsfw",
    "profanity",
];

/// Severity score (index 0 = score 1) -> category
const SEVERITY_TABLE: [BanCategory; 10] = [
    BanCategory::Normal,
    BanCategory::Normal,
    BanCategory::Medium,
    BanCategory::Medium,
    BanCategory::Medium,
    BanCategory::Danger,
    BanCategory::Danger,
    BanCategory::Danger,
    BanCategory::Severe,
    BanCategory::Severe,
];

/// Stateless classifier over the static policy tables
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryClassifier;

impl CategoryClassifier {
    pub const MIN_SEVERITY: i32 = 1;
    pub const MAX_SEVERITY: i32 = 10;

    /// Classify free-text ban reason. Never fails.
    pub fn from_reason(reason: &str) -> BanCategory {
        let normalized = reason.trim().to_lowercase();
        if normalized.is_empty() {
            return BanCategory::Normal;
        }

        if let Some((_, category)) = REASON_TABLE.iter().find(|(key, _)| *key == normalized) {
            return *category;
        }

        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| normalized.contains(k));

        if contains_any(SEVERE_KEYWORDS) {
            BanCategory::Severe
        } else if contains_any(DANGER_KEYWORDS) {
            BanCategory::Danger
        } else if contains_any(MEDIUM_KEYWORDS) {
            BanCategory::Medium
        } else {
            BanCategory::Normal
        }
    }

    /// Classify an integer severity score; out-of-range input is clamped
    pub fn from_severity(severity: i32) -> BanCategory {
        let clamped = severity.clamp(Self::MIN_SEVERITY, Self::MAX_SEVERITY);
        SEVERITY_TABLE[(clamped - 1) as usize]
    }

    /// Classify a fractional severity score (clamped, then rounded to nearest)
    pub fn from_severity_f64(severity: f64) -> BanCategory {
        if severity.is_nan() {
            return BanCategory::Normal;
        }
        let clamped = severity.clamp(f64::from(Self::MIN_SEVERITY), f64::from(Self::MAX_SEVERITY));
        Self::from_severity(clamped.round() as i32)
    }

    /// Representative severity for display
    pub const fn to_severity(category: BanCategory) -> i32 {
        match category {
            BanCategory::Normal => 2,
            BanCategory::Medium => 5,
            BanCategory::Danger => 7,
            BanCategory::Severe => 9,
        }
    }

    /// Expected appeal review time shown on the ban page
    pub const fn appeal_processing_time(category: BanCategory) -> &'static str {
        match category {
            BanCategory::Normal => "24 hours",
            BanCategory::Medium => "2-3 days",
            BanCategory::Danger => "5-7 days",
            BanCategory::Severe => "7-14 days",
        }
    }
}
