//! Built-in ban page designs
//!
//! These are the last fallback layer: the ban page must render even when no
//! design document exists or storage is unreachable.

use chrono::{DateTime, Utc};

use crate::entities::{
    BanPageDesign, CardStyle, DesignAnimation, DesignContent, DesignIcons, DesignLayout,
    DesignTheme, EntranceStyle,
};
use crate::policy::CategoryClassifier;
use crate::value_objects::BanCategory;

/// Hardcoded design for `category` (version 0, empty changelog)
pub fn default_design(category: BanCategory) -> BanPageDesign {
    let (theme, content, icons, layout, animation) = match category {
        BanCategory::Normal => normal(),
        BanCategory::Medium => medium(),
        BanCategory::Danger => danger(),
        BanCategory::Severe => severe(),
    };

    BanPageDesign {
        category,
        theme,
        content: DesignContent {
            processing_time: CategoryClassifier::appeal_processing_time(category).to_string(),
            ..content
        },
        icons,
        layout,
        animation,
        version: 0,
        changelog: Vec::new(),
        updated_at: DateTime::<Utc>::default(),
    }
}

type Parts = (
    DesignTheme,
    DesignContent,
    DesignIcons,
    DesignLayout,
    DesignAnimation,
);

fn theme(
    primary: &str,
    secondary: &str,
    accent: &str,
    background: &str,
    text: &str,
    gradient: &str,
) -> DesignTheme {
    DesignTheme {
        primary_color: primary.to_string(),
        secondary_color: secondary.to_string(),
        accent_color: accent.to_string(),
        background_color: background.to_string(),
        text_color: text.to_string(),
        gradient: gradient.to_string(),
    }
}

fn content(title: &str, subtitle: &str, message: &str, appeal: &str) -> DesignContent {
    DesignContent {
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        message: message.to_string(),
        appeal_button_label: appeal.to_string(),
        processing_time: String::new(),
    }
}

fn icons(main: &str, badge: &str) -> DesignIcons {
    DesignIcons {
        main_icon: main.to_string(),
        badge_icon: badge.to_string(),
    }
}

fn normal() -> Parts {
    (
        theme(
            "#3b82f6",
            "#1e40af",
            "#93c5fd",
            "#eff6ff",
            "#1e293b",
            "linear-gradient(135deg, #eff6ff 0%, #dbeafe 100%)",
        ),
        content(
            "Access Temporarily Restricted",
            "A quick pause on your visit",
            "Your access to this portfolio has been restricted for a minor policy issue. \
             If you think this was a mistake, let me know and I will take a look.",
            "Request Review",
        ),
        icons("/icons/ban/info-circle.svg", "/icons/ban/badge-normal.svg"),
        DesignLayout {
            card_style: CardStyle::Minimal,
            max_width: 560,
            show_policy_reference: true,
            show_appeal: true,
        },
        DesignAnimation {
            pulse: false,
            shake: false,
            entrance: EntranceStyle::Fade,
            duration_ms: 400,
        },
    )
}

fn medium() -> Parts {
    (
        theme(
            "#f59e0b",
            "#b45309",
            "#fcd34d",
            "#fffbeb",
            "#451a03",
            "linear-gradient(135deg, #fffbeb 0%, #fef3c7 100%)",
        ),
        content(
            "Access Restricted",
            "Content policy violation",
            "Your access has been restricted because activity from this visit \
             violated the content policy. You can submit an appeal below.",
            "Submit Appeal",
        ),
        icons("/icons/ban/alert-triangle.svg", "/icons/ban/badge-medium.svg"),
        DesignLayout {
            card_style: CardStyle::Bordered,
            max_width: 600,
            show_policy_reference: true,
            show_appeal: true,
        },
        DesignAnimation {
            pulse: false,
            shake: false,
            entrance: EntranceStyle::Slide,
            duration_ms: 500,
        },
    )
}

fn danger() -> Parts {
    (
        theme(
            "#ef4444",
            "#b91c1c",
            "#fca5a5",
            "#fef2f2",
            "#450a0a",
            "linear-gradient(135deg, #fef2f2 0%, #fee2e2 100%)",
        ),
        content(
            "Access Denied",
            "Serious policy violation",
            "Your access has been blocked due to a serious violation of the \
             community policy. Appeals are reviewed manually.",
            "Appeal Decision",
        ),
        icons("/icons/ban/shield-x.svg", "/icons/ban/badge-danger.svg"),
        DesignLayout {
            card_style: CardStyle::Elevated,
            max_width: 640,
            show_policy_reference: true,
            show_appeal: true,
        },
        DesignAnimation {
            pulse: true,
            shake: false,
            entrance: EntranceStyle::Zoom,
            duration_ms: 600,
        },
    )
}

fn severe() -> Parts {
    (
        theme(
            "#7f1d1d",
            "#450a0a",
            "#dc2626",
            "#0a0a0a",
            "#fafafa",
            "linear-gradient(135deg, #0a0a0a 0%, #450a0a 100%)",
        ),
        content(
            "Permanently Blocked",
            "Critical policy violation",
            "Your access has been blocked because of a critical violation. \
             This decision is only reversed after a full manual review.",
            "File Formal Appeal",
        ),
        icons("/icons/ban/octagon-x.svg", "/icons/ban/badge-severe.svg"),
        DesignLayout {
            card_style: CardStyle::Alert,
            max_width: 680,
            show_policy_reference: true,
            show_appeal: true,
        },
        DesignAnimation {
            pulse: true,
            shake: true,
            entrance: EntranceStyle::Shake,
            duration_ms: 700,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_is_valid() {
        for category in BanCategory::ALL {
            let design = default_design(category);
            assert_eq!(design.category, category);
            assert_eq!(design.version, 0);
            design.validate().unwrap();
        }
    }

    #[test]
    fn test_defaults_are_distinct() {
        let normal = default_design(BanCategory::Normal);
        let severe = default_design(BanCategory::Severe);
        assert_ne!(normal.theme.primary_color, severe.theme.primary_color);
        assert_ne!(normal.content.title, severe.content.title);
    }

    #[test]
    fn test_processing_time_follows_category() {
        assert_eq!(
            default_design(BanCategory::Normal).content.processing_time,
            "24 hours"
        );
        assert_eq!(
            default_design(BanCategory::Severe).content.processing_time,
            "7-14 days"
        );
    }
}
