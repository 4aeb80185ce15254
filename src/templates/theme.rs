//! Color themes and the templates that support them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TemplateName;
use crate::types::PosterError;

/// Every theme any template offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Red,
    Blue,
    Green,
    Yellow,
    Gray,
    #[serde(rename = "lightblue")]
    LightBlue,
    #[serde(rename = "darkblue")]
    DarkBlue,
    Purple,
    Brown,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Red => "red",
            Theme::Blue => "blue",
            Theme::Green => "green",
            Theme::Yellow => "yellow",
            Theme::Gray => "gray",
            Theme::LightBlue => "lightblue",
            Theme::DarkBlue => "darkblue",
            Theme::Purple => "purple",
            Theme::Brown => "brown",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Theme::Red),
            "blue" => Ok(Theme::Blue),
            "green" => Ok(Theme::Green),
            "yellow" => Ok(Theme::Yellow),
            "gray" | "grey" => Ok(Theme::Gray),
            "lightblue" => Ok(Theme::LightBlue),
            "darkblue" => Ok(Theme::DarkBlue),
            "purple" => Ok(Theme::Purple),
            "brown" => Ok(Theme::Brown),
            other => Err(PosterError::Template(format!("unknown theme: {}", other))),
        }
    }
}

const LIMIT_REVIEW_THEMES: &[Theme] = &[
    Theme::Red,
    Theme::Blue,
    Theme::Green,
    Theme::Yellow,
    Theme::Gray,
    Theme::LightBlue,
];

const PERFORMANCE_FORECAST_THEMES: &[Theme] = &[Theme::Red, Theme::Blue, Theme::Yellow];

const MORNING_SESSION_REVIEW_THEMES: &[Theme] = &[
    Theme::Red,
    Theme::Blue,
    Theme::DarkBlue,
    Theme::Purple,
    Theme::Green,
    Theme::Brown,
];

/// Themes a template can be rendered with (empty for unthemed templates)
pub fn supported_themes(template: TemplateName) -> &'static [Theme] {
    match template {
        TemplateName::LimitReview => LIMIT_REVIEW_THEMES,
        TemplateName::PerformanceForecast => PERFORMANCE_FORECAST_THEMES,
        TemplateName::MorningSessionReview => MORNING_SESSION_REVIEW_THEMES,
        TemplateName::SimpleTemplate | TemplateName::ImageFrame => &[],
    }
}

/// Root style class of a themed template
fn theme_root_class(template: TemplateName) -> Option<&'static str> {
    match template {
        TemplateName::LimitReview => Some("limit-review-theme"),
        TemplateName::PerformanceForecast => Some("performance-forecast-theme"),
        TemplateName::MorningSessionReview => Some("morning-session-review-theme"),
        TemplateName::SimpleTemplate | TemplateName::ImageFrame => None,
    }
}

/// Style class for `theme` on `template`, or `None` if the template does not
/// offer that theme
pub fn theme_class(template: TemplateName, theme: Theme) -> Option<String> {
    if !supported_themes(template).contains(&theme) {
        return None;
    }
    theme_root_class(template).map(|root| format!("{}-{}", theme, root))
}
