//! Poster templates: registry, form defaults and sheet mapping

pub mod limit_review;
pub mod morning_session_review;
pub mod performance_forecast;
pub mod theme;

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::parsers::Sheet;
use crate::types::{CapitalFlowItem, PosterError, Result};

pub use limit_review::{LimitItem, LimitPart, LimitReviewForm};
pub use morning_session_review::{FlowDirection, MorningSessionReviewForm};
pub use performance_forecast::{PerformanceForecastForm, PerformanceForecastItem};
pub use theme::{supported_themes, theme_class, Theme};

/// Available poster templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateName {
    LimitReview,
    PerformanceForecast,
    SimpleTemplate,
    MorningSessionReview,
    ImageFrame,
}

impl TemplateName {
    pub fn all() -> &'static [TemplateName] {
        &[
            TemplateName::LimitReview,
            TemplateName::PerformanceForecast,
            TemplateName::SimpleTemplate,
            TemplateName::MorningSessionReview,
            TemplateName::ImageFrame,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateName::LimitReview => "LimitReview",
            TemplateName::PerformanceForecast => "PerformanceForecast",
            TemplateName::SimpleTemplate => "SimpleTemplate",
            TemplateName::MorningSessionReview => "MorningSessionReview",
            TemplateName::ImageFrame => "ImageFrame",
        }
    }

    /// Command-line spelling (e.g., "limit-review")
    pub fn cli_name(&self) -> &'static str {
        match self {
            TemplateName::LimitReview => "limit-review",
            TemplateName::PerformanceForecast => "performance-forecast",
            TemplateName::SimpleTemplate => "simple-template",
            TemplateName::MorningSessionReview => "morning-session-review",
            TemplateName::ImageFrame => "image-frame",
        }
    }

    /// Template configuration with dates taken from the local clock
    pub fn config(&self) -> TemplateConfig {
        self.config_at(Local::now().naive_local())
    }

    /// Template configuration with dates derived from `now`
    pub fn config_at(&self, now: NaiveDateTime) -> TemplateConfig {
        match self {
            TemplateName::LimitReview => limit_review::config(now.date()),
            TemplateName::PerformanceForecast => performance_forecast::config(),
            TemplateName::MorningSessionReview => morning_session_review::config(now),
            TemplateName::SimpleTemplate | TemplateName::ImageFrame => TemplateConfig {
                name: *self,
                disabled_fields: BaseField::ALL,
                base_form_default: None,
                template_form_default: None,
            },
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateName {
    type Err = PosterError;

    /// Accepts "LimitReview", "limit-review" or "limit_review", any case
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        TemplateName::all()
            .iter()
            .copied()
            .find(|t| t.as_str().to_ascii_lowercase() == key)
            .ok_or_else(|| PosterError::Template(format!("unknown template: {}", s)))
    }
}

/// Fields of the base form shared by every template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseField {
    Title,
    SubTitle,
    Description,
    Annotation,
    DataSource,
    Producer,
    FileList,
}

impl BaseField {
    pub const ALL: &'static [BaseField] = &[
        BaseField::Title,
        BaseField::SubTitle,
        BaseField::Description,
        BaseField::Annotation,
        BaseField::DataSource,
        BaseField::Producer,
        BaseField::FileList,
    ];
}

/// Downloadable sample sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFile {
    pub name: String,
    pub url: String,
}

/// Title block and footer shared by every poster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_list: Vec<SampleFile>,
}

impl BaseForm {
    /// Clear every field listed in `disabled`
    pub fn without(mut self, disabled: &[BaseField]) -> Self {
        for field in disabled {
            match field {
                BaseField::Title => self.title = None,
                BaseField::SubTitle => self.sub_title = None,
                BaseField::Description => self.description = None,
                BaseField::Annotation => self.annotation = None,
                BaseField::DataSource => self.data_source = None,
                BaseField::Producer => self.producer = None,
                BaseField::FileList => self.file_list.clear(),
            }
        }
        self
    }
}

/// Template-specific form defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateForm {
    LimitReview(LimitReviewForm),
    MorningSessionReview(MorningSessionReviewForm),
    PerformanceForecast(PerformanceForecastForm),
}

impl TemplateForm {
    pub fn theme(&self) -> Theme {
        match self {
            TemplateForm::LimitReview(f) => f.theme,
            TemplateForm::MorningSessionReview(f) => f.theme,
            TemplateForm::PerformanceForecast(f) => f.theme,
        }
    }
}

/// Static configuration of a template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConfig {
    pub name: TemplateName,
    /// Base form fields the template does not use
    pub disabled_fields: &'static [BaseField],
    pub base_form_default: Option<BaseForm>,
    pub template_form_default: Option<TemplateForm>,
}

impl TemplateConfig {
    pub fn is_enabled(&self, field: BaseField) -> bool {
        !self.disabled_fields.contains(&field)
    }

    /// Default base form with disabled fields removed
    pub fn base_form(&self) -> BaseForm {
        self.base_form_default
            .clone()
            .unwrap_or_default()
            .without(self.disabled_fields)
    }

    pub fn default_theme(&self) -> Option<Theme> {
        self.template_form_default.as_ref().map(TemplateForm::theme)
    }
}

/// Typed poster payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateData {
    LimitReview(Vec<LimitPart>),
    PerformanceForecast(Vec<PerformanceForecastItem>),
    MorningSessionReview(Vec<CapitalFlowItem>),
    Empty,
}

impl TemplateData {
    /// Decode a payload written for `template`
    pub fn from_value(template: TemplateName, value: serde_json::Value) -> Result<Self> {
        Ok(match template {
            TemplateName::LimitReview => TemplateData::LimitReview(serde_json::from_value(value)?),
            TemplateName::PerformanceForecast => {
                TemplateData::PerformanceForecast(serde_json::from_value(value)?)
            }
            TemplateName::MorningSessionReview => {
                TemplateData::MorningSessionReview(serde_json::from_value(value)?)
            }
            TemplateName::SimpleTemplate | TemplateName::ImageFrame => TemplateData::Empty,
        })
    }

    pub fn len(&self) -> usize {
        match self {
            TemplateData::LimitReview(parts) => parts.len(),
            TemplateData::PerformanceForecast(items) => items.len(),
            TemplateData::MorningSessionReview(items) => items.len(),
            TemplateData::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Map an uploaded sheet onto the template's data shape
pub fn parse_sheet(template: TemplateName, sheet: &Sheet) -> TemplateData {
    match template {
        TemplateName::LimitReview => TemplateData::LimitReview(limit_review::from_sheet(sheet)),
        TemplateName::PerformanceForecast => {
            TemplateData::PerformanceForecast(performance_forecast::from_sheet(sheet))
        }
        // Filled from the capital flow API, not from sheets
        TemplateName::MorningSessionReview => TemplateData::MorningSessionReview(Vec::new()),
        TemplateName::SimpleTemplate | TemplateName::ImageFrame => TemplateData::Empty,
    }
}

/// "MM/DD" as used in poster titles
pub(crate) fn month_day(date: NaiveDate) -> String {
    date.format("%m/%d").to_string()
}
