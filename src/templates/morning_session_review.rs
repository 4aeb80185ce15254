//! Morning session review: futures capital flow top 20

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{month_day, BaseField, BaseForm, SampleFile, TemplateConfig, TemplateForm, TemplateName, Theme};
use crate::types::{CapitalFlowItem, CapitalRanking};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorningSessionReviewForm {
    pub theme: Theme,
    pub excel_data: Vec<CapitalFlowItem>,
}

/// Which ranking a theme displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Inflow,
    Outflow,
    Neutral,
}

impl FlowDirection {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Brown | Theme::Purple | Theme::Red => FlowDirection::Inflow,
            Theme::DarkBlue | Theme::Blue | Theme::Green => FlowDirection::Outflow,
            _ => FlowDirection::Neutral,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FlowDirection::Inflow => "期货资金流入前20",
            FlowDirection::Outflow => "期货资金流出前20",
            FlowDirection::Neutral => "期货资金流向前20",
        }
    }
}

pub fn title_by_theme(theme: Theme) -> &'static str {
    FlowDirection::for_theme(theme).title()
}

/// Ranking shown for `theme`; neutral themes fall back to inflow
pub fn select(theme: Theme, ranking: &CapitalRanking) -> Vec<CapitalFlowItem> {
    match FlowDirection::for_theme(theme) {
        FlowDirection::Outflow => ranking.outflow_top20.clone(),
        FlowDirection::Inflow | FlowDirection::Neutral => ranking.inflow_top20.clone(),
    }
}

pub(super) fn config(now: NaiveDateTime) -> TemplateConfig {
    TemplateConfig {
        name: TemplateName::MorningSessionReview,
        disabled_fields: &[BaseField::FileList],
        base_form_default: Some(BaseForm {
            title: Some(title_by_theme(Theme::Red).to_string()),
            sub_title: Some(format!("{}今日回顾", month_day(now.date()))),
            annotation: Some(format!("数据截至时间：{}", now.format("%-m月%-d日 %H:%M"))),
            data_source: Some("同花顺期货通".to_string()),
            producer: Some("@ 同花顺期货通".to_string()),
            file_list: vec![SampleFile {
                name: "示例(点击下载).xlsx".to_string(),
                url: "xlsx/PerformanceForecast.xlsx".to_string(),
            }],
            ..Default::default()
        }),
        template_form_default: Some(TemplateForm::MorningSessionReview(MorningSessionReviewForm {
            theme: Theme::Red,
            excel_data: Vec::new(),
        })),
    }
}
