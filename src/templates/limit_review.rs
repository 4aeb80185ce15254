//! Limit-up review: stocks grouped by limit-up reason

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{month_day, BaseField, BaseForm, SampleFile, TemplateConfig, TemplateForm, TemplateName, Theme};
use crate::parsers::{ColumnRule, RuleSet, Sheet};

/// Column holding the grouping reason; matched exactly
pub const REASON_COLUMN: &str = "涨停原因";

/// Groups whose reason contains this marker sort last
const OTHER_MARKER: &str = "其他";

/// One limit-up stock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitItem {
    pub stock_code: String,
    pub stock_name: String,
    /// Consecutive limit-up days
    pub limit_times: u32,
    pub last_limit_time: String,
    pub cause_category: String,
    pub limit_type: String,
}

/// Stocks sharing a limit-up reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitPart {
    pub reason: String,
    pub items: Vec<LimitItem>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    StockCode,
    StockName,
    LimitTimes,
    LastLimitTime,
    CauseCategory,
    LimitType,
}

const RULES: RuleSet<Field> = RuleSet::new(&[
    ColumnRule { pattern: "股票代码", field: Field::StockCode },
    ColumnRule { pattern: "股票简称", field: Field::StockName },
    ColumnRule { pattern: "连续涨停天数", field: Field::LimitTimes },
    ColumnRule { pattern: "最终涨停时间", field: Field::LastLimitTime },
    ColumnRule { pattern: "涨停原因类别", field: Field::CauseCategory },
    ColumnRule { pattern: "涨停类型", field: Field::LimitType },
]);

/// Template form defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitReviewForm {
    pub is_long: bool,
    pub qr_code: String,
    pub total: u32,
    pub total_promotion_rate: f64,
    pub total_blast_rate: f64,
    pub total_bid_increase: f64,
    pub theme: Theme,
}

impl Default for LimitReviewForm {
    fn default() -> Self {
        Self {
            is_long: false,
            qr_code: String::new(),
            total: 0,
            total_promotion_rate: 0.0,
            total_blast_rate: 0.0,
            total_bid_increase: 0.0,
            theme: Theme::Red,
        }
    }
}

pub(super) fn config(today: NaiveDate) -> TemplateConfig {
    TemplateConfig {
        name: TemplateName::LimitReview,
        disabled_fields: &[BaseField::SubTitle, BaseField::Description, BaseField::Annotation],
        base_form_default: Some(BaseForm {
            title: Some(format!("{}A股涨停复盘", month_day(today))),
            data_source: Some("i问财-异动解读".to_string()),
            producer: Some("@同花顺数据可视化".to_string()),
            file_list: vec![SampleFile {
                name: "示例（点击下载）.xlsx".to_string(),
                url: "xlsx/LimitReview.xlsx".to_string(),
            }],
            ..Default::default()
        }),
        template_form_default: Some(TemplateForm::LimitReview(LimitReviewForm::default())),
    }
}

/// Group sheet rows by limit-up reason.
///
/// Rows without a reason are dropped. Groups are ordered by size (largest
/// first) with "其他" groups last; stocks within a group by streak length.
pub fn from_sheet(sheet: &Sheet) -> Vec<LimitPart> {
    let mut parts: Vec<LimitPart> = Vec::new();

    for row in &sheet.rows {
        let Some(reason) = row.get(REASON_COLUMN).filter(|v| !v.is_empty()) else {
            continue;
        };
        let reason = reason.as_text();

        let mut item = LimitItem::default();
        for (field, value) in RULES.apply(row) {
            match field {
                Field::StockCode => item.stock_code = value.as_text(),
                Field::StockName => item.stock_name = value.as_text(),
                Field::LimitTimes => {
                    item.limit_times = value
                        .as_number()
                        .filter(|n| n.is_finite() && *n >= 0.0)
                        .map(|n| n as u32)
                        .unwrap_or(0)
                }
                Field::LastLimitTime => item.last_limit_time = value.as_text(),
                Field::CauseCategory => item.cause_category = value.as_text(),
                Field::LimitType => item.limit_type = value.as_text(),
            }
        }

        match parts.iter_mut().find(|p| p.reason == reason) {
            Some(part) => part.items.push(item),
            None => parts.push(LimitPart {
                reason,
                items: vec![item],
            }),
        }
    }

    parts.sort_by(|a, b| {
        match (a.reason.contains(OTHER_MARKER), b.reason.contains(OTHER_MARKER)) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => b.items.len().cmp(&a.items.len()),
        }
    });
    for part in &mut parts {
        part.items.sort_by(|a, b| b.limit_times.cmp(&a.limit_times));
    }

    parts
}
