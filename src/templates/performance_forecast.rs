//! Earnings forecast list

use serde::{Deserialize, Serialize};

use super::{BaseField, BaseForm, SampleFile, TemplateConfig, TemplateForm, TemplateName, Theme};
use crate::parsers::{ColumnRule, RuleSet, Sheet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceForecastItem {
    pub stock_name: String,
    /// Median forecast change of net profit
    pub performance_increase: f64,
    /// Forecast type, e.g. "预增"
    pub limit_type: String,
    /// Price change over the period
    pub limit_rate: f64,
    pub industry: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceForecastForm {
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    StockName,
    PerformanceIncrease,
    LimitType,
    LimitRate,
    Industry,
}

const RULES: RuleSet<Field> = RuleSet::new(&[
    ColumnRule { pattern: "股票简称", field: Field::StockName },
    ColumnRule { pattern: "预告净利润变动中值", field: Field::PerformanceIncrease },
    ColumnRule { pattern: "业绩预告类型", field: Field::LimitType },
    ColumnRule { pattern: "区间涨跌幅", field: Field::LimitRate },
    ColumnRule { pattern: "所属同花顺一级行业", field: Field::Industry },
]);

pub(super) fn config() -> TemplateConfig {
    TemplateConfig {
        name: TemplateName::PerformanceForecast,
        disabled_fields: &[BaseField::Description],
        base_form_default: Some(BaseForm {
            title: Some("业绩预增股票名单一览".to_string()),
            sub_title: Some("年报行情拉开内幕".to_string()),
            annotation: Some("数据截至2024年1月9日收盘".to_string()),
            data_source: Some("i问财".to_string()),
            producer: Some("@同花顺数据可视化".to_string()),
            file_list: vec![SampleFile {
                name: "示例（点击下载）.xlsx".to_string(),
                url: "xlsx/PerformanceForecast.xlsx".to_string(),
            }],
            ..Default::default()
        }),
        template_form_default: Some(TemplateForm::PerformanceForecast(PerformanceForecastForm {
            theme: Theme::Red,
        })),
    }
}

/// One item per row; numeric columns that cannot be read become 0
pub fn from_sheet(sheet: &Sheet) -> Vec<PerformanceForecastItem> {
    sheet
        .rows
        .iter()
        .map(|row| {
            let mut item = PerformanceForecastItem::default();
            for (field, value) in RULES.apply(row) {
                match field {
                    Field::StockName => item.stock_name = value.as_text(),
                    Field::PerformanceIncrease => {
                        item.performance_increase = value.as_number().unwrap_or(0.0)
                    }
                    Field::LimitType => item.limit_type = value.as_text(),
                    Field::LimitRate => item.limit_rate = value.as_number().unwrap_or(0.0),
                    Field::Industry => item.industry = value.as_text(),
                }
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_sheet() -> Sheet {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("performance_forecast.json");
        Sheet::load(&path).unwrap()
    }

    #[test]
    fn test_maps_every_row() {
        let items = from_sheet(&fixture_sheet());
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_numeric_columns() {
        let items = from_sheet(&fixture_sheet());

        assert_eq!(items[0].stock_name, "宁德时代");
        assert_eq!(items[0].performance_increase, 4.1e10);
        assert_eq!(items[0].limit_rate, 3.25);
        assert_eq!(items[0].industry, "电力设备");
    }

    #[test]
    fn test_text_values_coerced() {
        let items = from_sheet(&fixture_sheet());

        assert_eq!(items[1].stock_name, "贵州茅台");
        assert_eq!(items[1].performance_increase, 7.5e8);
        assert_eq!(items[1].limit_rate, -1.8);
        assert_eq!(items[1].limit_type, "略增");
    }

    #[test]
    fn test_missing_columns_default() {
        let items = from_sheet(&fixture_sheet());

        assert_eq!(items[2].performance_increase, 0.0);
        assert_eq!(items[2].limit_rate, 0.0);
        assert_eq!(items[2].industry, "");
    }

    #[test]
    fn test_config_defaults() {
        let config = config();
        assert_eq!(config.disabled_fields, &[BaseField::Description]);
        let form = config.base_form();
        assert_eq!(form.title.as_deref(), Some("业绩预增股票名单一览"));
        assert_eq!(form.sub_title.as_deref(), Some("年报行情拉开内幕"));
        assert_eq!(config.default_theme(), Some(Theme::Red));
    }
}
