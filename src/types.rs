//! Core types shared across the crate

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum PosterError {
    /// Upstream API answered with a non-zero status code
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet input could not be used
    #[error("sheet error: {0}")]
    Sheet(String),

    /// Unknown template or theme
    #[error("template error: {0}")]
    Template(String),

    #[error("export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, PosterError>;

/// Read an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Main contract of a futures variety, as returned by the contract list API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MainContractItem {
    #[serde(deserialize_with = "null_as_default")]
    pub market: String,
    #[serde(deserialize_with = "null_as_default")]
    pub variety: String,
    #[serde(deserialize_with = "null_as_default")]
    pub variety_short_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub variety_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub variety_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contract_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ifind_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub unit_num: String,
    #[serde(deserialize_with = "null_as_default")]
    pub deal_unit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub min_change: String,
    #[serde(deserialize_with = "null_as_default")]
    pub margin_rate: String,
    pub contract_multiple: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub place_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub market_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub new_market_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contract_name: String,
}

/// Sector (plate) entry of the plate aggregate API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateItem {
    #[serde(deserialize_with = "null_as_default")]
    pub variety: String,
    #[serde(deserialize_with = "null_as_default")]
    pub market_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub variety_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plate_level: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plate_name: String,
}

/// Payload of the plate aggregate API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateAgg {
    #[serde(deserialize_with = "null_as_default")]
    pub exchange_list: Vec<serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub variety_plate_list: Vec<PlateItem>,
}

/// Codes to request from one market in a snapshot call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCodes {
    pub market: String,
    pub codes: Vec<String>,
}

/// Snapshot fields of one instrument. Unset fields were not returned upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteFields {
    /// Field 67: accumulated (deposited) capital
    pub deposit_funds: Option<f64>,
    /// Field 68: capital flow
    pub funds_flow: Option<f64>,
    /// Field 199112: change rate
    pub change_rate: Option<f64>,
}

/// market -> instrument code -> fields
pub type SnapshotData = HashMap<String, HashMap<String, QuoteFields>>;

/// One variety with its quote and sector data joined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedVarietyData {
    pub variety: String,
    pub variety_short_name: String,
    pub market: String,
    pub funds_flow: f64,
    pub deposit_funds: f64,
    pub change_rate: f64,
    pub plate_name: String,
}

/// Row shape consumed by the morning session review poster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalFlowItem {
    pub stock_name: String,
    pub limit_rate: f64,
    pub main_funds_flow: f64,
    pub lower_funds_flow: f64,
    pub industry: String,
}

impl From<&CombinedVarietyData> for CapitalFlowItem {
    fn from(item: &CombinedVarietyData) -> Self {
        Self {
            stock_name: item.variety_short_name.clone(),
            limit_rate: item.change_rate,
            main_funds_flow: item.funds_flow,
            lower_funds_flow: item.deposit_funds,
            industry: item.plate_name.clone(),
        }
    }
}

/// Top capital inflow and outflow lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalRanking {
    pub inflow_top20: Vec<CapitalFlowItem>,
    pub outflow_top20: Vec<CapitalFlowItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_contract_deserializes_partial_payload() {
        let json = r#"{"market":"65","variety":"CU","varietyCode":"cu","varietyShortName":"铜","contractMultiple":null}"#;
        let item: MainContractItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.market, "65");
        assert_eq!(item.variety_code, "cu");
        assert_eq!(item.variety_short_name, "铜");
        assert_eq!(item.contract_multiple, None);
        assert!(item.contract_name.is_empty());
    }

    #[test]
    fn test_main_contract_null_fields_read_as_empty() {
        let json = r#"{"market":"65","variety":"CU","varietyCode":"cu","varietyShortName":"铜","newMarketId":null,"contractName":null,"ifindCode":null}"#;
        let item: MainContractItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.variety, "CU");
        assert_eq!(item.new_market_id, "");
        assert_eq!(item.contract_name, "");
        assert_eq!(item.ifind_code, "");
    }

    #[test]
    fn test_plate_agg_null_fields_read_as_empty() {
        let json = r#"{"exchange_list":null,"variety_plate_list":[{"variety":"cu","market_id":null,"variety_name":null,"plate_level":"2","plate_name":"有色金属"}]}"#;
        let agg: PlateAgg = serde_json::from_str(json).unwrap();
        assert!(agg.exchange_list.is_empty());
        let plate = &agg.variety_plate_list[0];
        assert_eq!(plate.market_id, "");
        assert_eq!(plate.variety_name, "");
        assert_eq!(plate.plate_name, "有色金属");
    }

    #[test]
    fn test_capital_flow_item_from_combined() {
        let combined = CombinedVarietyData {
            variety: "CU".into(),
            variety_short_name: "铜".into(),
            market: "65".into(),
            funds_flow: 120.0,
            deposit_funds: 300.0,
            change_rate: 1.5,
            plate_name: "有色金属".into(),
        };
        let item = CapitalFlowItem::from(&combined);
        assert_eq!(item.stock_name, "铜");
        assert_eq!(item.limit_rate, 1.5);
        assert_eq!(item.main_funds_flow, 120.0);
        assert_eq!(item.lower_funds_flow, 300.0);
        assert_eq!(item.industry, "有色金属");
    }

    #[test]
    fn test_capital_ranking_serializes_camel_case() {
        let ranking = CapitalRanking::default();
        let json = serde_json::to_value(&ranking).unwrap();
        assert!(json.get("inflowTop20").is_some());
        assert!(json.get("outflowTop20").is_some());
    }

    #[test]
    fn test_error_display_upstream() {
        let err = PosterError::Upstream("bad request".into());
        assert_eq!(err.to_string(), "upstream error: bad request");
    }
}
