//! Joins main contracts, quote snapshots and sector data per variety

use std::collections::{HashMap, HashSet};

use crate::services::market_data::normalize_market;
use crate::types::{CombinedVarietyData, MainContractItem, MarketCodes, PlateItem, SnapshotData};

/// Sector name used when a variety has no level-2 plate
pub const DEFAULT_PLATE_NAME: &str = "其他";

/// Plate level treated as the canonical sector tier
const SECTOR_PLATE_LEVEL: &str = "2";

/// Suffix turning a variety code into its continuous main-contract code
const MAIN_CODE_SUFFIX: &str = "8888";

/// Stateless aggregation over one fetch cycle
pub struct Aggregator;

impl Aggregator {
    /// Keep the first contract per (market, variety), preserving input order
    pub fn dedupe_contracts(contracts: &[MainContractItem]) -> Vec<&MainContractItem> {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        contracts
            .iter()
            .filter(|c| seen.insert((c.market.as_str(), c.variety.as_str())))
            .collect()
    }

    /// Quote code of a contract. The variety code keeps its case because
    /// markets differ in what they expect.
    pub fn quote_code(contract: &MainContractItem) -> String {
        format!("{}{}", contract.variety_code, MAIN_CODE_SUFFIX)
    }

    /// Snapshot request groups: deduped contracts grouped by market, in
    /// first-seen market order
    pub fn group_by_market(contracts: &[MainContractItem]) -> Vec<MarketCodes> {
        let mut groups: Vec<MarketCodes> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for contract in Self::dedupe_contracts(contracts) {
            let slot = *index.entry(contract.market.as_str()).or_insert_with(|| {
                groups.push(MarketCodes {
                    market: contract.market.clone(),
                    codes: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].codes.push(Self::quote_code(contract));
        }

        groups
    }

    /// Uppercased variety -> sector name, from level-2 plates only.
    /// The first plate seen for a variety wins.
    pub fn build_plate_map(plates: &[PlateItem]) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for plate in plates.iter().filter(|p| p.plate_level == SECTOR_PLATE_LEVEL) {
            map.entry(plate.variety.to_uppercase())
                .or_insert_with(|| plate.plate_name.clone());
        }
        map
    }

    /// Join contracts with quote and sector data.
    ///
    /// Contracts without a quote in the snapshot are left out. Missing quote
    /// fields count as 0 and a missing or blank sector becomes
    /// [`DEFAULT_PLATE_NAME`].
    pub fn combine(
        contracts: &[MainContractItem],
        snapshot: &SnapshotData,
        plate_map: &HashMap<String, String>,
    ) -> Vec<CombinedVarietyData> {
        Self::dedupe_contracts(contracts)
            .into_iter()
            .filter_map(|contract| {
                let market = normalize_market(&contract.market);
                let quote = snapshot.get(market)?.get(&Self::quote_code(contract))?;

                let plate_name = plate_map
                    .get(&contract.variety.to_uppercase())
                    .filter(|name| !name.is_empty())
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_PLATE_NAME.to_string());

                Some(CombinedVarietyData {
                    variety: contract.variety.clone(),
                    variety_short_name: contract.variety_short_name.clone(),
                    market: market.to_string(),
                    funds_flow: quote.funds_flow.unwrap_or(0.0),
                    deposit_funds: quote.deposit_funds.unwrap_or(0.0),
                    change_rate: quote.change_rate.unwrap_or(0.0),
                    plate_name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuoteFields;

    fn contract(market: &str, variety: &str, code: &str, name: &str) -> MainContractItem {
        MainContractItem {
            market: market.to_string(),
            variety: variety.to_string(),
            variety_code: code.to_string(),
            variety_short_name: name.to_string(),
            ..Default::default()
        }
    }

    fn plate(variety: &str, level: &str, name: &str) -> PlateItem {
        PlateItem {
            variety: variety.to_string(),
            plate_level: level.to_string(),
            plate_name: name.to_string(),
            ..Default::default()
        }
    }

    fn quote(flow: f64, deposit: f64, rate: f64) -> QuoteFields {
        QuoteFields {
            funds_flow: Some(flow),
            deposit_funds: Some(deposit),
            change_rate: Some(rate),
        }
    }

    fn snapshot(entries: &[(&str, &str, QuoteFields)]) -> SnapshotData {
        let mut data = SnapshotData::new();
        for (market, code, fields) in entries {
            data.entry(market.to_string())
                .or_default()
                .insert(code.to_string(), *fields);
        }
        data
    }

    // ========== Dedupe ==========

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let contracts = vec![
            contract("65", "CU", "cu", "铜"),
            contract("65", "CU", "cu", "铜次月"),
            contract("66", "CU", "cu", "铜-大商"),
        ];

        let deduped = Aggregator::dedupe_contracts(&contracts);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].variety_short_name, "铜");
        assert_eq!(deduped[1].market, "66");
    }

    // ========== Grouping ==========

    #[test]
    fn test_group_by_market_preserves_order_and_case() {
        let contracts = vec![
            contract("66", "M", "m", "豆粕"),
            contract("65", "CU", "cu", "铜"),
            contract("66", "Y", "y", "豆油"),
            contract("67", "SR", "SR", "白糖"),
            contract("65", "CU", "cu", "铜次月"),
        ];

        let groups = Aggregator::group_by_market(&contracts);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].market, "66");
        assert_eq!(groups[0].codes, vec!["m8888", "y8888"]);
        assert_eq!(groups[1].codes, vec!["cu8888"]);
        assert_eq!(groups[2].codes, vec!["SR8888"]);
    }

    // ========== Plate map ==========

    #[test]
    fn test_plate_map_level_two_only_first_wins() {
        let plates = vec![
            plate("cu", "1", "工业品"),
            plate("cu", "2", "有色金属"),
            plate("CU", "2", "贵金属"),
            plate("m", "2", "农产品"),
        ];

        let map = Aggregator::build_plate_map(&plates);

        assert_eq!(map.len(), 2);
        assert_eq!(map["CU"], "有色金属");
        assert_eq!(map["M"], "农产品");
    }

    // ========== Combine ==========

    #[test]
    fn test_combine_copper_scenario() {
        let contracts = vec![contract("65", "CU", "cu", "铜")];
        let snap = snapshot(&[("65", "cu8888", quote(120.0, 300.0, 1.5))]);
        let plates = Aggregator::build_plate_map(&[plate("CU", "2", "有色金属")]);

        let combined = Aggregator::combine(&contracts, &snap, &plates);

        assert_eq!(
            combined,
            vec![CombinedVarietyData {
                variety: "CU".into(),
                variety_short_name: "铜".into(),
                market: "65".into(),
                funds_flow: 120.0,
                deposit_funds: 300.0,
                change_rate: 1.5,
                plate_name: "有色金属".into(),
            }]
        );
    }

    #[test]
    fn test_combine_remaps_minus_127_market() {
        let contracts = vec![contract("-127", "SC", "sc", "原油")];
        let snap = snapshot(&[("129", "sc8888", quote(10.0, 20.0, 0.5))]);

        let combined = Aggregator::combine(&contracts, &snap, &HashMap::new());

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].market, "129");
    }

    #[test]
    fn test_combine_excludes_missing_quotes() {
        let contracts = vec![
            contract("65", "CU", "cu", "铜"),
            contract("65", "AL", "al", "铝"),
            contract("66", "M", "m", "豆粕"),
        ];
        let snap = snapshot(&[("65", "cu8888", quote(1.0, 1.0, 1.0))]);

        let combined = Aggregator::combine(&contracts, &snap, &HashMap::new());

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].variety, "CU");
    }

    #[test]
    fn test_combine_code_case_must_match() {
        let contracts = vec![contract("67", "SR", "SR", "白糖")];
        let snap = snapshot(&[("67", "sr8888", quote(1.0, 1.0, 1.0))]);

        assert!(Aggregator::combine(&contracts, &snap, &HashMap::new()).is_empty());
    }

    #[test]
    fn test_combine_defaults_missing_fields_and_sector() {
        let contracts = vec![contract("65", "CU", "cu", "铜")];
        let fields = QuoteFields {
            funds_flow: Some(5.0),
            change_rate: Some(10.0),
            deposit_funds: None,
        };
        let snap = snapshot(&[("65", "cu8888", fields)]);

        let combined = Aggregator::combine(&contracts, &snap, &HashMap::new());

        assert_eq!(combined[0].funds_flow, 5.0);
        assert_eq!(combined[0].change_rate, 10.0);
        assert_eq!(combined[0].deposit_funds, 0.0);
        assert_eq!(combined[0].plate_name, DEFAULT_PLATE_NAME);
    }

    #[test]
    fn test_combine_blank_sector_name_uses_default() {
        let contracts = vec![contract("65", "CU", "cu", "铜")];
        let snap = snapshot(&[("65", "cu8888", quote(120.0, 300.0, 1.5))]);
        let plate_map = Aggregator::build_plate_map(&[
            plate("CU", "2", ""),
            plate("CU", "2", "有色金属"),
        ]);

        let combined = Aggregator::combine(&contracts, &snap, &plate_map);

        assert_eq!(plate_map["CU"], "");
        assert_eq!(combined[0].plate_name, DEFAULT_PLATE_NAME);
    }

    #[test]
    fn test_combine_collapses_duplicate_contracts() {
        let contracts = vec![
            contract("65", "CU", "cu", "铜"),
            contract("65", "CU", "cu", "铜次月"),
        ];
        let snap = snapshot(&[("65", "cu8888", quote(1.0, 1.0, 1.0))]);

        let combined = Aggregator::combine(&contracts, &snap, &HashMap::new());

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].variety_short_name, "铜");
    }
}
