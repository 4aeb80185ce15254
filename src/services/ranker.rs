//! Capital flow ranking

use std::cmp::Ordering;

use crate::types::{CapitalFlowItem, CapitalRanking, CombinedVarietyData};

/// Length of each ranked list
pub const TOP_N: usize = 20;

/// Builds the inflow and outflow top lists from combined variety data
pub struct Ranker;

impl Ranker {
    /// Largest positive capital flows, descending
    pub fn inflow_top(data: &[CombinedVarietyData], n: usize) -> Vec<CapitalFlowItem> {
        Self::top_by(data, n, |a, b| b.funds_flow.total_cmp(&a.funds_flow), |flow| {
            flow > 0.0
        })
    }

    /// Largest negative capital flows, most negative first
    pub fn outflow_top(data: &[CombinedVarietyData], n: usize) -> Vec<CapitalFlowItem> {
        Self::top_by(data, n, |a, b| a.funds_flow.total_cmp(&b.funds_flow), |flow| {
            flow < 0.0
        })
    }

    /// Both top-20 lists. Each list is built from the full input, so a zero
    /// flow lands in neither.
    pub fn rank(data: &[CombinedVarietyData]) -> CapitalRanking {
        CapitalRanking {
            inflow_top20: Self::inflow_top(data, TOP_N),
            outflow_top20: Self::outflow_top(data, TOP_N),
        }
    }

    fn top_by<C, K>(data: &[CombinedVarietyData], n: usize, cmp: C, keep: K) -> Vec<CapitalFlowItem>
    where
        C: Fn(&CombinedVarietyData, &CombinedVarietyData) -> Ordering,
        K: Fn(f64) -> bool,
    {
        let mut sorted: Vec<&CombinedVarietyData> = data.iter().collect();
        sorted.sort_by(|a, b| cmp(a, b));
        sorted
            .into_iter()
            .filter(|item| keep(item.funds_flow))
            .take(n)
            .map(CapitalFlowItem::from)
            .collect()
    }
}
