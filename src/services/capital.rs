//! Capital flow pipeline: contracts -> snapshots -> sectors -> ranking

use tracing::{debug, info};

use crate::services::market_data::{fetch_snapshot, MarketDataSource};
use crate::services::{Aggregator, Ranker};
use crate::types::{CapitalRanking, Result};

/// Fetch all feeds from `source` and build the inflow/outflow top lists.
///
/// Fails if the contract list or plate aggregate cannot be fetched. Markets
/// whose snapshot fails simply contribute no entries.
pub async fn fetch_and_process_capital_data<S>(source: &S) -> Result<CapitalRanking>
where
    S: MarketDataSource,
{
    let contracts = source.main_contracts().await?;
    debug!(contracts = contracts.len(), "fetched main contracts");

    let groups = Aggregator::group_by_market(&contracts);
    let snapshot = fetch_snapshot(source, &groups).await;

    let plates = source.plate_agg().await?;
    let plate_map = Aggregator::build_plate_map(&plates.variety_plate_list);

    let combined = Aggregator::combine(&contracts, &snapshot, &plate_map);
    let ranking = Ranker::rank(&combined);

    info!(
        combined = combined.len(),
        inflow = ranking.inflow_top20.len(),
        outflow = ranking.outflow_top20.len(),
        "capital ranking ready"
    );
    Ok(ranking)
}
