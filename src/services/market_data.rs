//! Futures market data API client
//!
//! Fetches the three upstream feeds the capital-flow ranking is built from:
//! the main contract list, per-market quote snapshots and the sector (plate)
//! aggregate. Snapshot requests are split by market and sent concurrently;
//! a failing market is logged and skipped instead of failing the whole fetch.

use crate::types::{
    MainContractItem, MarketCodes, PlateAgg, PosterError, QuoteFields, Result, SnapshotData,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Main contract detail list
pub const MAIN_CONTRACT_URL: &str =
    "https://ftapi.10jqka.com.cn/futgwapi/api/market/v1/contract/getMainContractDetailList";

/// Multi-market last snapshot
pub const SNAPSHOT_URL: &str =
    "https://quota-h.10jqka.com.cn/fuyao/futures_common_hq/quote/v1/multi_last_snapshot";

/// Futures plate aggregate
pub const PLATE_URL: &str =
    "https://ftapi.10jqka.com.cn/futgwapi/api/market/variety/v1/futures_plate_agg";

/// Markets the snapshot service answers for
pub const SUPPORTED_MARKETS: [&str; 5] = ["65", "66", "67", "129", "UGFF"];

/// Snapshot field ids
pub const FIELD_DEPOSIT_FUNDS: u64 = 67;
pub const FIELD_FUNDS_FLOW: u64 = 68;
pub const FIELD_CHANGE_RATE: u64 = 199112;

const AUTH_HEADER: &str = "X-Fuyao-Auth";
const AUTH_VALUE: &str = "basecomponent";

const MAIN_CONTRACT_FALLBACK_MSG: &str = "获取主力合约失败";
const PLATE_FALLBACK_MSG: &str = "获取板块数据失败";

/// Map contract-list market ids onto the ids the snapshot service uses.
/// Market `-127` is served as `129`.
pub fn normalize_market(market: &str) -> &str {
    if market == "-127" {
        "129"
    } else {
        market
    }
}

/// Endpoint configuration for [`MarketDataClient`]
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    pub main_contract_url: String,
    pub snapshot_url: String,
    pub plate_url: String,
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            main_contract_url: MAIN_CONTRACT_URL.to_string(),
            snapshot_url: SNAPSHOT_URL.to_string(),
            plate_url: PLATE_URL.to_string(),
            timeout: None,
        }
    }
}

impl MarketDataConfig {
    /// Set a request timeout for every call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the three endpoint URLs
    pub fn with_urls(
        mut self,
        main_contract_url: impl Into<String>,
        snapshot_url: impl Into<String>,
        plate_url: impl Into<String>,
    ) -> Self {
        self.main_contract_url = main_contract_url.into();
        self.snapshot_url = snapshot_url.into();
        self.plate_url = plate_url.into();
        self
    }
}

/// `{code, msg, data}` envelope of the contract and plate APIs
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload; a non-zero code becomes an upstream error
    fn into_data(self, fallback_msg: &str) -> Result<T> {
        match (self.code, self.data) {
            (0, Some(data)) => Ok(data),
            _ => Err(PosterError::Upstream(
                self.msg
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| fallback_msg.to_string()),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MainContractData {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    result: Vec<MainContractItem>,
}

/// Request body of one snapshot call (one market per call)
#[derive(Debug, Serialize)]
struct SnapshotRequest<'a> {
    code_list: [&'a MarketCodes; 1],
    trade_date: i64,
    trade_class: &'static str,
    time_period: &'static str,
    begin_time: &'static str,
    end_time: &'static str,
    adjust_type: &'static str,
    data_fields: [u64; 3],
}

impl<'a> SnapshotRequest<'a> {
    fn for_group(group: &'a MarketCodes) -> Self {
        Self {
            code_list: [group],
            trade_date: -1,
            trade_class: "post_market",
            time_period: "day_1",
            begin_time: "-1",
            end_time: "0",
            adjust_type: "forward",
            data_fields: [FIELD_FUNDS_FLOW, FIELD_DEPOSIT_FUNDS, FIELD_CHANGE_RATE],
        }
    }
}

/// Response of one snapshot call
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotResponse {
    pub status_code: i64,
    #[serde(default)]
    pub status_msg: String,
    #[serde(default)]
    pub data: Option<SnapshotPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub quote_data: Vec<QuoteEntry>,
}

/// Quote rows of one instrument. `value[0]` is parallel to `data_fields`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteEntry {
    pub market: String,
    pub code: String,
    #[serde(default)]
    pub data_fields: Vec<FieldId>,
    #[serde(default)]
    pub value: Vec<Vec<Option<f64>>>,
}

/// Field id as sent upstream, either `"68"` or `68`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldId {
    Number(u64),
    Text(String),
}

impl FieldId {
    pub fn id(&self) -> Option<u64> {
        match self {
            FieldId::Number(n) => Some(*n),
            FieldId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl QuoteEntry {
    /// Zip `data_fields` with the first value row by position
    pub fn fields(&self) -> QuoteFields {
        let values = self.value.first().map(Vec::as_slice).unwrap_or(&[]);
        let mut fields = QuoteFields::default();

        for (index, field) in self.data_fields.iter().enumerate() {
            let value = values.get(index).copied().flatten();
            match field.id() {
                Some(FIELD_DEPOSIT_FUNDS) => fields.deposit_funds = value,
                Some(FIELD_FUNDS_FLOW) => fields.funds_flow = value,
                Some(FIELD_CHANGE_RATE) => fields.change_rate = value,
                _ => {}
            }
        }

        fields
    }
}

/// Source of the three upstream feeds.
///
/// Implemented by [`MarketDataClient`] over HTTP; tests drive the pipeline
/// with in-memory sources.
pub trait MarketDataSource {
    fn main_contracts(&self) -> impl Future<Output = Result<Vec<MainContractItem>>> + Send;

    /// Fetch the snapshot of a single market group
    fn snapshot_group(
        &self,
        group: &MarketCodes,
    ) -> impl Future<Output = Result<SnapshotResponse>> + Send;

    fn plate_agg(&self) -> impl Future<Output = Result<PlateAgg>> + Send;
}

/// Remap market ids and drop groups the snapshot service cannot answer
pub fn prepare_snapshot_groups(groups: &[MarketCodes]) -> Vec<MarketCodes> {
    groups
        .iter()
        .map(|g| MarketCodes {
            market: normalize_market(&g.market).to_string(),
            codes: g.codes.clone(),
        })
        .filter(|g| SUPPORTED_MARKETS.contains(&g.market.as_str()) && !g.codes.is_empty())
        .collect()
}

/// Merge successful snapshot responses into one market -> code -> fields map
pub fn merge_snapshot_responses<I>(responses: I) -> SnapshotData
where
    I: IntoIterator<Item = SnapshotResponse>,
{
    let mut merged = SnapshotData::new();

    for response in responses {
        let Some(payload) = response.data else {
            continue;
        };
        for quote in &payload.quote_data {
            merged
                .entry(quote.market.clone())
                .or_default()
                .insert(quote.code.clone(), quote.fields());
        }
    }

    merged
}

/// Fetch snapshots for all groups concurrently.
///
/// Every eligible group gets its own request and all of them are awaited.
/// A group that fails (non-zero status, transport or decode error) is
/// logged and contributes nothing.
pub async fn fetch_snapshot<S>(source: &S, groups: &[MarketCodes]) -> SnapshotData
where
    S: MarketDataSource,
{
    let groups = prepare_snapshot_groups(groups);
    debug!(?groups, "requesting quote snapshot");

    let requests = groups.iter().map(|group| async move {
        match source.snapshot_group(group).await {
            Ok(response) if response.status_code == 0 => Some(response),
            Ok(response) => {
                warn!(
                    market = %group.market,
                    status_code = response.status_code,
                    msg = %response.status_msg,
                    "snapshot request failed"
                );
                None
            }
            Err(e) => {
                warn!(market = %group.market, error = %e, "snapshot request failed");
                None
            }
        }
    });

    let responses = join_all(requests).await;
    let merged = merge_snapshot_responses(responses.into_iter().flatten());

    debug!(
        markets = merged.len(),
        codes = merged.values().map(|m| m.len()).sum::<usize>(),
        "merged quote snapshot"
    );
    merged
}

/// HTTP client for the futures market data APIs
pub struct MarketDataClient {
    http: reqwest::Client,
    config: MarketDataConfig,
}

impl MarketDataClient {
    /// Create a client against the production endpoints
    pub fn new() -> Result<Self> {
        Self::with_config(MarketDataConfig::default())
    }

    /// Create a client with custom endpoints or timeout
    pub fn with_config(config: MarketDataConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &MarketDataConfig {
        &self.config
    }

    /// Fetch the main contract list
    pub async fn fetch_main_contracts(&self) -> Result<Vec<MainContractItem>> {
        let envelope: ApiEnvelope<MainContractData> = self
            .http
            .get(&self.config.main_contract_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(envelope.into_data(MAIN_CONTRACT_FALLBACK_MSG)?.result)
    }

    /// Fetch quote snapshots for the given market groups
    pub async fn fetch_snapshot(&self, groups: &[MarketCodes]) -> SnapshotData {
        fetch_snapshot(self, groups).await
    }

    /// Fetch the exchange list and variety plate list
    pub async fn fetch_plate_agg(&self) -> Result<PlateAgg> {
        let envelope: ApiEnvelope<PlateAgg> = self
            .http
            .get(&self.config.plate_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        envelope.into_data(PLATE_FALLBACK_MSG)
    }

    async fn post_snapshot(&self, group: &MarketCodes) -> Result<SnapshotResponse> {
        let body = SnapshotRequest::for_group(group);
        debug!(
            market = %group.market,
            body = %serde_json::to_string(&body)?,
            "snapshot request"
        );

        let response = self
            .http
            .post(&self.config.snapshot_url)
            .header(AUTH_HEADER, AUTH_VALUE)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response)
    }
}

impl MarketDataSource for MarketDataClient {
    fn main_contracts(&self) -> impl Future<Output = Result<Vec<MainContractItem>>> + Send {
        self.fetch_main_contracts()
    }

    fn snapshot_group(
        &self,
        group: &MarketCodes,
    ) -> impl Future<Output = Result<SnapshotResponse>> + Send {
        self.post_snapshot(group)
    }

    fn plate_agg(&self) -> impl Future<Output = Result<PlateAgg>> + Send {
        self.fetch_plate_agg()
    }
}
