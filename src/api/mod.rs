//! Node API client - HTTP JSON commands plus local bundle preparation
//!
//! | Command | Method | Description |
//! |---------|--------|-------------|
//! | `getNodeInfo` | `get_node_info()` | App name, version, milestones |
//! | `getBalances` | `get_balances(addrs)` | Confirmed balance per address |
//! | - | `prepare_transfers(..)` | Local: assemble, finalize, sign |
//!
//! `Api::compose` only builds the HTTP client; nothing connects until the
//! first command.

use crate::address::without_checksum;
use crate::bundle::{prepare_bundle, PrepareTransfersOptions, Transfers};
use crate::core::consts::{api as cmd, defaults};
use crate::core::trinary::{Hash, Trytes};
use crate::error::{AccountError, AccountResult};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Ledger node capability consumed by strategies and the account.
#[async_trait]
pub trait Client: Send + Sync {
    /// Build signed transaction trytes for `transfers`.
    async fn prepare_transfers(&self, seed: &str, transfers: Transfers, options: PrepareTransfersOptions) -> AccountResult<Vec<Trytes>>;

    /// Balances in the same order as `addresses`.
    async fn get_balances(&self, addresses: &[Hash]) -> AccountResult<Vec<u64>>;

    async fn get_node_info(&self) -> AccountResult<NodeInfo>;

    /// Node the client talks to, if it has one.
    fn endpoint(&self) -> Option<String> { None }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientSettings {
    pub uri: String,
    pub timeout_secs: u64,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self { uri: defaults::NODE_URI.into(), timeout_secs: defaults::TIMEOUT_SECS }
    }
}

impl HttpClientSettings {
    pub fn new(uri: impl Into<String>) -> Self { Self { uri: uri.into(), ..Default::default() } }
    pub fn with_timeout(mut self, secs: u64) -> Self { self.timeout_secs = secs; self }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeInfo {
    pub app_name: String,
    pub app_version: String,
    pub latest_milestone_index: u64,
    pub latest_solid_subtangle_milestone_index: u64,
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    balances: Vec<String>,
}

/// HTTP node client.
#[derive(Debug, Clone)]
pub struct Api {
    uri: Url,
    http: reqwest::Client,
}

impl Api {
    pub fn compose(settings: HttpClientSettings) -> AccountResult<Self> {
        let uri = Url::parse(&settings.uri)
            .map_err(|e| AccountError::ClientConstruction(format!("{}: {}", settings.uri, e)))?;
        if !matches!(uri.scheme(), "http" | "https") {
            return Err(AccountError::ClientConstruction(format!("unsupported scheme '{}'", uri.scheme())));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| AccountError::ClientConstruction(e.to_string()))?;
        debug!("api client composed for {}", uri);
        Ok(Self { uri, http })
    }

    pub fn uri(&self) -> &str { self.uri.as_str() }

    async fn command(&self, body: Value) -> AccountResult<Value> {
        let response = self
            .http
            .post(self.uri.clone())
            .header(cmd::VERSION_HEADER, cmd::VERSION)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let payload: Value = response.json().await?;
        if !status.is_success() {
            let reason = payload["error"].as_str().map(str::to_string).unwrap_or_else(|| status.to_string());
            return Err(AccountError::Api(reason));
        }
        Ok(payload)
    }
}

#[async_trait]
impl Client for Api {
    async fn prepare_transfers(&self, seed: &str, transfers: Transfers, options: PrepareTransfersOptions) -> AccountResult<Vec<Trytes>> {
        let trytes = prepare_bundle(seed, &transfers, &options)?;
        debug!("prepared bundle of {} transactions", trytes.len());
        Ok(trytes)
    }

    async fn get_balances(&self, addresses: &[Hash]) -> AccountResult<Vec<u64>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let plain = addresses.iter().map(|a| without_checksum(a)).collect::<Result<Vec<_>, _>>()?;
        let payload = self
            .command(json!({"command": cmd::GET_BALANCES, "addresses": plain, "threshold": 100}))
            .await?;
        let parsed: BalancesResponse = serde_json::from_value(payload)
            .map_err(|e| AccountError::Api(format!("getBalances: {}", e)))?;
        if parsed.balances.len() != addresses.len() {
            return Err(AccountError::Api(format!(
                "getBalances returned {} balances for {} addresses",
                parsed.balances.len(),
                addresses.len()
            )));
        }
        parsed
            .balances
            .iter()
            .map(|b| b.parse::<u64>().map_err(|e| AccountError::Api(format!("balance '{}': {}", b, e))))
            .collect()
    }

    async fn get_node_info(&self) -> AccountResult<NodeInfo> {
        let payload = self.command(json!({"command": cmd::GET_NODE_INFO})).await?;
        serde_json::from_value(payload).map_err(|e| AccountError::Api(format!("getNodeInfo: {}", e)))
    }

    fn endpoint(&self) -> Option<String> { Some(self.uri.to_string()) }
}
