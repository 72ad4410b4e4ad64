//! Etherscan-compatible block explorer source (BaseScan, Blockscout)

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::http::ProviderHttpClient;
use super::{OnChainSource, SourceError};
use crate::collector::{OnChainData, Transaction};
use crate::registry::{ProtocolRegistry, normalize_address};

/// Etherscan-style envelope: `result` is a list on success and a message string otherwise
#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: String,
    message: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    hash: String,
    time_stamp: String,
    #[serde(default)]
    gas_used: String,
    #[serde(default)]
    gas_price: String,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    value: String,
}

/// Transaction-list source backed by an Etherscan-compatible `account/txlist` API
pub struct ExplorerSource {
    name: String,
    base_url: String,
    api_key: Option<String>,
    max_transactions: u32,
    http: ProviderHttpClient,
    registry: Arc<ProtocolRegistry>,
}

impl ExplorerSource {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        max_transactions: u32,
        http: ProviderHttpClient,
        registry: Arc<ProtocolRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key,
            max_transactions,
            http,
            registry,
        }
    }
}

#[async_trait]
impl OnChainSource for ExplorerSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_transactions(&self, address: &str) -> Result<OnChainData, SourceError> {
        let address = normalize_address(address);
        let offset = self.max_transactions.to_string();

        let mut query = vec![
            ("module", "account"),
            ("action", "txlist"),
            ("address", address.as_str()),
            ("startblock", "0"),
            ("endblock", "99999999"),
            ("page", "1"),
            ("offset", offset.as_str()),
            ("sort", "asc"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        let url = self.http.endpoint(&self.base_url, "", &query)?;
        let response: TxListResponse = self.http.get_json(url, &[]).await?;
        let transactions = parse_tx_list(response)?;

        debug!(
            "{} returned {} transactions for {}",
            self.name,
            transactions.len(),
            address
        );

        Ok(OnChainData::from_transactions(
            &address,
            transactions,
            &self.registry,
        ))
    }
}

fn parse_tx_list(response: TxListResponse) -> Result<Vec<Transaction>, SourceError> {
    if response.status != "1" {
        // Explorers report an empty history as status 0 with this message
        if response.message.starts_with("No transactions found") {
            return Ok(Vec::new());
        }
        let detail = response
            .result
            .as_str()
            .map(str::to_string)
            .unwrap_or_default();
        return Err(SourceError::Malformed(format!(
            "explorer error: {} {}",
            response.message, detail
        )));
    }

    let raw: Vec<RawTransaction> = serde_json::from_value(response.result)?;
    raw.into_iter().map(Transaction::try_from).collect()
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = SourceError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let to = raw
            .to
            .map(|to| normalize_address(&to))
            .filter(|to| !to.is_empty());

        Ok(Transaction {
            timestamp: parse_number(&raw.time_stamp, "timeStamp")?,
            gas_used: parse_number(&raw.gas_used, "gasUsed")?,
            gas_price: parse_number(&raw.gas_price, "gasPrice")?,
            value: parse_number(&raw.value, "value")?,
            hash: raw.hash,
            to,
        })
    }
}

/// Decimal string field; empty means zero
fn parse_number<T>(raw: &str, field: &str) -> Result<T, SourceError>
where
    T: std::str::FromStr + Default,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse()
        .map_err(|_| SourceError::Malformed(format!("invalid {}: {}", field, raw)))
}
