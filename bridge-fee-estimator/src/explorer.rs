use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::ServiceError;

pub const MAINNET_EXPLORER_URL: &str = "https://explorer.hop.exchange";
pub const GOERLI_EXPLORER_URL: &str = "https://goerli.explorer.hop.exchange";

/// Links into the transfer explorer and transfer status lookups through its API
#[derive(Debug, Clone)]
pub struct Explorer {
    client: reqwest::Client,
    base_url: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct TransfersResponse {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    data: Option<Vec<Value>>,
}

impl Explorer {
    pub fn new(network: &str, api_url: &str) -> Self {
        let base_url = if network == "goerli" {
            GOERLI_EXPLORER_URL
        } else {
            MAINNET_EXPLORER_URL
        };
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for_account(&self, account: &str) -> String {
        format!("{}/?account={}", self.base_url, account)
    }

    pub fn url_for_transfer_id(&self, transfer_id: &str) -> String {
        format!("{}/?transferId={}", self.base_url, transfer_id)
    }

    /// The explorer resolves transaction hashes through the transfer id query as well
    pub fn url_for_transaction_hash(&self, transaction_hash: &str) -> String {
        self.url_for_transfer_id(transaction_hash)
    }

    /// First transfer record matching a transfer id or transaction hash, if any
    #[instrument(skip(self), err)]
    pub async fn transfer_status(&self, transfer_id_or_tx_hash: &str) -> Result<Option<Value>, ServiceError> {
        let url = format!("{}/v1/transfers", self.api_url);
        let response: TransfersResponse = self
            .client
            .get(&url)
            .query(&[("transferId", transfer_id_or_tx_hash)])
            .send()
            .await
            .map_err(|e| ServiceError::Explorer(e.to_string()))?
            .json()
            .await
            .map_err(|e| ServiceError::Explorer(e.to_string()))?;
        parse_transfers(response)
    }
}

fn parse_transfers(response: TransfersResponse) -> Result<Option<Value>, ServiceError> {
    match response.error {
        Some(Value::Null) | None => {}
        Some(Value::String(message)) => return Err(ServiceError::Explorer(message)),
        Some(other) => return Err(ServiceError::Explorer(other.to_string())),
    }
    let first = response.data.and_then(|data| data.into_iter().next());
    debug!("transfer found: {}", first.is_some());
    Ok(first)
}
