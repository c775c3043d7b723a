use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

#[cfg(test)]
use mockall::automock;

use crate::{error::ServiceError, models::token::canonical_symbol};

pub const PRICE_CACHE_TTL: Duration = Duration::from_secs(60);

const API_KEY_HEADER: &str = "x-cg-pro-api-key";

/// USD prices of bridged assets and gas tokens
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// USD price of one whole token. Wrapped and bridged symbols resolve to their canonical token.
    async fn price_usd(&self, symbol: &str) -> Result<f64, ServiceError>;
}

/// Price API coin id of a canonical symbol
pub fn coin_id(canonical: &str) -> Option<&'static str> {
    match canonical {
        "ETH" => Some("ethereum"),
        "USDC" => Some("usd-coin"),
        "USDT" => Some("tether"),
        "DAI" => Some("dai"),
        "MATIC" => Some("matic-network"),
        "WBTC" => Some("wrapped-bitcoin"),
        "HOP" => Some("hop-protocol"),
        "SNX" => Some("havven"),
        "SUSD" => Some("nusd"),
        "RETH" => Some("rocket-pool-eth"),
        "FRAX" => Some("frax"),
        _ => None,
    }
}

/// `/simple/price` response: coin id -> currency -> price
type SimplePrice = HashMap<String, HashMap<String, f64>>;

/// Coingecko-compatible `simple/price` client with a short-lived cache
pub struct CoingeckoPriceFeed {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cache: Cache<String, f64>,
    fallback_prices: HashMap<String, f64>,
}

impl CoingeckoPriceFeed {
    pub fn new(base_url: &str, api_key: Option<String>, fallback_prices: HashMap<String, f64>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            cache: Cache::builder().max_capacity(64).time_to_live(PRICE_CACHE_TTL).build(),
            fallback_prices: fallback_prices
                .into_iter()
                .map(|(symbol, price)| (canonical_symbol(&symbol), price))
                .collect(),
        }
    }

    #[instrument(skip(self), err)]
    async fn fetch_price(&self, canonical: String) -> Result<f64, ServiceError> {
        let id = coin_id(&canonical)
            .ok_or_else(|| ServiceError::PriceUnavailable(format!("no price source for {canonical}")))?;
        let url = format!("{}/simple/price", self.base_url);

        let mut request = self.client.get(&url).query(&[("ids", id), ("vs_currencies", "usd")]);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let prices: SimplePrice = request
            .send()
            .await
            .map_err(|e| ServiceError::PriceUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::PriceUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| ServiceError::PriceUnavailable(e.to_string()))?;

        let price = prices
            .get(id)
            .and_then(|currencies| currencies.get("usd"))
            .copied()
            .ok_or_else(|| ServiceError::PriceUnavailable(format!("{id} missing from price response")))?;
        debug!("{} price: {} USD", canonical, price);
        Ok(price)
    }
}

#[async_trait]
impl PriceFeed for CoingeckoPriceFeed {
    async fn price_usd(&self, symbol: &str) -> Result<f64, ServiceError> {
        let canonical = canonical_symbol(symbol);
        match self
            .cache
            .try_get_with(canonical.clone(), self.fetch_price(canonical.clone()))
            .await
        {
            Ok(price) => Ok(price),
            Err(e) => match self.fallback_prices.get(&canonical) {
                Some(price) => {
                    warn!("using fallback price for {}: {}", canonical, e);
                    Ok(*price)
                }
                None => Err((*e).clone()),
            },
        }
    }
}

/// Fixed prices keyed by canonical symbol
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    prices: HashMap<String, f64>,
}

impl StaticPriceFeed {
    pub fn new(prices: HashMap<String, f64>) -> Self {
        Self {
            prices: prices
                .into_iter()
                .map(|(symbol, price)| (canonical_symbol(&symbol), price))
                .collect(),
        }
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn price_usd(&self, symbol: &str) -> Result<f64, ServiceError> {
        let canonical = canonical_symbol(symbol);
        self.prices
            .get(&canonical)
            .copied()
            .ok_or_else(|| ServiceError::PriceUnavailable(format!("no price for {canonical}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_ids_for_bridged_assets() {
        assert_eq!(coin_id("USDC"), Some("usd-coin"));
        assert_eq!(coin_id(&canonical_symbol("WMATIC")), Some("matic-network"));
        assert_eq!(coin_id(&canonical_symbol("XDAI")), Some("dai"));
        assert_eq!(coin_id("UNKNOWN"), None);
    }

    #[tokio::test]
    async fn static_feed_resolves_canonical_symbols() {
        let feed = StaticPriceFeed::new(HashMap::from([("ETH".to_string(), 2000.0)]));
        assert_eq!(feed.price_usd("WETH").await.unwrap(), 2000.0);
        assert_eq!(feed.price_usd("hETH").await.unwrap(), 2000.0);
        assert!(matches!(
            feed.price_usd("USDC").await,
            Err(ServiceError::PriceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_api_falls_back_to_configured_price() {
        let feed = CoingeckoPriceFeed::new(
            "http://127.0.0.1:9",
            None,
            HashMap::from([("usdc".to_string(), 1.0)]),
        );
        assert_eq!(feed.price_usd("USDC").await.unwrap(), 1.0);
        assert!(feed.price_usd("ETH").await.is_err());
    }
}
