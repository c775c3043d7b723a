use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, error, instrument, warn};

#[cfg(test)]
use mockall::automock;

use crate::{
    error::ServiceError,
    models::snapshot::{AvailableLiquidityFile, AvailableLiquiditySnapshot, CoreConfigSnapshot},
};

/// How long fetched files are served from memory
pub const SNAPSHOT_CACHE_TTL: Duration = Duration::from_secs(60);

pub const CORE_CONFIG_TIMEOUT: Duration = Duration::from_secs(5);

/// Liquidity files older than this are ignored
pub const LIQUIDITY_MAX_AGE_MS: u64 = 10 * 60 * 1000;

/// Hosted operational data blended with on-chain reads
///
/// Both lookups are best effort: failures are logged and reported as `None`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn core_config(&self) -> Option<Arc<CoreConfigSnapshot>>;

    async fn available_liquidity(&self) -> Option<Arc<AvailableLiquiditySnapshot>>;
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Whether a liquidity file published at `timestamp_ms` is too old to use
pub fn is_outdated(timestamp_ms: u64, now_ms: u64) -> bool {
    now_ms.saturating_sub(timestamp_ms) > LIQUIDITY_MAX_AGE_MS
}

/// Fetches `v1-core-config.json` and `v1-available-liquidity.json` over HTTPS
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    base_url: String,
    network: String,
    core_config: Cache<String, Arc<CoreConfigSnapshot>>,
    liquidity: Cache<String, Option<Arc<AvailableLiquiditySnapshot>>>,
}

impl HttpSnapshotSource {
    pub fn new(base_url: &str, network: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, network)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, network: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            network: network.to_string(),
            core_config: Cache::builder().max_capacity(8).time_to_live(SNAPSHOT_CACHE_TTL).build(),
            liquidity: Cache::builder().max_capacity(8).time_to_live(SNAPSHOT_CACHE_TTL).build(),
        }
    }

    /// URL of a hosted file with a cache-busting query parameter
    pub fn file_url(&self, file: &str, cache_bust: u64) -> String {
        format!("{}/{}/{}?cb={}", self.base_url, self.network, file, cache_bust)
    }

    #[instrument(skip(self), err)]
    async fn fetch_core_config(&self) -> Result<Arc<CoreConfigSnapshot>, ServiceError> {
        let url = self.file_url("v1-core-config.json", now_ms());
        let snapshot: CoreConfigSnapshot = self
            .client
            .get(&url)
            .timeout(CORE_CONFIG_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("fetched core config from {}", url);
        Ok(Arc::new(snapshot))
    }

    #[instrument(skip(self), err)]
    async fn fetch_available_liquidity(&self) -> Result<Option<Arc<AvailableLiquiditySnapshot>>, ServiceError> {
        let url = self.file_url("v1-available-liquidity.json", now_ms());
        let file: AvailableLiquidityFile = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if is_outdated(file.timestamp, now_ms()) {
            warn!("available liquidity file from {} is outdated", file.timestamp);
            return Ok(None);
        }
        Ok(Some(Arc::new(AvailableLiquiditySnapshot { data: file.data })))
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn core_config(&self) -> Option<Arc<CoreConfigSnapshot>> {
        match self
            .core_config
            .try_get_with(self.network.clone(), self.fetch_core_config())
            .await
        {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!("core config unavailable: {}", e);
                None
            }
        }
    }

    async fn available_liquidity(&self) -> Option<Arc<AvailableLiquiditySnapshot>> {
        // an outdated file is cached as absent until the entry expires
        match self
            .liquidity
            .try_get_with(self.network.clone(), self.fetch_available_liquidity())
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("available liquidity unavailable: {}", e);
                None
            }
        }
    }
}

/// Fixed snapshots, for offline operation and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotSource {
    pub core_config: Option<Arc<CoreConfigSnapshot>>,
    pub available_liquidity: Option<Arc<AvailableLiquiditySnapshot>>,
}

#[async_trait]
impl SnapshotSource for StaticSnapshotSource {
    async fn core_config(&self) -> Option<Arc<CoreConfigSnapshot>> {
        self.core_config.clone()
    }

    async fn available_liquidity(&self) -> Option<Arc<AvailableLiquiditySnapshot>> {
        self.available_liquidity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staleness_window_is_ten_minutes() {
        let now = 1_700_000_600_000;
        assert!(!is_outdated(now - LIQUIDITY_MAX_AGE_MS, now));
        assert!(is_outdated(now - LIQUIDITY_MAX_AGE_MS - 1, now));
        // clock skew never marks a file outdated
        assert!(!is_outdated(now + 5_000, now));
    }

    #[test]
    fn file_urls_carry_network_and_cache_bust() {
        let source = HttpSnapshotSource::new("https://assets.hop.exchange/", "goerli");
        assert_eq!(
            source.file_url("v1-core-config.json", 42),
            "https://assets.hop.exchange/goerli/v1-core-config.json?cb=42"
        );
    }

    #[tokio::test]
    async fn static_source_returns_what_it_holds() {
        let source = StaticSnapshotSource {
            core_config: Some(Arc::new(CoreConfigSnapshot {
                destination_fee_gas_price_multiplier: Some(1.5),
                ..Default::default()
            })),
            available_liquidity: None,
        };
        let config = source.core_config().await.unwrap();
        assert_eq!(config.destination_fee_gas_price_multiplier, Some(1.5));
        assert!(source.available_liquidity().await.is_none());
    }

    #[tokio::test]
    async fn unreachable_host_yields_none() {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let source = HttpSnapshotSource::with_client(client, "http://127.0.0.1:9", "goerli");
        assert!(source.core_config().await.is_none());
        assert!(source.available_liquidity().await.is_none());
    }
}
