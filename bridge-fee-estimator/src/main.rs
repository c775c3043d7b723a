use std::{sync::Arc, time::Duration};

use actix_web::{web, App, HttpServer};
use bridge_fee_estimator::{
    api,
    config::{Config, NetworkConfig},
    estimator::BridgeEstimator,
    models::ChainSlug,
    price_feed::CoingeckoPriceFeed,
    rpc::RpcBridgeReader,
    snapshot::{HttpSnapshotSource, SnapshotSource, StaticSnapshotSource},
};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

/// Application entry point
///
/// This is the main function that:
/// 1. Sets up logging
/// 2. Loads the service and network configuration
/// 3. Builds RPC clients for every configured chain
/// 4. Creates the bridge estimator service
/// 5. Starts the HTTP server with all endpoints
#[actix_web::main] // Actix will build a multithreaded runtime
async fn main() -> eyre::Result<()> {
    // Info for our service, lower levels for dependencies to reduce noise
    let filter = EnvFilter::from_default_env()
        .add_directive("bridge_fee_estimator=info".parse()?)
        .add_directive("actix_web=error".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let network = NetworkConfig::load(&config.network_config_path)?;
    info!(
        "Loaded {} network with {} chains and {} tokens",
        network.network,
        network.chains.len(),
        network.tokens.len()
    );

    let timeout = Duration::from_secs(config.rpc_timeout_secs);
    let reader = RpcBridgeReader::from_network(&network, timeout)?;
    // Fail fast when the L1 node is unreachable
    reader.client(ChainSlug::Ethereum)?.check_connection().await?;

    let snapshots: Arc<dyn SnapshotSource> = if config.snapshot_base_url.is_empty() {
        warn!("SNAPSHOT_BASE_URL is empty, running on static configuration only");
        Arc::new(StaticSnapshotSource::default())
    } else {
        Arc::new(HttpSnapshotSource::new(&config.snapshot_base_url, &network.network))
    };

    let prices = CoingeckoPriceFeed::new(
        &config.price_feed_url,
        config.price_feed_api_key.clone(),
        network.fallback_prices.clone(),
    );

    let estimator = BridgeEstimator::new(Arc::new(network), Arc::new(reader), snapshots, Arc::new(prices));

    info!("Starting server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            // Shared between workers, the estimator only holds Arcs
            .app_data(web::Data::new(estimator.clone()))
            .configure(api::configure)
    })
    .workers(4)
    .bind(format!("{}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
