//! Library-level tests of the estimator over a fake chain reader and fixed snapshots

use std::{collections::HashMap, sync::Arc};

use alloy::primitives::U256;

use bridge_fee_estimator::{
    error::ServiceError,
    estimator::BridgeEstimator,
    models::{
        snapshot::{AvailableLiquidityFile, AvailableLiquiditySnapshot, CoreConfigSnapshot},
        ChainSlug, SendOptions,
    },
    snapshot::StaticSnapshotSource,
};

#[path = "../api_tests/helpers.rs"]
mod helpers;
use helpers::{create_estimator, test_network, test_prices, FakeReader, RECIPIENT};

const LIQUIDITY: &str = r#"{
    "timestamp": 1700000000000,
    "data": {
        "USDC": {
            "baseAvailableCreditIncludingVault": {
                "optimism": { "ethereum": "200000000000" }
            },
            "unbondedTransferRootAmounts": {
                "optimism": { "ethereum": "10000000000" }
            }
        }
    }
}"#;

fn estimator_with_snapshots(reader: FakeReader, snapshots: StaticSnapshotSource) -> BridgeEstimator {
    BridgeEstimator::new(
        Arc::new(test_network()),
        Arc::new(reader),
        Arc::new(snapshots),
        Arc::new(test_prices()),
    )
}

#[tokio::test]
async fn frontend_liquidity_to_l1_uses_the_snapshot() {
    let file: AvailableLiquidityFile = serde_json::from_str(LIQUIDITY).unwrap();
    let snapshots = StaticSnapshotSource {
        core_config: None,
        available_liquidity: Some(Arc::new(AvailableLiquiditySnapshot { data: file.data })),
    };
    let estimator = estimator_with_snapshots(FakeReader::default(), snapshots);
    let usdc = estimator.bridge("USDC").unwrap();

    let available = usdc
        .frontend_available_liquidity(ChainSlug::Optimism, ChainSlug::Ethereum)
        .await
        .unwrap();

    // 200k credit - 10k unbonded - 50k buffer, halved for an optimistic rollup source
    assert_eq!(available, U256::from(70_000_000_000u64));
}

#[tokio::test]
async fn core_config_overrides_fee_bps() {
    let snapshots = StaticSnapshotSource {
        core_config: Some(Arc::new(CoreConfigSnapshot {
            bonder_fee_bps: Some(HashMap::from([(
                "USDC".to_string(),
                HashMap::from([("arbitrum".to_string(), 20.0)]),
            )])),
            ..CoreConfigSnapshot::default()
        })),
        available_liquidity: None,
    };
    let estimator = estimator_with_snapshots(FakeReader::default(), snapshots);
    let usdc = estimator.bridge("USDC").unwrap();

    assert_eq!(usdc.fee_bps(ChainSlug::Arbitrum).await.unwrap(), 20.0);
    assert_eq!(usdc.fee_bps(ChainSlug::Optimism).await.unwrap(), 0.0);
}

#[tokio::test]
async fn native_deposit_carries_value() {
    let estimator = create_estimator(FakeReader::default());
    let eth = estimator.bridge("ETH").unwrap();
    let amount = U256::from(10u64).pow(U256::from(18u64));
    let options = SendOptions {
        recipient: Some(RECIPIENT),
        relayer_fee: Some(U256::from(1u64)),
        ..SendOptions::default()
    };

    let tx = eth
        .populate_send_tx(amount, ChainSlug::Ethereum, ChainSlug::Optimism, &options)
        .await
        .unwrap();

    assert_eq!(tx.value, Some(amount));
    assert_eq!(tx.from, None);
}

#[tokio::test]
async fn htoken_sends_between_l2s_are_rejected() {
    let estimator = create_estimator(FakeReader::default());
    let usdc = estimator.bridge("USDC").unwrap();
    let options = SendOptions {
        recipient: Some(RECIPIENT),
        ..SendOptions::default()
    };

    let err = usdc
        .populate_send_htokens_tx(U256::from(1_000u64), ChainSlug::Optimism, ChainSlug::Arbitrum, &options)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::InvalidInput("Sending hToken L2 to L2 is not currently supported".to_string())
    );
}

#[tokio::test]
async fn transfer_failure_check() {
    let usdc_estimator = create_estimator(FakeReader::default());
    let usdc = usdc_estimator.bridge("USDC").unwrap();
    // only native deliveries can revert at the recipient
    assert!(
        !usdc
            .will_transfer_fail(ChainSlug::Ethereum, ChainSlug::Optimism, RECIPIENT)
            .await
    );

    let eth = create_estimator(FakeReader::default()).bridge("ETH").unwrap();
    assert!(
        !eth.will_transfer_fail(ChainSlug::Ethereum, ChainSlug::Optimism, RECIPIENT)
            .await
    );

    let offline = create_estimator(FakeReader {
        offline: true,
        ..FakeReader::default()
    });
    let eth = offline.bridge("ETH").unwrap();
    assert!(
        eth.will_transfer_fail(ChainSlug::Ethereum, ChainSlug::Optimism, RECIPIENT)
            .await
    );
}

#[tokio::test]
async fn l1_bridge_timing() {
    let estimator = create_estimator(FakeReader::default());
    let usdc = estimator.bridge("USDC").unwrap();

    assert_eq!(usdc.challenge_period().await.unwrap(), U256::from(86_400u64));
    assert_eq!(usdc.time_slot(U256::from(7_200u64)).await.unwrap(), U256::from(2u64));
}

#[test]
fn supported_assets_per_chain() {
    let estimator = create_estimator(FakeReader::default());

    let on_ethereum = estimator.supported_assets_for_chain(ChainSlug::Ethereum);
    assert!(on_ethereum.contains("USDC"));
    assert!(on_ethereum.contains("ETH"));
    assert!(on_ethereum.contains("HOP"));

    let on_gnosis = estimator.supported_assets_for_chain(ChainSlug::Gnosis);
    assert_eq!(on_gnosis.into_iter().collect::<Vec<_>>(), vec!["ETH".to_string()]);
}
