//! Integration tests for the API endpoints

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use bridge_fee_estimator::api;

mod helpers;
use helpers::{create_estimator, FakeReader, OPTIMISM_USDC_WRAPPER, RECIPIENT, USDC_BONDER, USDC_L1_BRIDGE};

/// POST a request body to an app over `reader` and return the status with the parsed body
async fn post(reader: FakeReader, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_estimator(reader)))
            .configure(api::configure),
    )
    .await;

    let mut req = test::TestRequest::post().uri(uri);
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let response: Value = serde_json::from_slice(&body).expect("Failed to parse JSON response");
    (status, response)
}

async fn call_with(reader: FakeReader, method: &str, params: Value) -> (StatusCode, Value) {
    let request = json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    });
    post(reader, "/api/v1/bridge", Some(request)).await
}

async fn call(method: &str, params: Value) -> (StatusCode, Value) {
    call_with(FakeReader::default(), method, params).await
}

fn offline() -> FakeReader {
    FakeReader {
        offline: true,
        ..FakeReader::default()
    }
}

fn paused() -> FakeReader {
    FakeReader {
        paused: true,
        ..FakeReader::default()
    }
}

fn lower(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_lowercase()
}

#[actix_web::test]
async fn test_health_check() {
    let (status, response) = post(FakeReader::default(), "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "ok");
    assert_eq!(response["latest_block"], 19_000_000);
    assert_eq!(response["timestamp"], 1_700_000_000u64);
}

#[actix_web::test]
async fn test_health_check_reports_unreachable_node() {
    let (status, response) = post(offline(), "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(response["error_code"], "RPC_CONNECTION_ERROR");
}

#[actix_web::test]
async fn test_send_data_from_l1() {
    let (status, response) = call(
        "bridge_getSendData",
        json!({
            "token": "USDC",
            "amount": "100000000",
            "sourceChain": "ethereum",
            "destinationChain": "optimism"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);

    let result = &response["result"];
    assert_eq!(result["amountOut"], "99900000");
    assert_eq!(result["requiredLiquidity"], "100000000");
    assert_eq!(result["lpFees"], "40000");
    // deposits to optimism are not relayed, so nothing is charged
    assert_eq!(result["totalFee"], "0");
    assert_eq!(result["estimatedReceived"], "99900000");
}

#[actix_web::test]
async fn test_amount_out_between_l2s() {
    let (status, response) = call(
        "bridge_getAmountOut",
        json!({
            "token": "USDC",
            "amount": "0x5f5e100",
            "sourceChain": "optimism",
            "destinationChain": "arbitrum"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // two swaps at 99.9%
    assert_eq!(response["result"], "99800100");
}

#[actix_web::test]
async fn test_lp_fees_and_amount_out_min() {
    let (_, response) = call(
        "bridge_getLpFees",
        json!({
            "token": "USDC",
            "amount": "100000000",
            "sourceChain": "optimism",
            "destinationChain": "arbitrum"
        }),
    )
    .await;
    assert_eq!(response["result"], "80000");

    let (_, response) = call(
        "bridge_calcAmountOutMin",
        json!({ "token": "USDC", "amount": "100000000", "slippageTolerance": 0.5 }),
    )
    .await;
    assert_eq!(response["result"], "99500000");
}

#[actix_web::test]
async fn test_amounts_beyond_256_bit_math_are_rejected() {
    let max = format!("0x{}", "f".repeat(64));

    let (status, response) = call(
        "bridge_getLpFees",
        json!({
            "token": "USDC",
            "amount": max,
            "sourceChain": "optimism",
            "destinationChain": "arbitrum"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["data"]["errorCode"], "INVALID_INPUT");

    let (status, response) = call(
        "bridge_getSendData",
        json!({
            "token": "USDC",
            "amount": max,
            "sourceChain": "ethereum",
            "destinationChain": "optimism"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]["message"].as_str().unwrap().contains("amount too large"));
}

#[actix_web::test]
async fn test_liquidity_endpoints() {
    let (status, response) = call(
        "bridge_getAvailableLiquidity",
        json!({
            "token": "USDC",
            "destinationChain": "optimism",
            "bonder": USDC_BONDER.to_string()
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"], "600000");

    let (_, response) = call(
        "bridge_getFrontendAvailableLiquidity",
        json!({ "token": "USDC", "sourceChain": "optimism", "destinationChain": "arbitrum" }),
    )
    .await;
    assert_eq!(response["result"], "600000");

    let (_, response) = call(
        "bridge_checkLiquidity",
        json!({
            "token": "USDC",
            "amount": "500000",
            "sourceChain": "optimism",
            "destinationChain": "arbitrum"
        }),
    )
    .await;
    assert_eq!(response["result"]["availableLiquidity"], "600000");
    assert_eq!(response["result"]["requiredLiquidity"], "499500");
    assert_eq!(response["result"]["isAvailable"], true);
}

#[actix_web::test]
async fn test_supported_chains() {
    let (_, response) = call("bridge_getSupportedChains", json!({ "token": "usdc" })).await;
    assert_eq!(
        response["result"]["chains"],
        json!(["ethereum", "optimism", "arbitrum", "polygon"])
    );
    assert_eq!(response["result"]["lpChains"], json!(["optimism", "arbitrum", "polygon"]));
}

#[actix_web::test]
async fn test_populate_send_tx_from_l1() {
    let (status, response) = call(
        "bridge_populateSendTx",
        json!({
            "token": "USDC",
            "amount": "100000000",
            "sourceChain": "ethereum",
            "destinationChain": "optimism",
            "options": { "recipient": RECIPIENT.to_string(), "relayerFee": "0" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(lower(&response["result"]["to"]), USDC_L1_BRIDGE.to_string().to_lowercase());
    assert!(response["result"]["input"].is_string());
}

#[actix_web::test]
async fn test_populate_send_tx_to_paused_chain() {
    let (status, response) = call_with(
        paused(),
        "bridge_populateSendTx",
        json!({
            "token": "USDC",
            "amount": "100000000",
            "sourceChain": "ethereum",
            "destinationChain": "optimism",
            "options": { "recipient": RECIPIENT.to_string(), "relayerFee": "1" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["data"]["errorCode"], "DESTINATION_PAUSED");
}

#[actix_web::test]
async fn test_approval_endpoints() {
    let (_, response) = call(
        "bridge_needsApproval",
        json!({
            "token": "USDC",
            "amount": "1000",
            "chain": "optimism",
            "owner": RECIPIENT.to_string()
        }),
    )
    .await;
    assert_eq!(response["result"], true);

    let (status, response) = call(
        "bridge_populateApprovalTx",
        json!({ "token": "USDC", "amount": "1000", "sourceChain": "optimism" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        lower(&response["result"]["to"]),
        "0x2222222222222222222222222222222222222202"
    );
    // the approval targets the AMM wrapper
    let input = lower(&response["result"]["input"]);
    assert!(input.contains(&OPTIMISM_USDC_WRAPPER.to_string().to_lowercase()[2..]));
}

#[actix_web::test]
async fn test_destination_paused_flag() {
    let (_, response) = call_with(
        paused(),
        "bridge_isDestinationChainPaused",
        json!({ "token": "USDC", "destinationChain": "arbitrum" }),
    )
    .await;
    assert_eq!(response["result"], true);
}

#[actix_web::test]
async fn test_unknown_token() {
    let (status, response) = call(
        "bridge_getTotalFee",
        json!({
            "token": "DOGE",
            "amount": "1",
            "sourceChain": "optimism",
            "destinationChain": "ethereum"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["data"]["errorCode"], "UNSUPPORTED_TOKEN");
}

#[actix_web::test]
async fn test_invalid_requests() {
    let (status, response) = call("bridge_getEverything", json!({ "token": "USDC" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unsupported method"));

    let (status, response) = call(
        "bridge_getAmountOut",
        json!({ "token": "USDC", "sourceChain": "optimism", "destinationChain": "arbitrum" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]["message"].as_str().unwrap().contains("Missing amount"));

    let (status, _) = call("bridge_getAmountOut", json!("USDC")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, response) = post(
        FakeReader::default(),
        "/api/v1/bridge",
        Some(json!({
            "jsonrpc": "1.0",
            "method": "bridge_getSupportedChains",
            "params": { "token": "USDC" },
            "id": 7
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["id"], 7);
}

#[actix_web::test]
async fn test_upstream_failure_is_internal_error() {
    let (status, response) = call_with(
        offline(),
        "bridge_getDestinationTransactionFee",
        json!({ "token": "USDC", "sourceChain": "optimism", "destinationChain": "arbitrum" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"]["code"], -32603);
    assert_eq!(response["error"]["data"]["errorCode"], "RPC_CONNECTION_ERROR");
}
