use actix_web::{post, web, HttpRequest, HttpResponse};
use alloy::primitives::U256;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::{
    error::ServiceError,
    estimator::BridgeEstimator,
    models::jsonrpc::{BridgeParams, JsonRpcError, JsonRpcRequest, JsonRpcSuccess},
};

/// Slippage applied by `bridge_getAmmData` and `bridge_calcAmountOutMin` when none is given
pub const DEFAULT_SLIPPAGE_TOLERANCE: f64 = 0.5;

/// JSON-RPC endpoint for fee, liquidity and transaction queries
///
/// Every `bridge_*` method takes a single params object; `token` selects the bridge.
#[post("/api/v1/bridge")]
async fn bridge_jsonrpc(
    req: HttpRequest,
    estimator: web::Data<BridgeEstimator>,
    request: web::Json<JsonRpcRequest<Value>>,
) -> HttpResponse {
    debug!(
        "Received {} request from {}",
        request.method,
        req.peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );

    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return HttpResponse::BadRequest().json(JsonRpcError::invalid_params(
            request.id.clone(),
            "Invalid JSON-RPC version. Expected 2.0".to_string(),
        ));
    }

    let params: BridgeParams = match serde_json::from_value(request.params.clone()) {
        Ok(params) => params,
        Err(e) => {
            return HttpResponse::BadRequest().json(JsonRpcError::invalid_params(
                request.id.clone(),
                format!("Invalid params: {}", e),
            ));
        }
    };

    match dispatch(&estimator, &request.method, &params).await {
        Ok(result) => {
            info!("{} for {} succeeded", request.method, params.token);
            HttpResponse::Ok().json(JsonRpcSuccess::new(request.id.clone(), result))
        }
        Err(e) if e.is_client_error() => {
            debug!("{} rejected: {}", request.method, e);
            HttpResponse::BadRequest().json(
                JsonRpcError::invalid_params(request.id.clone(), e.to_string())
                    .with_data(json!({ "errorCode": e.error_code() })),
            )
        }
        Err(e) => {
            error!("{} failed: {:?}", request.method, e);
            HttpResponse::InternalServerError().json(
                JsonRpcError::internal_error(request.id.clone(), e.to_string())
                    .with_data(json!({ "errorCode": e.error_code() })),
            )
        }
    }
}

fn invalid(message: String) -> ServiceError {
    ServiceError::InvalidInput(message)
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ServiceError> {
    serde_json::to_value(value).map_err(|e| ServiceError::Estimation(format!("failed to serialize result: {}", e)))
}

/// Token amounts leave the service as decimal strings
fn amount(value: U256) -> Value {
    Value::String(value.to_string())
}

async fn dispatch(estimator: &BridgeEstimator, method: &str, params: &BridgeParams) -> Result<Value, ServiceError> {
    let bridge = estimator.bridge(&params.token)?;
    let slippage = params.slippage_tolerance.unwrap_or(DEFAULT_SLIPPAGE_TOLERANCE);

    match method {
        "bridge_getSendData" => {
            let data = bridge
                .send_data(
                    params.amount().map_err(invalid)?,
                    params.source_chain().map_err(invalid)?,
                    params.destination_chain().map_err(invalid)?,
                    params.is_htoken_send,
                )
                .await?;
            to_json(data)
        }
        "bridge_getAmountOut" => Ok(amount(
            bridge
                .amount_out(
                    params.amount().map_err(invalid)?,
                    params.source_chain().map_err(invalid)?,
                    params.destination_chain().map_err(invalid)?,
                )
                .await?,
        )),
        "bridge_getTotalFee" => Ok(amount(
            bridge
                .total_fee(
                    params.amount().map_err(invalid)?,
                    params.source_chain().map_err(invalid)?,
                    params.destination_chain().map_err(invalid)?,
                )
                .await?,
        )),
        "bridge_getLpFees" => Ok(amount(bridge.lp_fees(
            params.amount().map_err(invalid)?,
            params.source_chain().map_err(invalid)?,
            params.destination_chain().map_err(invalid)?,
        )?)),
        "bridge_getBonderFeeAbsolute" => Ok(amount(
            bridge
                .bonder_fee_absolute(params.source_chain().map_err(invalid)?)
                .await?,
        )),
        "bridge_getDestinationTransactionFee" => Ok(amount(
            bridge
                .destination_transaction_fee(
                    params.source_chain().map_err(invalid)?,
                    params.destination_chain().map_err(invalid)?,
                )
                .await?,
        )),
        "bridge_getRequiredLiquidity" => Ok(amount(
            bridge
                .required_liquidity(
                    params.amount().map_err(invalid)?,
                    params.source_chain().map_err(invalid)?,
                )
                .await?,
        )),
        "bridge_getAvailableLiquidity" => Ok(amount(
            bridge
                .available_liquidity(
                    params.destination_chain().map_err(invalid)?,
                    params.bonder().map_err(invalid)?,
                )
                .await?,
        )),
        "bridge_getFrontendAvailableLiquidity" => Ok(amount(
            bridge
                .frontend_available_liquidity(
                    params.source_chain().map_err(invalid)?,
                    params.destination_chain().map_err(invalid)?,
                )
                .await?,
        )),
        "bridge_checkLiquidity" => {
            let check = bridge
                .check_liquidity(
                    params.amount().map_err(invalid)?,
                    params.source_chain().map_err(invalid)?,
                    params.destination_chain().map_err(invalid)?,
                )
                .await?;
            to_json(check)
        }
        "bridge_getAmmData" => {
            let data = bridge
                .amm_data(
                    params.chain().map_err(invalid)?,
                    params.amount().map_err(invalid)?,
                    params.is_to_htoken,
                    slippage,
                )
                .await?;
            to_json(data)
        }
        "bridge_calcAmountOutMin" => Ok(amount(
            bridge.calc_amount_out_min(params.amount().map_err(invalid)?, slippage)?,
        )),
        "bridge_populateSendTx" => {
            let amount = params.amount().map_err(invalid)?;
            let source = params.source_chain().map_err(invalid)?;
            let destination = params.destination_chain().map_err(invalid)?;
            let tx = if params.is_htoken_send {
                bridge
                    .populate_send_htokens_tx(amount, source, destination, &params.options)
                    .await?
            } else {
                bridge
                    .populate_send_tx(amount, source, destination, &params.options)
                    .await?
            };
            to_json(tx)
        }
        "bridge_populateApprovalTx" => {
            let tx = bridge
                .populate_send_approval_tx(
                    params.amount().map_err(invalid)?,
                    params.source_chain().map_err(invalid)?,
                    params.is_htoken_send,
                )
                .await?;
            to_json(tx)
        }
        "bridge_needsApproval" => {
            let needed = bridge
                .needs_approval(
                    params.amount().map_err(invalid)?,
                    params.chain().map_err(invalid)?,
                    params.owner().map_err(invalid)?,
                    params.is_htoken_send,
                )
                .await?;
            Ok(Value::Bool(needed))
        }
        "bridge_isDestinationChainPaused" => {
            let paused = bridge
                .is_destination_chain_paused(params.destination_chain().map_err(invalid)?)
                .await?;
            Ok(Value::Bool(paused))
        }
        "bridge_getSupportedChains" => Ok(json!({
            "chains": bridge.supported_chains(),
            "lpChains": bridge.supported_lp_chains(),
        })),
        other => Err(invalid(format!("Unsupported method: {}", other))),
    }
}

/// Service health check endpoint that verifies the ethereum RPC connection is working
#[post("/api/v1/health")]
async fn health_check(estimator: web::Data<BridgeEstimator>) -> Result<HttpResponse, ServiceError> {
    info!("Health check requested");

    match estimator.latest_block().await {
        Ok((number, timestamp)) => Ok(HttpResponse::Ok().json(json!({
            "status": "ok",
            "latest_block": number,
            "timestamp": timestamp,
        }))),
        Err(e) => {
            error!("Health check failed: {:?}", e);
            Err(e)
        }
    }
}

/// Configure the API routes for the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(bridge_jsonrpc).service(health_check);
}
