use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::{amount::parse_amount, chain::ChainSlug, transfer::SendOptions};

/// JSON-RPC error code for malformed parameters
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC error code for failures while serving a well-formed request
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 request structure
///
/// This structure represents a standard JSON-RPC request with generic parameters.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest<T> {
    /// JSON-RPC protocol version (should be "2.0")
    pub jsonrpc: String,

    /// Method name to call
    pub method: String,

    /// Method parameters
    pub params: T,

    /// Request identifier
    pub id: serde_json::Value,
}

/// JSON-RPC 2.0 successful response
#[derive(Debug, Serialize)]
pub struct JsonRpcSuccess<T> {
    /// JSON-RPC protocol version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier (matching the request)
    pub id: serde_json::Value,

    /// Method result
    pub result: T,
}

/// JSON-RPC 2.0 error response
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// JSON-RPC protocol version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier (matching the request)
    pub id: serde_json::Value,

    /// Error details
    pub error: JsonRpcErrorDetail,
}

/// JSON-RPC 2.0 error detail
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorDetail {
    /// Error code
    pub code: i32,

    /// Error message
    pub message: String,

    /// Additional error data (optional)
    pub data: Option<serde_json::Value>,
}

/// Parameters shared by every `bridge_*` method
///
/// Each method reads the subset it needs; the handlers report which required field
/// is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeParams {
    /// Token symbol selecting the bridge (e.g. "USDC")
    pub token: String,

    /// Token amount in the smallest unit, decimal or 0x-hex
    #[serde(default)]
    pub amount: Option<String>,

    #[serde(default)]
    pub source_chain: Option<String>,

    #[serde(default)]
    pub destination_chain: Option<String>,

    /// Single chain for AMM and approval queries
    #[serde(default)]
    pub chain: Option<String>,

    #[serde(default)]
    pub bonder: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default, rename = "isHTokenSend", alias = "isHTokenTransfer")]
    pub is_htoken_send: bool,

    #[serde(default, rename = "isToHToken")]
    pub is_to_htoken: bool,

    /// Slippage tolerance in percent (0.5 = 0.5%)
    #[serde(default)]
    pub slippage_tolerance: Option<f64>,

    #[serde(default)]
    pub options: SendOptions,
}

impl BridgeParams {
    pub fn amount(&self) -> Result<U256, String> {
        let raw = self.amount.as_deref().ok_or_else(|| "Missing amount".to_string())?;
        parse_amount(raw)
    }

    pub fn source_chain(&self) -> Result<ChainSlug, String> {
        parse_chain(self.source_chain.as_deref(), "sourceChain")
    }

    pub fn destination_chain(&self) -> Result<ChainSlug, String> {
        parse_chain(self.destination_chain.as_deref(), "destinationChain")
    }

    pub fn chain(&self) -> Result<ChainSlug, String> {
        parse_chain(self.chain.as_deref(), "chain")
    }

    pub fn bonder(&self) -> Result<Address, String> {
        parse_hex_address(self.bonder.as_deref().ok_or_else(|| "Missing bonder".to_string())?)
    }

    pub fn owner(&self) -> Result<Address, String> {
        parse_hex_address(self.owner.as_deref().ok_or_else(|| "Missing owner".to_string())?)
    }
}

fn parse_chain(value: Option<&str>, field: &str) -> Result<ChainSlug, String> {
    let value = value.ok_or_else(|| format!("Missing {}", field))?;
    ChainSlug::from_str(value).map_err(|e| e.to_string())
}

impl JsonRpcError {
    /// Create a new JSON-RPC invalid parameters error
    ///
    /// # Arguments
    ///
    /// * `id` - Request identifier
    /// * `message` - Error message
    pub fn invalid_params(id: serde_json::Value, message: String) -> Self {
        Self::with_code(id, INVALID_PARAMS, message)
    }

    /// Create a new JSON-RPC internal error
    ///
    /// # Arguments
    ///
    /// * `id` - Request identifier
    /// * `message` - Error message
    pub fn internal_error(id: serde_json::Value, message: String) -> Self {
        Self::with_code(id, INTERNAL_ERROR, message)
    }

    fn with_code(id: serde_json::Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            error: JsonRpcErrorDetail {
                code,
                message,
                data: None,
            },
        }
    }

    /// Attach machine-readable error data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.error.data = Some(data);
        self
    }
}

impl<T> JsonRpcSuccess<T> {
    /// Create a new JSON-RPC success response
    pub fn new(id: serde_json::Value, result: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result,
        }
    }
}

/// Parse a hexadecimal address string into an `Address`.
///
/// Expects a string starting with "0x" and 40 hex digits (20 bytes).
pub fn parse_hex_address(hex: &str) -> Result<Address, String> {
    if !hex.starts_with("0x") {
        return Err("Address must start with 0x".to_string());
    }
    Address::from_str(hex).map_err(|e| format!("Invalid address: {}", e))
}

/// Format a `U256` value into a hexadecimal string prefixed with "0x".
pub fn format_hex_u256(value: U256) -> String {
    format!("0x{:x}", value)
}
