use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Service-specific error types
///
/// This enum defines all possible errors that can occur while estimating fees,
/// amounts and liquidity for a bridge route, or while building transfer transactions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Caller supplied a value that cannot be used (bad amount, missing recipient, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Chain slug or chain model is not part of the configured network
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// Token symbol is not part of the configured network
    #[error("Unsupported token: {0}")]
    UnsupportedToken(String),

    /// A value that must come from the network configuration is absent
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// Error communicating with a chain RPC node
    #[error("RPC connection error: {0}")]
    RPCConnection(String),

    /// Error fetching or decoding the remote configuration/liquidity snapshot
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// No usable USD price for a token
    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),

    /// Token allowance is below the transfer amount
    #[error("not enough allowance: {0}")]
    NotEnoughAllowance(String),

    /// Deposits to the destination chain are paused on the L1 bridge
    #[error("deposits to destination chain \"{0}\" are currently paused")]
    DestinationPaused(String),

    /// Error estimating a fee or amount
    #[error("Estimation failed: {0}")]
    Estimation(String),

    /// Transfer explorer API returned an error
    #[error("Explorer error: {0}")]
    Explorer(String),
}

/// Structured error response for the API
///
/// This structure defines the JSON format of error responses returned by the API.
#[derive(Serialize)]
struct ErrorResponse {
    /// Human-readable error message
    error: String,

    /// Machine-readable error code
    error_code: String,

    /// Optional detailed error information
    details: Option<String>,
}

impl ServiceError {
    /// Machine-readable code used in API error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::UnsupportedChain(_) => "UNSUPPORTED_CHAIN",
            ServiceError::UnsupportedToken(_) => "UNSUPPORTED_TOKEN",
            ServiceError::MissingConfig(_) => "MISSING_CONFIG",
            ServiceError::RPCConnection(_) => "RPC_CONNECTION_ERROR",
            ServiceError::Snapshot(_) => "SNAPSHOT_ERROR",
            ServiceError::PriceUnavailable(_) => "PRICE_UNAVAILABLE",
            ServiceError::NotEnoughAllowance(_) => "NOT_ENOUGH_ALLOWANCE",
            ServiceError::DestinationPaused(_) => "DESTINATION_PAUSED",
            ServiceError::Estimation(_) => "ESTIMATION_ERROR",
            ServiceError::Explorer(_) => "EXPLORER_ERROR",
        }
    }

    /// Whether the error was caused by the caller rather than by an upstream system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidInput(_)
                | ServiceError::UnsupportedChain(_)
                | ServiceError::UnsupportedToken(_)
                | ServiceError::NotEnoughAllowance(_)
                | ServiceError::DestinationPaused(_)
        )
    }

    fn details(&self) -> String {
        match self {
            ServiceError::InvalidInput(d)
            | ServiceError::UnsupportedChain(d)
            | ServiceError::UnsupportedToken(d)
            | ServiceError::MissingConfig(d)
            | ServiceError::RPCConnection(d)
            | ServiceError::Snapshot(d)
            | ServiceError::PriceUnavailable(d)
            | ServiceError::NotEnoughAllowance(d)
            | ServiceError::DestinationPaused(d)
            | ServiceError::Estimation(d)
            | ServiceError::Explorer(d) => d.clone(),
        }
    }
}

impl From<alloy::transports::TransportError> for ServiceError {
    fn from(err: alloy::transports::TransportError) -> Self {
        ServiceError::RPCConnection(err.to_string())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Snapshot(err.to_string())
    }
}

impl ResponseError for ServiceError {
    /// Convert the error to an HTTP response
    ///
    /// This method generates an appropriate HTTP response based on the error type,
    /// including status code and a JSON error body.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
            details: Some(self.details()),
        })
    }

    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::RPCConnection(_) | ServiceError::Snapshot(_) | ServiceError::Explorer(_) => {
                StatusCode::BAD_GATEWAY
            }
            ServiceError::PriceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::MissingConfig(_) | ServiceError::Estimation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
