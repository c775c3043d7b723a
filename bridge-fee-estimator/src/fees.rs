//! Fee, rate and liquidity arithmetic
//!
//! Everything here is pure: amounts are integers in the smallest token unit and USD
//! prices are floats. Conversions between the two go through decimal strings rounded
//! to the token's decimals, so results match what a caller doing the same math with
//! fixed-point strings would get.

use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};

use crate::{error::ServiceError, models::ChainSlug};

/// Liquidity provider fee charged by each L2 AMM hop, in basis points
pub const LP_FEE_BPS: u64 = 4;

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Amount used to quote the market rate without slippage
pub const AMOUNT_IN_NO_SLIPPAGE: u64 = 1000;

/// USD value held back from L1 liquidity for transfers still in flight
pub const PENDING_AMOUNT_BUFFER_USD: &str = "50000";

pub const MIN_POLYGON_GAS_PRICE: u128 = 30_000_000_000;

pub const MIN_POLYGON_GAS_LIMIT: u64 = 1_000_000;

/// Gas an L1 to arbitrum deposit relay is charged for
pub const DEFAULT_RELAY_GAS_LIMIT: u64 = 1_000_000;

/// Gas to settle a single transfer on the destination chain
pub fn settlement_gas_limit_per_tx(chain: ChainSlug) -> u64 {
    match chain {
        ChainSlug::Ethereum => 5141,
        ChainSlug::Polygon => 5933,
        ChainSlug::Gnosis => 3218,
        ChainSlug::Optimism => 8545,
        ChainSlug::Arbitrum => 59105,
    }
}

/// Bond withdrawal gas used when estimation against the destination fails
pub fn bond_transfer_gas_limit(chain: ChainSlug) -> u64 {
    match chain {
        ChainSlug::Optimism => 100_000_000,
        ChainSlug::Arbitrum => 2_500_000,
        _ => 165_000,
    }
}

/// Smallest bonder fee in USD for transfers leaving `source`
pub fn min_bonder_fee_usd(source: ChainSlug) -> f64 {
    if source == ChainSlug::Polygon {
        0.5
    } else {
        0.25
    }
}

fn pow10(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Convert a non-negative float to base units, rounding it to `decimals` places first
pub fn to_base_units(value: f64, decimals: u8) -> Result<U256, ServiceError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ServiceError::Estimation(format!("cannot convert {value} to token units")));
    }
    let fixed = format!("{:.*}", decimals as usize, value);
    parse_units(&fixed, decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| ServiceError::Estimation(format!("cannot parse {fixed}: {e}")))
}

/// Format base units as a float with `decimals` places
pub fn from_base_units(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Rejects amounts whose intermediate product does not fit in 256 bits
pub fn amount_too_large() -> ServiceError {
    ServiceError::InvalidInput("amount too large".to_string())
}

/// `value * numerator / denominator` without wrapping
pub fn mul_div(value: U256, numerator: U256, denominator: U256) -> Result<U256, ServiceError> {
    value
        .checked_mul(numerator)
        .map(|product| product / denominator)
        .ok_or_else(amount_too_large)
}

fn check_price(symbol_hint: &str, price: f64) -> Result<(), ServiceError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ServiceError::PriceUnavailable(format!(
            "invalid {symbol_hint} price {price}"
        )));
    }
    Ok(())
}

/// AMM fees paid for a transfer: LP_FEE_BPS for every L2 endpoint
pub fn lp_fees(amount: U256, source_is_l1: bool, destination_is_l1: bool) -> Result<U256, ServiceError> {
    let hops = u64::from(!source_is_l1) + u64::from(!destination_is_l1);
    mul_div(amount, U256::from(LP_FEE_BPS * hops), U256::from(BPS_DENOMINATOR))
}

/// Relative bonder fee on an hToken amount. Fractional basis points are kept to two places.
pub fn bonder_fee_relative(htoken_amount: U256, fee_bps: f64) -> Result<U256, ServiceError> {
    if !fee_bps.is_finite() || fee_bps <= 0.0 {
        return Ok(U256::ZERO);
    }
    let centi_bps = U256::from((fee_bps * 100.0).round() as u64);
    mul_div(htoken_amount, centi_bps, U256::from(BPS_DENOMINATOR * 100))
}

/// USD minimum bonder fee expressed in the token
///
/// # Arguments
///
/// * `token_price_usd` - USD price of one whole token
/// * `decimals` - Token decimals
/// * `source` - Source chain of the transfer
pub fn min_bonder_fee_absolute(token_price_usd: f64, decimals: u8, source: ChainSlug) -> Result<U256, ServiceError> {
    check_price("token", token_price_usd)?;
    to_base_units(min_bonder_fee_usd(source) / token_price_usd, decimals)
}

pub fn enforce_absolute_minimum(fee: U256, minimum: U256) -> U256 {
    fee.max(minimum)
}

/// Convert a destination transaction cost in native wei to the bridged token
///
/// The cost is converted with the native/token price ratio and then scaled by the
/// destination gas price multiplier when one applies.
pub fn destination_fee(
    tx_fee_wei: U256,
    native_token_price: f64,
    token_price: f64,
    decimals: u8,
    multiplier: Option<f64>,
) -> Result<U256, ServiceError> {
    check_price("native token", native_token_price)?;
    check_price("token", token_price)?;

    let one_eth = pow10(18);
    let rate = to_base_units(native_token_price / token_price, decimals)?;
    let mut fee = mul_div(tx_fee_wei, rate, one_eth)?;

    if let Some(multiplier) = multiplier {
        if multiplier.is_finite() && multiplier > 0.0 {
            let multiplier = to_base_units(multiplier, 18)?;
            fee = mul_div(fee, multiplier, one_eth)?;
        }
    }
    Ok(fee)
}

/// Minimum accepted output for a slippage tolerance given in percent
pub fn amount_out_min(amount_out: U256, slippage_tolerance: f64) -> Result<U256, ServiceError> {
    let min_bps = (BPS_DENOMINATOR as f64 - slippage_tolerance * 100.0).ceil();
    if !min_bps.is_finite() || min_bps <= 0.0 {
        return Ok(U256::ZERO);
    }
    mul_div(amount_out, U256::from(min_bps as u64), U256::from(BPS_DENOMINATOR))
}

/// Output per whole input token, as a float
pub fn rate(amount_in: U256, amount_out: U256, source_decimals: u8, destination_decimals: u8) -> Result<f64, ServiceError> {
    if amount_in.is_zero() {
        return Ok(0.0);
    }
    let rate = mul_div(amount_out, pow10(source_decimals), amount_in)?;
    Ok(from_base_units(rate, destination_decimals))
}

/// How far a rate falls below the market rate, in percent
pub fn price_impact(rate: f64, market_rate: f64) -> f64 {
    if market_rate == 0.0 {
        return 0.0;
    }
    (market_rate - rate) / market_rate * 100.0
}

/// LP fee charged by a single AMM swap
pub fn amm_lp_fee_amount(amount_in: U256, source_decimals: u8, destination_decimals: u8) -> Result<U256, ServiceError> {
    let lp_fee = U256::from(LP_FEE_BPS) * pow10(destination_decimals);
    Ok(mul_div(amount_in, lp_fee, pow10(source_decimals))? / U256::from(BPS_DENOMINATOR))
}

pub fn bump_gas_price(gas_price: u128, multiplier: f64) -> u128 {
    let percent = (multiplier * 100.0).round();
    if !percent.is_finite() || percent <= 0.0 {
        return gas_price;
    }
    gas_price.saturating_mul(percent as u128) / 100
}

/// The pending-amount USD buffer expressed in whole tokens, scaled to base units
pub fn pending_buffer_in_tokens(token_price_usd: f64, decimals: u8) -> Result<U256, ServiceError> {
    check_price("token", token_price_usd)?;
    let buffer = parse_units(PENDING_AMOUNT_BUFFER_USD, decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| ServiceError::Estimation(format!("cannot parse pending buffer: {e}")))?;
    let price = to_base_units(token_price_usd, decimals)?;
    if price.is_zero() {
        return Err(ServiceError::PriceUnavailable(format!(
            "token price {token_price_usd} rounds to zero"
        )));
    }
    (buffer / price).checked_mul(pow10(decimals)).ok_or_else(amount_too_large)
}

pub fn estimated_received(amount_out: U256, total_fee: U256) -> U256 {
    amount_out.saturating_sub(total_fee)
}
