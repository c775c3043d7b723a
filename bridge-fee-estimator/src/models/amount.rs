//! Token amount (de)serialization
//!
//! Amounts travel as decimal strings in API payloads. Snapshot payloads are less
//! uniform: they may carry decimal strings, `0x` hex strings or plain JSON integers.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(u64),
}

/// Parse a decimal or `0x`-prefixed hexadecimal amount
pub fn parse_amount(value: &str) -> Result<U256, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Amount must not be empty".to_string());
    }
    match value.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex amount: {}", e)),
        None => U256::from_str_radix(value, 10).map_err(|e| format!("Invalid amount \"{}\": {}", value, e)),
    }
}

fn from_raw(raw: RawAmount) -> Result<U256, String> {
    match raw {
        RawAmount::Text(text) => parse_amount(&text),
        RawAmount::Number(n) => Ok(U256::from(n)),
    }
}

/// Serialize a `U256` as a decimal string, accept any of the supported encodings
pub mod decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = RawAmount::deserialize(deserializer)?;
        from_raw(raw).map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`decimal`]; use together with `#[serde(default)]`
pub mod decimal_opt {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        let raw = Option::<RawAmount>::deserialize(deserializer)?;
        raw.map(from_raw).transpose().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "decimal")]
        amount: U256,
        #[serde(default, with = "decimal_opt")]
        fee: Option<U256>,
    }

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_amount("1000000").unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_amount("0x5208").unwrap(), U256::from(21_000u64));
        assert!(parse_amount("").is_err());
        assert!(parse_amount("12.5").is_err());
    }

    #[test]
    fn accepts_strings_and_integers() {
        let w: Wrapper = serde_json::from_str(r#"{"amount": 42}"#).unwrap();
        assert_eq!(w.amount, U256::from(42u64));
        assert_eq!(w.fee, None);

        let w: Wrapper = serde_json::from_str(r#"{"amount": "0x10", "fee": "7"}"#).unwrap();
        assert_eq!(w.amount, U256::from(16u64));
        assert_eq!(w.fee, Some(U256::from(7u64)));
    }

    #[test]
    fn serializes_as_decimal_string() {
        let w = Wrapper { amount: U256::from(1_500u64), fee: None };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["amount"], "1500");
        assert!(json["fee"].is_null());
    }
}
