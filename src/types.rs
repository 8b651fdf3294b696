// Pool Event Types
//
// The persisted domain record and its exact decimal amount representation.

use alloy_primitives::{ruint::ParseError, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which pair event produced a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventType {
    Mint,
    Burn,
    Swap,
    Transfer,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Mint,
        EventType::Burn,
        EventType::Swap,
        EventType::Transfer,
    ];

    /// Persisted type code (at most 8 characters).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Mint => "Mint",
            EventType::Burn => "Burn",
            EventType::Swap => "Swap",
            EventType::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {s}"))
    }
}

/// Token amount in base units, held as a canonical decimal string.
///
/// Values come straight from `uint256` ABI fields, so they are never routed
/// through a fixed-width integer or float.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_u256(&self) -> Result<U256, ParseError> {
        U256::from_str_radix(&self.0, 10)
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for Amount {
    type Err = String;

    /// Accepts non-negative decimal integers and strips leading zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("not a non-negative decimal integer: {s:?}"));
        }
        let trimmed = s.trim_start_matches('0');
        let canonical = if trimmed.is_empty() { "0" } else { trimmed };
        Ok(Self(canonical.to_string()))
    }
}

impl TryFrom<String> for Amount {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One decoded pool event, keyed by the source event id.
///
/// Built in one piece by the mapper and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEvent {
    /// Source event id; stable across re-runs so saves are upserts.
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Display addresses (EVM checksummed for sender/to, SS58 for signer)
    pub to_address: Option<String>,
    pub sender_address: Option<String>,
    pub signer_address: Option<String>,

    pub block_height: u64,
    pub index_in_block: u32,

    /// Output amounts (or minted/burned/transferred amounts)
    pub amount1: Option<Amount>,
    pub amount2: Option<Amount>,

    /// Swap input amounts
    pub amount_in1: Option<Amount>,
    pub amount_in2: Option<Amount>,

    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_preserves_values_beyond_u64() {
        let big = U256::from(u64::MAX) * U256::from(1_000_000u64) + U256::from(7u64);
        let amount = Amount::from(big);

        assert_eq!(amount.as_str(), "18446744073709551615000007");
        assert_eq!(amount.to_u256().unwrap(), big);

        let max = Amount::from(U256::MAX);
        assert_eq!(
            max.as_str(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
        assert_eq!(max.to_u256().unwrap(), U256::MAX);
    }

    #[test]
    fn test_amount_parse() {
        assert_eq!("000950".parse::<Amount>().unwrap().as_str(), "950");
        assert_eq!("0".parse::<Amount>().unwrap().as_str(), "0");
        assert_eq!("0000".parse::<Amount>().unwrap().as_str(), "0");
        assert!("".parse::<Amount>().is_err());
        assert!("-1".parse::<Amount>().is_err());
        assert!("1.5".parse::<Amount>().is_err());
        assert!("1e18".parse::<Amount>().is_err());
    }

    #[test]
    fn test_event_type_codes() {
        for kind in EventType::ALL {
            assert!(kind.as_str().len() <= 8);
            assert_eq!(kind.as_str().parse::<EventType>().unwrap(), kind);
        }
        assert!("Sync".parse::<EventType>().is_err());
    }

    #[test]
    fn test_pool_event_json_shape() {
        let event = PoolEvent {
            id: "0000000100-000001-a1b2c".to_string(),
            event_type: EventType::Transfer,
            to_address: Some("0xBB".to_string()),
            sender_address: Some("0xAA".to_string()),
            signer_address: Some("0x".to_string()),
            block_height: 100,
            index_in_block: 2,
            amount1: Some(Amount::from(U256::MAX)),
            amount2: None,
            amount_in1: None,
            amount_in2: None,
            timestamp: DateTime::from_timestamp_millis(1_687_505_127_666).unwrap(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Transfer");
        assert_eq!(json["blockHeight"], 100);
        assert_eq!(json["indexInBlock"], 2);
        assert_eq!(json["amountIn1"], serde_json::Value::Null);
        assert_eq!(json["amount1"], U256::MAX.to_string());

        let back: PoolEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
