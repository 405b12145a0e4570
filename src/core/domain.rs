//! Policy records as read from the insurance contract and the JSON document
//! served to callers.

use ethers::abi::Token;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::core::errors::PolicyApiError;
use crate::core::format::{convert_timestamp_to_date, scale_balance, timestamp_from_u256};
use crate::core::validation::checksummed;

/// Number of leading struct fields the service understands.
pub const POLICY_FIELD_COUNT: usize = 9;

/// Policy struct exactly as returned by `ViewPolicyByPlate`, before any
/// formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPolicy {
    pub id: U256,
    pub owner: Address,
    pub guarantee_amount: U256,
    pub start_date: U256,
    pub end_date: U256,
    pub payment_amount: U256,
    pub car_engine_volume: U256,
    pub car_age: U256,
    pub is_valid: bool,
}

impl RawPolicy {
    /// Decodes the positional struct fields. Trailing fields past the ninth
    /// are ignored.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, PolicyApiError> {
        if tokens.len() < POLICY_FIELD_COUNT {
            return Err(PolicyApiError::InvalidPolicyData(format!(
                "policy struct has {} fields, expected at least {}",
                tokens.len(),
                POLICY_FIELD_COUNT
            )));
        }

        let mut it = tokens.into_iter();
        let mut next = || it.next().ok_or_else(|| PolicyApiError::Internal("token underflow".into()));

        Ok(Self {
            id: uint(next()?, "id")?,
            owner: address(next()?, "owner")?,
            guarantee_amount: uint(next()?, "guaranteeAmount")?,
            start_date: uint(next()?, "startDate")?,
            end_date: uint(next()?, "endDate")?,
            payment_amount: uint(next()?, "paymentAmount")?,
            car_engine_volume: uint(next()?, "carEngineVolume")?,
            car_age: uint(next()?, "carAge")?,
            is_valid: boolean(next()?, "isValid")?,
        })
    }

    /// Unwraps the single tuple token a struct-returning function decodes to.
    pub fn from_token(token: Token) -> Result<Self, PolicyApiError> {
        match token {
            Token::Tuple(fields) => Self::from_tokens(fields),
            other => Err(PolicyApiError::InvalidPolicyData(format!(
                "expected a policy tuple, got {:?}",
                other
            ))),
        }
    }
}

fn uint(token: Token, field: &str) -> Result<U256, PolicyApiError> {
    match token {
        Token::Uint(v) => Ok(v),
        Token::Int(v) => Ok(v),
        other => Err(type_mismatch(field, "uint", &other)),
    }
}

fn address(token: Token, field: &str) -> Result<Address, PolicyApiError> {
    token.into_address().ok_or_else(|| {
        PolicyApiError::InvalidPolicyData(format!("field '{}' is not an address", field))
    })
}

fn boolean(token: Token, field: &str) -> Result<bool, PolicyApiError> {
    match token {
        Token::Bool(b) => Ok(b),
        other => Err(type_mismatch(field, "bool", &other)),
    }
}

fn type_mismatch(field: &str, expected: &str, got: &Token) -> PolicyApiError {
    PolicyApiError::InvalidPolicyData(format!("field '{}' should be {}, got {:?}", field, expected, got))
}

fn narrow_u64(value: U256, field: &str) -> Result<u64, PolicyApiError> {
    u64::try_from(value).map_err(|_| {
        PolicyApiError::InvalidPolicyData(format!("{} {} does not fit in 64 bits", field, value))
    })
}

fn narrow_u128(value: U256, field: &str) -> Result<u128, PolicyApiError> {
    u128::try_from(value).map_err(|_| {
        PolicyApiError::InvalidPolicyData(format!("{} {} does not fit in 128 bits", field, value))
    })
}

/// Token balance of the calling account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalance {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenBalance {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn formatted(&self) -> Result<f64, PolicyApiError> {
        scale_balance(self.raw, self.decimals)
    }
}

/// Response body of `GET /policy_and_balance`. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAndBalance {
    #[serde(rename = "policyID")]
    pub policy_id: u64,
    #[serde(rename = "policyOwner")]
    pub policy_owner: String,
    #[serde(rename = "policyGuaranteeAmount")]
    pub policy_guarantee_amount: u128,
    #[serde(rename = "policyStartDate")]
    pub policy_start_date: String,
    #[serde(rename = "policyEndDate")]
    pub policy_end_date: String,
    #[serde(rename = "policyPaymentAmount")]
    pub policy_payment_amount: u128,
    #[serde(rename = "carEngineVolume")]
    pub car_engine_volume: u64,
    #[serde(rename = "carAge")]
    pub car_age: u64,
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(rename = "carLicensePlate")]
    pub car_license_plate: String,
    #[serde(rename = "userBalance")]
    pub user_balance: f64,
}

/// Wire names of [`PolicyAndBalance`], in order.
pub const RESPONSE_FIELDS: [&str; 11] = [
    "policyID",
    "policyOwner",
    "policyGuaranteeAmount",
    "policyStartDate",
    "policyEndDate",
    "policyPaymentAmount",
    "carEngineVolume",
    "carAge",
    "isValid",
    "carLicensePlate",
    "userBalance",
];

impl PolicyAndBalance {
    /// Builds the response document, formatting dates in the local timezone.
    pub fn build(
        policy: &RawPolicy,
        plate: &str,
        balance: TokenBalance,
    ) -> Result<Self, PolicyApiError> {
        Self::build_with(policy, plate, balance, convert_timestamp_to_date)
    }

    /// Same as [`PolicyAndBalance::build`] with a caller-supplied date formatter.
    pub fn build_with<F>(
        policy: &RawPolicy,
        plate: &str,
        balance: TokenBalance,
        format_date: F,
    ) -> Result<Self, PolicyApiError>
    where
        F: Fn(i64) -> Result<String, PolicyApiError>,
    {
        let start = timestamp_from_u256(policy.start_date, "startDate")?;
        let end = timestamp_from_u256(policy.end_date, "endDate")?;

        Ok(Self {
            policy_id: narrow_u64(policy.id, "id")?,
            policy_owner: checksummed(&policy.owner),
            policy_guarantee_amount: narrow_u128(policy.guarantee_amount, "guaranteeAmount")?,
            policy_start_date: format_date(start)?,
            policy_end_date: format_date(end)?,
            policy_payment_amount: narrow_u128(policy.payment_amount, "paymentAmount")?,
            car_engine_volume: narrow_u64(policy.car_engine_volume, "carEngineVolume")?,
            car_age: narrow_u64(policy.car_age, "carAge")?,
            is_valid: policy.is_valid,
            car_license_plate: plate.to_string(),
            user_balance: balance.formatted()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::format_timestamp_in;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn owner() -> Address {
        Address::from_str("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap()
    }

    fn policy_tokens() -> Vec<Token> {
        vec![
            Token::Uint(U256::from(7u64)),
            Token::Address(owner()),
            Token::Uint(U256::from(5_000u64) * U256::exp10(18)),
            Token::Uint(U256::from(1_700_000_000u64)),
            Token::Uint(U256::from(1_731_536_000u64)),
            Token::Uint(U256::from(250u64) * U256::exp10(18)),
            Token::Uint(U256::from(1600u64)),
            Token::Uint(U256::from(4u64)),
            Token::Bool(true),
        ]
    }

    #[test]
    fn decodes_positional_fields() {
        let policy = RawPolicy::from_tokens(policy_tokens()).unwrap();
        assert_eq!(policy.id, U256::from(7u64));
        assert_eq!(policy.owner, owner());
        assert_eq!(policy.car_engine_volume, U256::from(1600u64));
        assert!(policy.is_valid);
    }

    #[test]
    fn ignores_trailing_fields() {
        let mut tokens = policy_tokens();
        tokens.push(Token::String("34ABC123".into()));
        let policy = RawPolicy::from_token(Token::Tuple(tokens)).unwrap();
        assert_eq!(policy.car_age, U256::from(4u64));
    }

    #[test]
    fn rejects_short_struct() {
        let mut tokens = policy_tokens();
        tokens.truncate(8);
        let err = RawPolicy::from_tokens(tokens).unwrap_err();
        assert!(err.to_string().contains("8 fields"));
    }

    #[test]
    fn rejects_wrong_field_type() {
        let mut tokens = policy_tokens();
        tokens[8] = Token::Uint(U256::one());
        let err = RawPolicy::from_tokens(tokens).unwrap_err();
        assert!(err.to_string().contains("isValid"));
    }

    #[test]
    fn zeroed_struct_builds_zero_document() {
        let tokens = vec![
            Token::Uint(U256::zero()),
            Token::Address(Address::zero()),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Bool(false),
        ];
        let policy = RawPolicy::from_tokens(tokens).unwrap();
        let doc = PolicyAndBalance::build_with(&policy, "NOPE", TokenBalance::new(U256::zero(), 18), |ts| {
            format_timestamp_in(ts, &Utc)
        })
        .unwrap();

        assert_eq!(doc.policy_id, 0);
        assert_eq!(doc.policy_owner, "0x0000000000000000000000000000000000000000");
        assert_eq!(doc.policy_start_date, "1970-01-01 00:00:00");
        assert_eq!(doc.policy_end_date, "1970-01-01 00:00:00");
        assert_eq!(doc.policy_payment_amount, 0);
        assert_eq!(doc.car_engine_volume, 0);
        assert!(!doc.is_valid);
        assert_eq!(doc.user_balance, 0.0);
    }

    #[test]
    fn builds_response_in_field_order() {
        let policy = RawPolicy::from_tokens(policy_tokens()).unwrap();
        let balance = TokenBalance::new(U256::exp10(18), 18);
        let doc = PolicyAndBalance::build_with(&policy, "34ABC123", balance, |ts| {
            format_timestamp_in(ts, &Utc)
        })
        .unwrap();

        assert_eq!(doc.policy_id, 7);
        assert_eq!(doc.policy_owner, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(doc.policy_guarantee_amount, 5_000_000_000_000_000_000_000);
        assert_eq!(doc.policy_start_date, "2023-11-14 22:13:20");
        assert_eq!(doc.user_balance, 1.0);

        let value = serde_json::to_value(&doc).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        // serde_json's default map is sorted, so compare as sets here and
        // check raw order on the serialized string.
        assert_eq!(keys.len(), RESPONSE_FIELDS.len());
        let text = serde_json::to_string(&doc).unwrap();
        let mut last = 0;
        for field in RESPONSE_FIELDS {
            let pos = text.find(&format!("\"{}\"", field)).unwrap();
            assert!(pos >= last, "{} out of order", field);
            last = pos;
        }
    }

    #[test]
    fn oversized_amount_is_rejected() {
        let mut policy = RawPolicy::from_tokens(policy_tokens()).unwrap();
        policy.guarantee_amount = U256::MAX;
        let err =
            PolicyAndBalance::build(&policy, "X", TokenBalance::new(U256::zero(), 18)).unwrap_err();
        assert!(matches!(err, PolicyApiError::InvalidPolicyData(_)));
    }
}
