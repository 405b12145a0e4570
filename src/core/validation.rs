use ethers::types::Address;
use ethers::utils::to_checksum;

use crate::core::errors::PolicyApiError;

/// Parses a 20-byte account address given as 40 hex digits, with or without a
/// `0x` prefix and in any casing.
///
/// Mixed-case input is not checked against its EIP-55 checksum: the input is
/// normalized, not verified.
pub fn normalize_address(input: &str) -> Result<Address, PolicyApiError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if body.len() != 40 {
        return Err(PolicyApiError::InvalidAddress(format!(
            "'{}' is not a 20-byte hex address (expected 40 hex digits, got {})",
            input,
            body.len()
        )));
    }

    let bytes = hex::decode(body).map_err(|e| {
        PolicyApiError::InvalidAddress(format!("'{}' contains non-hex characters: {}", input, e))
    })?;

    Ok(Address::from_slice(&bytes))
}

/// Renders an address in EIP-55 checksummed form.
pub fn checksummed(address: &Address) -> String {
    to_checksum(address, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn to_checksum_address(input: &str) -> Result<String, PolicyApiError> {
        normalize_address(input).map(|a| checksummed(&a))
    }

    #[test_case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed" ; "all lowercase")]
    #[test_case("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED" ; "all uppercase")]
    #[test_case("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed" ; "no prefix")]
    #[test_case("0X5aaeb6053f3e94c9b9a09f33669435e7ef1beaed" ; "uppercase prefix")]
    #[test_case("  0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed \n" ; "surrounding whitespace")]
    fn normalizes_to_checksum(input: &str) {
        assert_eq!(to_checksum_address(input).unwrap(), CHECKSUMMED);
    }

    #[test_case("not-an-address" ; "garbage")]
    #[test_case("" ; "empty")]
    #[test_case("0x" ; "prefix only")]
    #[test_case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea" ; "too short")]
    #[test_case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed00" ; "too long")]
    #[test_case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beazz" ; "non hex")]
    fn rejects_malformed(input: &str) {
        let err = normalize_address(input).unwrap_err();
        assert!(matches!(err, PolicyApiError::InvalidAddress(_)), "unexpected: {err:?}");
    }

    #[test]
    fn zero_address_is_syntactically_valid() {
        let addr = normalize_address("0x0000000000000000000000000000000000000000").unwrap();
        assert!(addr.is_zero());
    }
}
