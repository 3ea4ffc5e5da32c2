use num_bigint::BigUint;

use crate::error::LinkError;

/// Parse an arbitrary-precision unsigned integer from the wire's decimal or
/// `0x`-hex string form. Financial fields must never be truncated to a
/// machine word.
pub fn parse_big_uint(raw: &str) -> Result<BigUint, LinkError> {
    let trimmed = raw.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_digits) => (hex_digits, 16u32),
        None => (trimmed, 10u32),
    };
    if digits.is_empty() {
        return Err(LinkError::UnparseablePayload(
            "empty numeric field".to_string(),
        ));
    }
    BigUint::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| LinkError::UnparseablePayload(format!("invalid numeric field: {trimmed}")))
}

/// Decode a hex byte payload, tolerating an `0x` prefix.
pub fn parse_hex_bytes(raw: &str) -> Result<Vec<u8>, LinkError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits)
        .map_err(|err| LinkError::UnparseablePayload(format!("invalid hex field: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_and_hex_forms_agree() {
        let decimal = parse_big_uint("1000000000000000000").unwrap();
        let hex = parse_big_uint("0xde0b6b3a7640000").unwrap();
        assert_eq!(decimal, hex);
    }

    #[test]
    fn values_beyond_u64_parse() {
        let wei = parse_big_uint("340282366920938463463374607431768211456").unwrap();
        assert_eq!(
            wei.to_string(),
            "340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn malformed_numerics_are_errors() {
        for raw in ["", "  ", "12.5", "ten", "0x", "0xzz", "-4"] {
            assert!(parse_big_uint(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn hex_bytes_accept_optional_prefix() {
        assert_eq!(parse_hex_bytes("0xdeadbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(parse_hex_bytes("deadbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(parse_hex_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn odd_length_hex_is_an_error() {
        assert!(parse_hex_bytes("0xabc").is_err());
        assert!(parse_hex_bytes("xyz").is_err());
    }
}
