//! Coin amounts: decimal strings to integer base units and back.

use crate::constants::{ACCOUNT_SIZE_BYTES, COIN_DECIMALS, STORAGE_BYTE_COST};
use crate::error::OperationError;

const UNIT: u64 = 10u64.pow(COIN_DECIMALS);

/// Parse a decimal coin amount ("1.5", "0.000000001", "42") into base units.
pub fn from_decimal_str(value: &str) -> Result<u64, OperationError> {
    let invalid = || OperationError::Config(format!("invalid coin amount '{value}'"));

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if (whole.is_empty() && fraction.is_empty())
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
        || fraction.len() > COIN_DECIMALS as usize
    {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let mut padded = fraction.to_string();
    padded.extend(std::iter::repeat('0').take(COIN_DECIMALS as usize - fraction.len()));
    let fraction: u64 = padded.parse().map_err(|_| invalid())?;

    whole
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(invalid)
}

/// Format base units as a decimal coin amount, trimming trailing zeros.
pub fn to_decimal_string(amount: u64) -> String {
    let whole = amount / UNIT;
    let fraction = amount % UNIT;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0width$}", width = COIN_DECIMALS as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Storage cost of `bytes` bytes, in base units.
pub fn storage_cost(bytes: u64) -> u64 {
    bytes.saturating_mul(STORAGE_BYTE_COST)
}

/// Cost of creating a contract with `bytecode_len` bytes of code.
pub fn smart_contract_cost(bytecode_len: u64) -> u64 {
    storage_cost(bytecode_len).saturating_add(storage_cost(ACCOUNT_SIZE_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amounts() {
        assert_eq!(from_decimal_str("1").unwrap(), 1_000_000_000);
        assert_eq!(from_decimal_str("1.5").unwrap(), 1_500_000_000);
        assert_eq!(from_decimal_str("0.000000001").unwrap(), 1);
        assert_eq!(from_decimal_str(".25").unwrap(), 250_000_000);
        assert!(from_decimal_str("0.0000000001").is_err());
        assert!(from_decimal_str("1.2.3").is_err());
        assert!(from_decimal_str("-1").is_err());
        assert!(from_decimal_str("").is_err());
        assert!(from_decimal_str("99999999999999999999").is_err());
    }

    #[test]
    fn format_amounts() {
        assert_eq!(to_decimal_string(1_500_000_000), "1.5");
        assert_eq!(to_decimal_string(1), "0.000000001");
        assert_eq!(to_decimal_string(7_000_000_000), "7");
        assert_eq!(to_decimal_string(0), "0");
    }

    #[test]
    fn storage_costs() {
        assert_eq!(storage_cost(10), 1_000_000);
        assert_eq!(smart_contract_cost(100), 10_000_000 + 1_000_000);
    }
}
