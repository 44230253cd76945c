//! Primitive chain types shared by every layer: addresses, transaction
//! hashes, 256-bit quantities and ether unit helpers.

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use num::{ToPrimitive, Zero};
use num_bigint::BigUint;
use once_cell::sync::Lazy;

/// 256-bit unsigned quantity (wei amounts, token balances, token ids).
pub type U256 = BigUint;

/// Number of wei in one ether (10^18).
pub static WEI_PER_ETHER: Lazy<U256> = Lazy::new(|| BigUint::from(10u32).pow(18));

const ETHER_DECIMALS: usize = 18;

/* ------------------------------------------------------------------ */
/*  Address                                                           */
/* ------------------------------------------------------------------ */

/// A 20-byte account or contract address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        *self == Address::ZERO
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    /// Accepts 40 hex characters, with or without a `0x` prefix, in any case.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if cleaned.len() != 40 {
            bail!(
                "Invalid address length: expected 40 hex chars, got {}",
                cleaned.len()
            );
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(cleaned, &mut bytes)
            .map_err(|e| anyhow!("Invalid hex encoding in address {s}: {e}"))?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/* ------------------------------------------------------------------ */
/*  Transaction hash                                                  */
/* ------------------------------------------------------------------ */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl FromStr for TxHash {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let cleaned = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(cleaned, &mut bytes)
            .with_context(|| format!("Invalid transaction hash {s}"))?;
        Ok(TxHash(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/* ------------------------------------------------------------------ */
/*  Quantities                                                        */
/* ------------------------------------------------------------------ */

/// Parse a JSON-RPC hex quantity (`"0x1a"`, `"0x0"`).
pub fn parse_quantity(s: &str) -> Result<U256> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("quantity {s:?} is missing 0x prefix"))?;
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| anyhow!("quantity {s:?} is not valid hex"))
}

/// Encode a quantity the way JSON-RPC expects it: minimal hex, `0x0` for zero.
pub fn to_quantity(value: &U256) -> String {
    format!("0x{:x}", value)
}

pub fn quantity_to_u64(value: &U256) -> Result<u64> {
    value
        .to_u64()
        .ok_or_else(|| anyhow!("quantity {value} does not fit in u64"))
}

/* ------------------------------------------------------------------ */
/*  Ether units                                                       */
/* ------------------------------------------------------------------ */

/// Render a wei amount as a decimal ether string: `1.0`, `0.00001`, `12.5`.
/// At least one fractional digit is always kept.
pub fn format_ether(wei: &U256) -> String {
    let whole = wei / &*WEI_PER_ETHER;
    let frac = wei % &*WEI_PER_ETHER;
    let mut frac_str = format!("{:0>width$}", frac.to_string(), width = ETHER_DECIMALS);
    while frac_str.len() > 1 && frac_str.ends_with('0') {
        frac_str.pop();
    }
    format!("{whole}.{frac_str}")
}

/// Parse a decimal ether string (`"0.00001"`, `"2"`) into wei without going
/// through floating point.
pub fn parse_ether(value: &str) -> Result<U256> {
    let value = value.trim();
    if value.is_empty() {
        bail!("empty ether amount");
    }
    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if frac.len() > ETHER_DECIMALS {
        bail!("ether amount {value:?} has more than {ETHER_DECIMALS} decimals");
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) || (whole.is_empty() && frac.is_empty()) {
        bail!("invalid ether amount {value:?}");
    }

    let whole_wei = if whole.is_empty() {
        U256::zero()
    } else {
        whole.parse::<U256>()? * &*WEI_PER_ETHER
    };
    let frac_padded = format!("{frac:0<width$}", width = ETHER_DECIMALS);
    let frac_wei = frac_padded.parse::<U256>()?;
    Ok(whole_wei + frac_wei)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let addr: Address = "0xAbCdEf0123456789abcdef0123456789ABCDEF01".parse().unwrap();
        assert_eq!(addr.to_string(), "0xabcdef0123456789abcdef0123456789abcdef01");

        let no_prefix: Address = "abcdef0123456789abcdef0123456789abcdef01".parse().unwrap();
        assert_eq!(addr, no_prefix);
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzzzzzz0123456789abcdef0123456789abcdef01"
            .parse::<Address>()
            .is_err());
    }

    #[test]
    fn test_zero_address() {
        let zero: Address = "0x0000000000000000000000000000000000000000".parse().unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero, Address::ZERO);
    }

    #[test]
    fn test_quantity_round_trip() {
        assert_eq!(parse_quantity("0x0").unwrap(), U256::zero());
        assert_eq!(parse_quantity("0x5").unwrap(), U256::from(5u32));
        assert_eq!(to_quantity(&U256::zero()), "0x0");
        assert_eq!(to_quantity(&U256::from(255u32)), "0xff");
        assert!(parse_quantity("12").is_err());
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(&U256::zero()), "0.0");
        assert_eq!(format_ether(&WEI_PER_ETHER), "1.0");
        assert_eq!(format_ether(&U256::from(10_000_000_000_000u64)), "0.00001");
        assert_eq!(
            format_ether(&(U256::from(25u32) * &*WEI_PER_ETHER / U256::from(2u32))),
            "12.5"
        );
    }

    #[test]
    fn test_parse_ether() {
        assert_eq!(
            parse_ether("0.00001").unwrap(),
            U256::from(10_000_000_000_000u64)
        );
        assert_eq!(parse_ether("2").unwrap(), U256::from(2u32) * &*WEI_PER_ETHER);
        assert_eq!(parse_ether(".5").unwrap(), &*WEI_PER_ETHER / U256::from(2u32));
        assert!(parse_ether("").is_err());
        assert!(parse_ether("1.2.3").is_err());
        assert!(parse_ether("-1").is_err());
        assert!(parse_ether("0.0000000000000000001").is_err());
    }
}
