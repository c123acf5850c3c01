//! Checked fixed-point arithmetic
//!
//! Amounts are plain `u128` integers. "WAD" values carry 18 implied decimals,
//! so `1.0 == WAD`. Every helper is checked and reports overflow instead of
//! wrapping.

use crate::errors::LedgerError;

/// 1.0 in 18-decimal fixed point
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// `a * b`
pub fn checked_mul(a: u128, b: u128, operation: &str) -> Result<u128, LedgerError> {
    a.checked_mul(b).ok_or_else(|| LedgerError::overflow(operation))
}

/// `a + b`
pub fn checked_add(a: u128, b: u128, operation: &str) -> Result<u128, LedgerError> {
    a.checked_add(b).ok_or_else(|| LedgerError::overflow(operation))
}

/// `floor(a * b / d)`
pub fn mul_div_down(a: u128, b: u128, d: u128, operation: &str) -> Result<u128, LedgerError> {
    if d == 0 {
        return Err(LedgerError::division_by_zero(operation));
    }
    Ok(checked_mul(a, b, operation)? / d)
}

/// `ceil(a * b / d)`
pub fn mul_div_up(a: u128, b: u128, d: u128, operation: &str) -> Result<u128, LedgerError> {
    if d == 0 {
        return Err(LedgerError::division_by_zero(operation));
    }
    let product = checked_mul(a, b, operation)?;
    Ok(product.div_ceil(d))
}

/// `ceil(x * WAD / y)`
pub fn div_wad_up(x: u128, y: u128, operation: &str) -> Result<u128, LedgerError> {
    mul_div_up(x, WAD, y, operation)
}

/// `floor(a * b / WAD)`, exact without forming `a * b` when `a` is large
pub fn mul_wad_down(a: u128, b: u128, operation: &str) -> Result<u128, LedgerError> {
    let whole = checked_mul(a / WAD, b, operation)?;
    let fraction = checked_mul(a % WAD, b, operation)? / WAD;
    checked_add(whole, fraction, operation)
}

/// `x ^ n` for a WAD base and integer exponent, by repeated squaring.
///
/// Each multiplication rounds down by less than one unit in the last place,
/// so the result underestimates the exact power by at most
/// `2 * ceil(log2(n + 1))` units of `1e-18`. Bases at or below one WAD cannot
/// overflow.
pub fn pow_wad(x: u128, mut n: u64) -> Result<u128, LedgerError> {
    let mut result = WAD;
    let mut base = x;
    while n > 0 {
        if n & 1 == 1 {
            result = mul_wad_down(result, base, "pow_wad")?;
        }
        n >>= 1;
        if n > 0 {
            base = mul_wad_down(base, base, "pow_wad")?;
        }
        if result == 0 || base == 0 {
            return Ok(if n == 0 { result } else { 0 });
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_rounding() {
        assert_eq!(mul_div_down(7, 3, 2, "t").unwrap(), 10);
        assert_eq!(mul_div_up(7, 3, 2, "t").unwrap(), 11);
        assert_eq!(mul_div_up(6, 2, 3, "t").unwrap(), 4);
        assert!(mul_div_up(1, 1, 0, "t").is_err());
        assert!(mul_div_down(u128::MAX, 2, 1, "t").is_err());
    }

    #[test]
    fn mul_wad_down_handles_large_operands() {
        let thousand_ether = 1_000 * WAD;
        assert_eq!(mul_wad_down(thousand_ether, WAD, "t").unwrap(), thousand_ether);
        assert_eq!(
            mul_wad_down(thousand_ether, WAD / 2, "t").unwrap(),
            500 * WAD
        );
    }

    #[test]
    fn pow_wad_matches_known_values() {
        let nine_tenths = 9 * WAD / 10;
        assert_eq!(pow_wad(nine_tenths, 0).unwrap(), WAD);
        assert_eq!(pow_wad(nine_tenths, 1).unwrap(), nine_tenths);
        assert_eq!(pow_wad(nine_tenths, 2).unwrap(), 81 * WAD / 100);
        // 0.9^10 = 0.3486784401
        let tenth = pow_wad(nine_tenths, 10).unwrap();
        let exact = 348_678_440_100_000_000u128;
        assert!(exact - tenth <= 8, "error {} too large", exact - tenth);
    }

    #[test]
    fn pow_wad_decays_to_zero() {
        assert_eq!(pow_wad(9 * WAD / 10, 100_000).unwrap(), 0);
        assert_eq!(pow_wad(0, 3).unwrap(), 0);
    }
}
