//! Product pricing.

use std::num::TryFromIntError;

/// Marketplace markup applied on top of the seller's base price, in percent.
pub const MARKUP_PERCENT: u128 = 10;

/// Derive the price buyers pay from the seller's base price.
///
/// Amounts are minor units; the markup is rounded half-up to the nearest minor unit.
///
/// # Errors
///
/// Returns an error when the marked-up price does not fit in a `u64`.
pub fn unit_price(base_price: u64) -> Result<u64, TryFromIntError> {
    let marked_up = u128::from(base_price) * (100 + MARKUP_PERCENT);

    u64::try_from((marked_up + 50) / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_ten_percent() {
        assert_eq!(unit_price(1000).ok(), Some(1100));
        assert_eq!(unit_price(0).ok(), Some(0));
    }

    #[test]
    fn rounds_half_up_to_the_minor_unit() {
        // 0.05 * 1.1 = 0.055
        assert_eq!(unit_price(5).ok(), Some(6));
        // 0.04 * 1.1 = 0.044
        assert_eq!(unit_price(4).ok(), Some(4));
        // 9.99 * 1.1 = 10.989
        assert_eq!(unit_price(999).ok(), Some(1099));
    }

    #[test]
    fn rejects_prices_that_overflow() {
        assert!(unit_price(u64::MAX).is_err());
    }
}
