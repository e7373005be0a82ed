//! Cent-based money arithmetic.
//!
//! Amounts are persisted as `i64` cents and exposed as two-place decimals.

use rust_decimal::prelude::*;
use thiserror::Error;

const DECIMAL_PLACES: u32 = 2;

/// Largest amount accepted from a request: 10 billion in whole units.
pub const MAX_CENTS: i64 = 1_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("allows at most two decimals")]
    TooPrecise,
    #[error("is out of range")]
    OutOfRange,
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

fn hundredths(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount.normalize().scale() > DECIMAL_PLACES {
        return Err(AmountError::TooPrecise);
    }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(AmountError::OutOfRange)
}

/// Exact conversion, bounded by [`MAX_CENTS`] in either direction.
pub fn to_cents(amount: Decimal) -> Result<i64, AmountError> {
    hundredths(amount)?
        .to_i64()
        .filter(|cents| cents.abs() <= MAX_CENTS)
        .ok_or(AmountError::OutOfRange)
}

/// Tip percentage stored in hundredths of a percent (12.5% = 1250).
pub fn to_basis_points(percentage: Decimal) -> Result<i32, AmountError> {
    hundredths(percentage)?
        .to_i32()
        .ok_or(AmountError::OutOfRange)
}

pub fn from_basis_points(basis_points: i32) -> Decimal {
    Decimal::new(i64::from(basis_points), DECIMAL_PLACES)
}

/// `None` when the product does not fit in an `i64`.
pub fn line_total(unit_price: i64, quantity: i32) -> Option<i64> {
    unit_price.checked_mul(i64::from(quantity))
}

/// Figures produced when a bill is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub tip_amount: i64,
    pub total_with_tip: i64,
    pub change: i64,
}

/// `total × pct / 100`, rounded half away from zero to whole cents.
pub fn tip_amount(total: i64, tip_percentage: Decimal) -> i64 {
    let tip = from_cents(total)
        .checked_mul(tip_percentage)
        .and_then(|tip| tip.checked_div(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX);
    let rounded = tip.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .unwrap_or(i64::MAX)
}

/// Returns the settlement, or the amount still owed when `paid` falls short.
///
/// The payment is compared against the cent-rounded total with tip, which is the
/// figure printed on the bill. A tip that rounds down to zero cents is not owed.
pub fn settle(total: i64, tip_percentage: Decimal, paid: i64) -> Result<Settlement, i64> {
    let tip_amount = tip_amount(total, tip_percentage);
    let total_with_tip = total.saturating_add(tip_amount);
    if paid < total_with_tip {
        return Err(total_with_tip);
    }
    Ok(Settlement {
        tip_amount,
        total_with_tip,
        change: paid - total_with_tip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cents_conversion() {
        assert_eq!(to_cents(dec!(115)), Ok(11500));
        assert_eq!(to_cents(dec!(0.5)), Ok(50));
        assert_eq!(to_cents(dec!(253.00)), Ok(25300));
        assert_eq!(to_cents(dec!(1.005)), Err(AmountError::TooPrecise));
        assert_eq!(from_cents(23000).to_string(), "230.00");
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert_eq!(to_cents(dec!(10.2500)), Ok(1025));
        assert_eq!(to_basis_points(dec!(12.500)), Ok(1250));
        assert_eq!(to_basis_points(dec!(12.345)), Err(AmountError::TooPrecise));
    }

    #[test]
    fn huge_amounts_are_out_of_range() {
        assert_eq!(to_cents(Decimal::MAX), Err(AmountError::OutOfRange));
        assert_eq!(to_cents(Decimal::MIN), Err(AmountError::OutOfRange));
        assert_eq!(to_cents(from_cents(MAX_CENTS)), Ok(MAX_CENTS));
        assert_eq!(to_cents(from_cents(MAX_CENTS + 1)), Err(AmountError::OutOfRange));
        assert_eq!(to_basis_points(Decimal::MAX), Err(AmountError::OutOfRange));
    }

    #[test]
    fn line_total_detects_overflow() {
        assert_eq!(line_total(11500, 3), Some(34500));
        assert_eq!(line_total(i64::MAX, 2), None);
    }

    #[test]
    fn guacamole_for_two_with_ten_percent() {
        let total = line_total(11500, 2).unwrap();
        assert_eq!(total, 23000);

        let settlement = settle(total, dec!(10), 30000).unwrap();
        assert_eq!(settlement.tip_amount, 2300);
        assert_eq!(settlement.total_with_tip, 25300);
        assert_eq!(settlement.change, 4700);
    }

    #[test]
    fn exact_payment_leaves_no_change() {
        let settlement = settle(25000, dec!(15), 28750).unwrap();
        assert_eq!(settlement.change, 0);
    }

    #[test]
    fn one_cent_short_is_rejected() {
        assert_eq!(settle(25000, dec!(15), 28749), Err(28750));
        assert_eq!(settle(25000, dec!(0), 24999), Err(25000));
    }

    #[test]
    fn tip_rounds_half_away_from_zero() {
        // 0.05 * 10% = 0.005 -> 0.01
        assert_eq!(tip_amount(5, dec!(10)), 1);
        // 0.04 * 10% = 0.004 -> 0.00
        assert_eq!(tip_amount(4, dec!(10)), 0);
        assert_eq!(tip_amount(10000, dec!(100)), 10000);
    }

    #[test]
    fn payment_is_checked_against_the_rounded_total() {
        // 0.04 at 10%: the 0.004 tip rounds to nothing, so 0.04 settles the bill.
        let settlement = settle(4, dec!(10), 4).unwrap();
        assert_eq!(settlement.tip_amount, 0);
        assert_eq!(settlement.change, 0);
        // 0.05 at 10%: the tip rounds up to a cent, so 0.05 is short.
        assert_eq!(settle(5, dec!(10), 5), Err(6));
    }
}
