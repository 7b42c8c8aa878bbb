//! Common utility functions for won-denominated calculations.
//!
//! This module provides the rounding rules shared by every calculator:
//! whole-won rounding at output boundaries, the 10-won floor used on some
//! tax results, two-decimal percentages, and zero-safe ratios.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Largest money input any calculator accepts: 1,000 trillion won.
///
/// Annual totals, 600 months of interest and surcharged tax on amounts up to
/// this bound stay inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Rounds a value to the nearest whole won, half away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finance_core::calculations::common::round_won;
///
/// assert_eq!(round_won(dec!(1234.4)), dec!(1234));
/// assert_eq!(round_won(dec!(1234.5)), dec!(1235));
/// assert_eq!(round_won(dec!(-1234.5)), dec!(-1235)); // Away from zero
/// ```
pub fn round_won(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a value down to a multiple of 10 won.
///
/// Used where the tax office discards amounts below 10 won.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finance_core::calculations::common::floor_to_ten;
///
/// assert_eq!(floor_to_ten(dec!(22535009)), dec!(22535000));
/// assert_eq!(floor_to_ten(dec!(9.99)), dec!(0));
/// ```
pub fn floor_to_ten(value: Decimal) -> Decimal {
    (value / Decimal::TEN).floor() * Decimal::TEN
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Percentages reported to callers (DSR, LTV, effective tax rates) go
/// through this function.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finance_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finance_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100), dec!(200)), dec!(200));
/// assert_eq!(max(dec!(-100), dec!(-200)), dec!(-100));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Expresses `numerator / denominator` as a percentage rounded to two places.
///
/// Returns `None` when the denominator is zero or negative, so a ratio over
/// zero income never turns into a bogus number.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finance_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(1), dec!(3)), Some(dec!(33.33)));
/// assert_eq!(percent_of(dec!(1), dec!(0)), None);
/// ```
pub fn percent_of(
    numerator: Decimal,
    denominator: Decimal,
) -> Option<Decimal> {
    if denominator <= Decimal::ZERO {
        return None;
    }
    Some(round_half_up(numerator / denominator * Decimal::ONE_HUNDRED))
}
