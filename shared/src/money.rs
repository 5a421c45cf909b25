//! Fixed-point money type
//!
//! All monetary values are an integer count of minor units (cents).
//! Floating-point values only appear at the API boundary (client-submitted
//! totals, discount percentages) and are converted through `Decimal` with
//! half-away-from-zero rounding, the standard currency strategy.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Comparison tolerance for client/server total reconciliation (one cent)
pub const MONEY_EPSILON_CENTS: i64 = 1;

/// Monetary value in integer cents. Signed: refunds and adjustments may be
/// negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

/// Convert an f64 boundary value to `Decimal`, defaulting non-finite input
/// to zero rather than propagating NaN into financial math.
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round a decimal cent amount to an integer, half away from zero.
#[inline]
fn round_cents(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

impl Money {
    pub const ZERO: Money = Money(0);

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Build from a major-unit amount (e.g. euros), rounding to the nearest
    /// cent with ties away from zero: `from_major(10.995)` is 1100 cents.
    pub fn from_major(major: f64) -> Self {
        Money(round_cents(to_decimal(major) * Decimal::ONE_HUNDRED))
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Major-unit value rounded to 2 decimal places, for API payloads.
    pub fn to_major(&self) -> f64 {
        (Decimal::from(self.0) / Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiply by an integer quantity (exact).
    #[inline]
    pub const fn times(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiply by an arbitrary factor, rounding half away from zero.
    pub fn multiply(&self, factor: f64) -> Self {
        Money(round_cents(Decimal::from(self.0) * to_decimal(factor)))
    }

    /// Divide by a divisor, rounding half away from zero.
    ///
    /// Division by zero (or a non-finite divisor) yields zero. Callers rely
    /// on this: AA splits with zero people and per-order averages with zero
    /// orders must not fail.
    pub fn divide(&self, divisor: f64) -> Self {
        let d = to_decimal(divisor);
        if d.is_zero() {
            return Money::ZERO;
        }
        Money(round_cents(Decimal::from(self.0) / d))
    }

    /// Percentage of this amount (`percent(10.0)` is 10%), rounded half away
    /// from zero.
    pub fn percent(&self, pct: f64) -> Self {
        Money(round_cents(
            Decimal::from(self.0) * to_decimal(pct) / Decimal::ONE_HUNDRED,
        ))
    }

    /// True when the two amounts differ by at most [`MONEY_EPSILON_CENTS`].
    #[inline]
    pub const fn approx_eq(&self, other: Money) -> bool {
        (self.0 - other.0).abs() <= MONEY_EPSILON_CENTS
    }
}

impl Add for Money {
    type Output = Money;
    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;
    #[inline]
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

/// Renders as `€<major>.<minor>` with the sign between `€` and digits:
/// `€12.34`, `€-12.34`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "€{}{}.{:02}", sign, self.0.abs() / 100, self.0.abs() % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_major_rounds_half_away_from_zero() {
        assert_eq!(Money::from_major(10.995).cents(), 1100);
        assert_eq!(Money::from_major(10.994).cents(), 1099);
        assert_eq!(Money::from_major(-10.995).cents(), -1100);
        assert_eq!(Money::from_major(0.005).cents(), 1);
    }

    #[test]
    fn from_major_survives_float_noise() {
        // 0.1 + 0.2 style drift must not leak into cents
        assert_eq!(Money::from_major(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_major(19.99).cents(), 1999);
    }

    #[test]
    fn arithmetic_is_exact() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(333);
        assert_eq!((a + b).cents(), 1333);
        assert_eq!((a - b).cents(), 667);
        assert_eq!(a.times(3).cents(), 3000);
        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1666);
    }

    #[test]
    fn multiply_rounds() {
        assert_eq!(Money::from_cents(1000).multiply(0.335).cents(), 335);
        assert_eq!(Money::from_cents(333).multiply(0.5).cents(), 167); // 166.5 → 167
    }

    #[test]
    fn divide_by_zero_yields_zero() {
        assert_eq!(Money::from_major(10.0).divide(0.0).cents(), 0);
        assert_eq!(Money::from_cents(1000).divide(f64::NAN).cents(), 0);
        assert_eq!(Money::from_cents(1000).divide(3.0).cents(), 333);
        assert_eq!(Money::from_cents(1000).divide(4.0).cents(), 250);
    }

    #[test]
    fn percent_rounds_half_away() {
        assert_eq!(Money::from_cents(10000).percent(10.0).cents(), 1000);
        assert_eq!(Money::from_cents(999).percent(50.0).cents(), 500); // 499.5 → 500
        assert_eq!(Money::from_cents(10000).percent(0.0).cents(), 0);
    }

    #[test]
    fn display_preserves_sign() {
        assert_eq!(Money::from_cents(1234).to_string(), "€12.34");
        assert_eq!(Money::from_cents(-1234).to_string(), "€-12.34");
        assert_eq!(Money::ZERO.to_string(), "€0.00");
        assert_eq!(Money::from_cents(-5).to_string(), "€-0.05");
    }

    #[test]
    fn approx_eq_one_cent_tolerance() {
        let a = Money::from_cents(1000);
        assert!(a.approx_eq(Money::from_cents(1001)));
        assert!(a.approx_eq(Money::from_cents(999)));
        assert!(!a.approx_eq(Money::from_cents(1002)));
    }

    #[test]
    fn to_major_round_trip() {
        assert_eq!(Money::from_cents(1099).to_major(), 10.99);
        assert_eq!(Money::from_major(10.99).to_major(), 10.99);
    }

    #[test]
    fn serializes_as_bare_cents() {
        let m = Money::from_cents(1234);
        assert_eq!(serde_json::to_string(&m).unwrap(), "1234");
        let back: Money = serde_json::from_str("-50").unwrap();
        assert_eq!(back.cents(), -50);
    }
}
