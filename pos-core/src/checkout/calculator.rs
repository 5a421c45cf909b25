//! Checkout Calculator
//!
//! Pure functions over `{price, quantity}` line items. No persistence, no
//! side effects; every function is total. The transactional orchestrator in
//! `orders::checkout` calls these with server-loaded state.

use serde::{Deserialize, Serialize};
use shared::error::{ErrorCode, PosError, PosResult};
use shared::money::Money;

use super::{CheckoutInput, CheckoutMode};

/// A priced line as the calculator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub price: Money,
    pub quantity: i32,
}

impl LineItem {
    pub fn new(price: Money, quantity: i32) -> Self {
        Self { price, quantity }
    }

    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity as i64)
    }
}

/// Result of a full total computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

/// AA split preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AaSplit {
    pub per_person: Money,
    pub total_people: i32,
    pub items: Vec<LineItem>,
}

pub fn calculate_subtotal(items: &[LineItem]) -> Money {
    items.iter().map(LineItem::line_total).sum()
}

/// Discount amount for a (clamped) percentage of the subtotal.
pub fn calculate_discount(subtotal: Money, pct: f64) -> Money {
    let pct = pct.clamp(0.0, 100.0);
    subtotal.percent(pct)
}

pub fn calculate_checkout_total(items: &[LineItem], pct: f64) -> CheckoutTotals {
    let subtotal = calculate_subtotal(items);
    let discount = calculate_discount(subtotal, pct);
    let total = (subtotal - discount).max(Money::ZERO);
    CheckoutTotals {
        subtotal,
        discount,
        total,
    }
}

/// Change due. A non-positive received amount means "exact", so no change.
pub fn calculate_change(total: Money, received: Money) -> Money {
    if received > Money::ZERO {
        (received - total).max(Money::ZERO)
    } else {
        Money::ZERO
    }
}

/// Even split of the discounted total across `people_count` payers.
/// Zero (or negative) people yields a zero share rather than an error.
pub fn calculate_aa_split(items: &[LineItem], people_count: i32, pct: f64) -> AaSplit {
    let totals = calculate_checkout_total(items, pct);
    let per_person = if people_count > 0 {
        totals.total.divide(people_count as f64)
    } else {
        Money::ZERO
    };
    AaSplit {
        per_person,
        total_people: people_count.max(0),
        items: items.to_vec(),
    }
}

/// What one AA payer owes for their selected lines (no discount applied).
pub fn calculate_aa_personal_total(items: &[LineItem]) -> Money {
    calculate_subtotal(items)
}

pub fn calculate_items_count(items: &[LineItem]) -> i32 {
    items.iter().map(|i| i.quantity).sum()
}

/// Structural validation of a checkout request. Business rules that need
/// persisted state (status, availability, totals) live in the orchestrator.
pub fn validate_checkout_input(input: &CheckoutInput) -> PosResult<()> {
    if input.table_id == 0 {
        return Err(PosError::validation(
            ErrorCode::InvalidAmount,
            "table id must be provided",
        ));
    }
    if input.order_id == 0 {
        return Err(PosError::validation(
            ErrorCode::InvalidAmount,
            "order id must be provided",
        ));
    }
    if !(0.0..=100.0).contains(&input.discount_percent) {
        return Err(PosError::validation(
            ErrorCode::InvalidDiscount,
            format!("discount percent {} out of range", input.discount_percent),
        ));
    }
    if let Some(received) = input.received
        && received.is_negative()
    {
        return Err(PosError::validation(
            ErrorCode::InvalidAmount,
            "received amount must not be negative",
        ));
    }
    if input.mode == CheckoutMode::Aa {
        if input.aa_items.is_empty() {
            return Err(PosError::validation(
                ErrorCode::EmptyAaSelection,
                "AA checkout requires at least one selected item",
            ));
        }
        if input.aa_items.iter().any(|s| s.quantity <= 0) {
            return Err(PosError::validation(
                ErrorCode::InvalidAmount,
                "AA selection quantities must be positive",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::AaSelection;

    fn item(price_major: f64, qty: i32) -> LineItem {
        LineItem::new(Money::from_major(price_major), qty)
    }

    fn base_input() -> CheckoutInput {
        CheckoutInput {
            table_id: 1,
            order_id: 1,
            mode: CheckoutMode::Full,
            payment_method: "Cash".into(),
            discount_percent: 0.0,
            client_subtotal: Money::from_cents(3500),
            client_total: Money::from_cents(3500),
            received: None,
            aa_items: Vec::new(),
        }
    }

    #[test]
    fn subtotal_without_discount() {
        // [{10 x 2}, {5 x 3}] at 0% -> 35 / 0 / 35
        let items = [item(10.0, 2), item(5.0, 3)];
        let totals = calculate_checkout_total(&items, 0.0);
        assert_eq!(totals.subtotal.cents(), 3500);
        assert_eq!(totals.discount.cents(), 0);
        assert_eq!(totals.total.cents(), 3500);
    }

    #[test]
    fn ten_percent_discount() {
        let items = [item(100.0, 1)];
        let totals = calculate_checkout_total(&items, 10.0);
        assert_eq!(totals.subtotal.cents(), 10_000);
        assert_eq!(totals.discount.cents(), 1_000);
        assert_eq!(totals.total.cents(), 9_000);
    }

    #[test]
    fn discount_percent_is_clamped() {
        let subtotal = Money::from_cents(1000);
        assert_eq!(calculate_discount(subtotal, -5.0).cents(), 0);
        assert_eq!(calculate_discount(subtotal, 150.0).cents(), 1000);
    }

    #[test]
    fn total_never_goes_negative() {
        let items = [item(1.0, 1)];
        let totals = calculate_checkout_total(&items, 100.0);
        assert_eq!(totals.total.cents(), 0);
    }

    #[test]
    fn change_for_exact_and_over_payment() {
        let total = Money::from_cents(1250);
        assert_eq!(calculate_change(total, Money::from_cents(2000)).cents(), 750);
        assert_eq!(calculate_change(total, Money::from_cents(1250)).cents(), 0);
        // under-payment is the orchestrator's problem, change clamps to 0
        assert_eq!(calculate_change(total, Money::from_cents(1000)).cents(), 0);
        // non-positive received means exact
        assert_eq!(calculate_change(total, Money::ZERO).cents(), 0);
    }

    #[test]
    fn aa_split_zero_people_is_zero_not_error() {
        let items = [item(10.0, 2)];
        let split = calculate_aa_split(&items, 0, 0.0);
        assert_eq!(split.per_person, Money::ZERO);
        assert_eq!(split.total_people, 0);
    }

    #[test]
    fn aa_split_divides_discounted_total() {
        let items = [item(30.0, 1)];
        let split = calculate_aa_split(&items, 3, 0.0);
        assert_eq!(split.per_person.cents(), 1000);

        // 10.00 across 3 people rounds half away from zero: 3.33
        let items = [item(10.0, 1)];
        let split = calculate_aa_split(&items, 3, 0.0);
        assert_eq!(split.per_person.cents(), 333);
    }

    #[test]
    fn items_count_sums_quantities() {
        let items = [item(10.0, 2), item(5.0, 3)];
        assert_eq!(calculate_items_count(&items), 5);
        assert_eq!(calculate_aa_personal_total(&items).cents(), 3500);
    }

    #[test]
    fn validate_rejects_bad_structure() {
        let mut input = base_input();
        input.table_id = 0;
        assert!(validate_checkout_input(&input).is_err());

        let mut input = base_input();
        input.discount_percent = 101.0;
        assert_eq!(
            validate_checkout_input(&input).unwrap_err().code(),
            ErrorCode::InvalidDiscount
        );

        let mut input = base_input();
        input.received = Some(Money::from_cents(-1));
        assert!(validate_checkout_input(&input).is_err());

        let mut input = base_input();
        input.mode = CheckoutMode::Aa;
        assert_eq!(
            validate_checkout_input(&input).unwrap_err().code(),
            ErrorCode::EmptyAaSelection
        );

        input.aa_items = vec![AaSelection {
            item_id: 7,
            quantity: 1,
        }];
        assert!(validate_checkout_input(&input).is_ok());
    }
}
