//! Payment classification and reconciliation views
//!
//! Pure view builders over persisted closure lines and adjustments.

use serde::Serialize;
use shared::models::{ClosureAdjustment, ClosureItemLine, ClosurePaymentLine, PaymentGroup};
use shared::money::Money;

/// Keyword rules, checked in priority order; first match wins.
/// Substring, case-insensitive — "Tarjeta Visa" is CARD, "Efectivo" is CASH.
const GROUP_RULES: &[(PaymentGroup, &[&str])] = &[
    (PaymentGroup::Cash, &["cash", "efectivo", "contado"]),
    (
        PaymentGroup::Platform,
        &["glovo", "uber", "just eat", "justeat", "deliveroo", "didi"],
    ),
    (
        PaymentGroup::Card,
        &[
            "card",
            "tarjeta",
            "visa",
            "mastercard",
            "amex",
            "wallet",
            "bizum",
            "paypal",
            "apple",
            "google",
        ],
    ),
];

/// Classify a free-form payment method name into its reconciliation group.
pub fn classify_payment_method(method: &str) -> PaymentGroup {
    let lower = method.to_lowercase();
    for (group, keywords) in GROUP_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *group;
        }
    }
    PaymentGroup::Other
}

/// One payment line with its adjustment delta applied.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentLineView {
    pub payment_method: String,
    pub payment_group: PaymentGroup,
    pub expected: Money,
    pub adjustments: Money,
    pub actual: Money,
    pub tx_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosurePaymentsView {
    /// Sorted descending by expected amount
    pub lines: Vec<PaymentLineView>,
    pub expected_total: Money,
    pub actual_total: Money,
    pub difference: Money,
    /// Adjustments with no payment-method scope; counted in the totals only
    pub unassigned_adjustments: Money,
    pub cash_total: Money,
    pub non_cash_total: Money,
}

/// Reconcile payment lines against appended adjustments.
pub fn build_daily_closure_payments(
    lines: &[ClosurePaymentLine],
    adjustments: &[ClosureAdjustment],
) -> ClosurePaymentsView {
    let mut views: Vec<PaymentLineView> = lines
        .iter()
        .map(|line| {
            let scoped: Money = adjustments
                .iter()
                .filter(|a| a.payment_method.as_deref() == Some(line.payment_method.as_str()))
                .map(ClosureAdjustment::amount)
                .sum();
            PaymentLineView {
                payment_method: line.payment_method.clone(),
                payment_group: line.payment_group,
                expected: line.expected(),
                adjustments: scoped,
                actual: line.expected() + scoped,
                tx_count: line.tx_count,
            }
        })
        .collect();
    views.sort_by(|a, b| b.expected.cmp(&a.expected));

    let expected_total: Money = views.iter().map(|v| v.expected).sum();
    let all_adjustments: Money = adjustments.iter().map(ClosureAdjustment::amount).sum();
    let unassigned: Money = adjustments
        .iter()
        .filter(|a| a.payment_method.is_none())
        .map(ClosureAdjustment::amount)
        .sum();
    let actual_total = expected_total + all_adjustments;

    let cash_total: Money = views
        .iter()
        .filter(|v| v.payment_group.is_cash())
        .map(|v| v.actual)
        .sum();
    let non_cash_total: Money = views
        .iter()
        .filter(|v| !v.payment_group.is_cash())
        .map(|v| v.actual)
        .sum();

    ClosurePaymentsView {
        lines: views,
        expected_total,
        actual_total,
        difference: actual_total - expected_total,
        unassigned_adjustments: unassigned,
        cash_total,
        non_cash_total,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosureItemsView {
    /// Distinct categories, sorted lexicographically
    pub categories: Vec<String>,
    /// Sorted descending by revenue
    pub items: Vec<ClosureItemLine>,
}

pub fn build_daily_closure_items(lines: &[ClosureItemLine]) -> ClosureItemsView {
    let mut categories: Vec<String> = lines.iter().map(|l| l.category.clone()).collect();
    categories.sort();
    categories.dedup();

    let mut items = lines.to_vec();
    items.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));

    ClosureItemsView { categories, items }
}
