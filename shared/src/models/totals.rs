//! Document totals

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LineItem;

/// Derived figures for a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of line net amounts
    pub items_subtotal: Decimal,
    /// Sum of packaging quantities
    pub total_qty: Decimal,
    /// Quantity per uppercased unit label, e.g. "BOX" -> 3
    pub unit_breakdown: BTreeMap<String, Decimal>,
    pub overall_discount: Decimal,
    /// Subtotal less overall discount; may be negative
    pub net_total: Decimal,
}

/// Fold line items into document totals. Sums saturate at the `Decimal`
/// bounds.
pub fn calculate_totals(items: &[LineItem], overall_discount: Decimal) -> Totals {
    let mut totals = items.iter().fold(Totals::default(), |mut acc, item| {
        acc.items_subtotal = acc.items_subtotal.saturating_add(item.net_amount());
        acc.total_qty = acc.total_qty.saturating_add(item.quantity);
        let unit_qty = acc
            .unit_breakdown
            .entry(item.unit.trim().to_uppercase())
            .or_insert(Decimal::ZERO);
        *unit_qty = unit_qty.saturating_add(item.quantity);
        acc
    });

    totals.overall_discount = overall_discount;
    totals.net_total = totals.items_subtotal.saturating_sub(overall_discount);
    totals
}
