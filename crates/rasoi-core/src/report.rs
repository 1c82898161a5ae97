//! # Report Folding
//!
//! Pure folds behind the end-of-day reports. Storage selects the rows for a
//! reporting period; this module groups and totals them.
//!
//! ```text
//! item-wise   lines of billed/pending orders ──► category ──► item ──► qty
//! pay-mode    payments                       ──► mode     ──► count, amount
//! void        voided lines                   ──► as listed (no folding)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::aggregate::{aggregate_for_report, AggregateLine};
use crate::money::Money;
use crate::types::{GstCategory, OrderLineItem, Payment, PaymentMode};

// =============================================================================
// Item-wise
// =============================================================================

/// Quantities sold in one GST category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemWiseGroup {
    pub category: GstCategory,
    pub items: Vec<AggregateLine>,
    pub total_quantity: i64,
    pub total_amount: Money,
}

/// Folds lines by category then item code. Cancelled lines are excluded.
/// Categories come out in declaration order; items by first appearance.
pub fn fold_item_wise(lines: &[OrderLineItem]) -> Vec<ItemWiseGroup> {
    let mut by_category: BTreeMap<GstCategory, Vec<&OrderLineItem>> = BTreeMap::new();
    for line in lines {
        by_category.entry(line.gst_category).or_default().push(line);
    }

    by_category
        .into_iter()
        .filter_map(|(category, members)| {
            let items = aggregate_for_report(members);
            if items.is_empty() {
                return None;
            }
            Some(ItemWiseGroup {
                category,
                total_quantity: items.iter().map(|row| row.quantity).sum(),
                total_amount: items.iter().map(|row| row.total).sum(),
                items,
            })
        })
        .collect()
}

// =============================================================================
// Pay-mode
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayModeSummary {
    pub mode: PaymentMode,
    pub bills: i64,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayModeReport {
    pub modes: Vec<PayModeSummary>,
    pub total_bills: i64,
    pub total_amount: Money,
}

pub fn fold_pay_modes(payments: &[Payment]) -> PayModeReport {
    let mut by_mode: BTreeMap<PaymentMode, (i64, Money)> = BTreeMap::new();
    for payment in payments {
        let entry = by_mode.entry(payment.mode).or_insert((0, Money::zero()));
        entry.0 += 1;
        entry.1 += payment.amount;
    }

    let modes: Vec<PayModeSummary> = by_mode
        .into_iter()
        .map(|(mode, (bills, amount))| PayModeSummary { mode, bills, amount })
        .collect();

    PayModeReport {
        total_bills: modes.iter().map(|m| m.bills).sum(),
        total_amount: modes.iter().map(|m| m.amount).sum(),
        modes,
    }
}

// =============================================================================
// Void
// =============================================================================

/// A line that was cancelled after the kitchen had it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VoidEntry {
    pub kot_no: i64,
    pub table_no: String,
    pub captain: String,
    pub item_code: String,
    pub item_name: String,
    pub quantity: i64,
    pub line_total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
