//! # Aggregation Engine
//!
//! Collapses order lines into one row per item code for KOT tickets, bill
//! receipts, duplicate reprints and running-order reports.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines (in insertion order)            aggregate                        │
//! │                                                                         │
//! │  A  Dal Makhani  2 × 10.00 = 20.00     A  Dal Makhani  5 × 10.00  50.00 │
//! │  B  Roti         1 ×  5.00 =  5.00 ──► B  Roti         1 ×  5.00   5.00 │
//! │  A  Dal Makhani  3 × 10.00 = 30.00                                      │
//! │                                                                         │
//! │  • one pass, code → running row                                        │
//! │  • first sighting seeds name and rate                                  │
//! │  • later sightings add quantity and total only                         │
//! │  • output order = first appearance of each code                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! If two lines share a code but carry different rates (the menu rate was
//! changed mid-order), the row keeps the first-seen rate while the total is
//! still the exact sum of the contributing line totals.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::OrderLineItem;

/// One item code's total across a group of lines. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AggregateLine {
    pub item_code: String,
    pub item_name: String,
    pub quantity: i64,
    /// Rate of the first contributing line.
    pub rate: Money,
    pub total: Money,
}

/// Groups lines by item code, preserving first-appearance order.
///
/// Cancelled lines are NOT filtered here; callers choose which lines go in.
/// Use [`aggregate_for_report`] for live order reporting.
///
/// ## Example
/// ```rust
/// use rasoi_core::aggregate::aggregate;
/// use rasoi_core::types::OrderLineItem;
///
/// let none: Vec<OrderLineItem> = Vec::new();
/// assert!(aggregate(&none).is_empty());
/// ```
pub fn aggregate<'a, I>(items: I) -> Vec<AggregateLine>
where
    I: IntoIterator<Item = &'a OrderLineItem>,
{
    let mut rows: Vec<AggregateLine> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for item in items {
        match index.get(item.item_code.as_str()) {
            Some(&pos) => {
                let row = &mut rows[pos];
                row.quantity += item.quantity;
                row.total += item.line_total;
            }
            None => {
                index.insert(item.item_code.as_str(), rows.len());
                rows.push(AggregateLine {
                    item_code: item.item_code.clone(),
                    item_name: item.item_name.clone(),
                    quantity: item.quantity,
                    rate: item.rate,
                    total: item.line_total,
                });
            }
        }
    }

    rows
}

/// Same as [`aggregate`] with cancelled lines dropped first.
pub fn aggregate_for_report<'a, I>(items: I) -> Vec<AggregateLine>
where
    I: IntoIterator<Item = &'a OrderLineItem>,
{
    aggregate(items.into_iter().filter(|item| !item.cancelled))
}

/// Sum of the `total` column.
pub fn aggregate_total(rows: &[AggregateLine]) -> Money {
    rows.iter().map(|row| row.total).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
