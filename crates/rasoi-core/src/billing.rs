//! # Bill Computation Engine
//!
//! Derives the full tax/discount/total breakdown of a bill from its active
//! order lines and a discount percentage.
//!
//! ## Computation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    compute_breakdown(lines, discount)                   │
//! │                                                                         │
//! │  active lines ──► group by GstCategory ──► [total, rate] per category  │
//! │                                                  │                      │
//! │                     ┌────────────────────────────┘                      │
//! │                     ▼                                                   │
//! │   per category:  discount = total × d%        (half-up, paise)          │
//! │                  after    = total - discount                            │
//! │                  bucket   = TaxBucket::route(category, rate)            │
//! │                     │                                                   │
//! │          ┌──────────┴───────────┐                                       │
//! │          ▼                      ▼                                       │
//! │     Food (rate > 0)        Liquor / Beer / OtherNonTaxable              │
//! │     taxable += after       non_taxable += after                         │
//! │     cgst += after×r/2      liquor / beer += total (pre-discount)        │
//! │     sgst += after×r/2                                                   │
//! │          │                      │                                       │
//! │          └──────────┬───────────┘                                       │
//! │                     ▼                                                   │
//! │   grand_total = ceil_to_rupee(cgst + sgst + taxable + non_taxable)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Policy
//! - Every derived amount is rounded half-up to the paisa, per category,
//!   before it is accumulated.
//! - The grand total is always rounded UP to the whole rupee, never to the
//!   nearest.
//!
//! Integer paise make the result byte-identical on every call, which is what
//! lets the billing form, the bill row and the receipt agree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountPercent, GstCategory, GstRate, OrderLineItem, TaxBucket};

// =============================================================================
// Bill Breakdown
// =============================================================================

/// The tax/discount computation result for one bill.
///
/// ## Invariants
/// - `total_tax_amount == cgst_amount + sgst_amount`
/// - `grand_total == ceil_to_rupee(total_tax_amount + taxable_amount + non_taxable_amount)`
/// - `total == pre_discount_food_total + (non-taxable subtotals before discount)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BillBreakdown {
    /// Pre-discount sum of every active line.
    pub total: Money,
    /// Pre-discount sum of taxable (food) lines.
    pub pre_discount_food_total: Money,
    /// Nominal GST on food before discount. Display only.
    pub tax_on_food: Money,
    /// Pre-discount liquor subtotal.
    pub liquor_amount: Money,
    /// Pre-discount beer subtotal.
    pub beer_amount: Money,
    pub discount_percent: DiscountPercent,
    pub discount_amount: Money,
    /// Post-discount food subtotal.
    pub taxable_amount: Money,
    /// Post-discount subtotal of everything outside GST.
    pub non_taxable_amount: Money,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub total_tax_amount: Money,
    /// Whole rupees, expressed in paise.
    pub grand_total: Money,
}

/// Sum and GST rate of one category's active lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategorySubtotal {
    pub category: GstCategory,
    pub rate: GstRate,
    pub total: Money,
}

impl CategorySubtotal {
    #[inline]
    pub fn bucket(&self) -> TaxBucket {
        TaxBucket::route(self.category, self.rate)
    }
}

/// Groups active lines by GST category.
///
/// ## Errors
/// [`CoreError::InconsistentGstRate`] when two active lines of the same
/// category disagree on the GST rate.
pub fn category_subtotals(items: &[OrderLineItem]) -> CoreResult<Vec<CategorySubtotal>> {
    let mut groups: BTreeMap<GstCategory, CategorySubtotal> = BTreeMap::new();

    for item in items.iter().filter(|item| item.is_active()) {
        match groups.get_mut(&item.gst_category) {
            Some(group) => {
                if group.rate != item.gst_rate {
                    return Err(CoreError::InconsistentGstRate {
                        category: item.gst_category,
                        first: group.rate,
                        second: item.gst_rate,
                    });
                }
                group.total += item.line_total;
            }
            None => {
                groups.insert(
                    item.gst_category,
                    CategorySubtotal {
                        category: item.gst_category,
                        rate: item.gst_rate,
                        total: item.line_total,
                    },
                );
            }
        }
    }

    Ok(groups.into_values().collect())
}

/// Computes the bill breakdown for the active lines of an order.
///
/// Cancelled lines are ignored. Returns `Ok(None)` when nothing active is
/// left: "no items" is a different state from an all-zero bill.
///
/// ## Example
/// ```rust
/// use rasoi_core::billing::compute_breakdown;
/// use rasoi_core::types::DiscountPercent;
///
/// let breakdown = compute_breakdown(&[], DiscountPercent::zero()).unwrap();
/// assert!(breakdown.is_none());
/// ```
pub fn compute_breakdown(
    items: &[OrderLineItem],
    discount: DiscountPercent,
) -> CoreResult<Option<BillBreakdown>> {
    let categories = category_subtotals(items)?;
    if categories.is_empty() {
        return Ok(None);
    }

    let mut total = Money::zero();
    let mut pre_discount_food_total = Money::zero();
    let mut tax_on_food = Money::zero();
    let mut liquor_amount = Money::zero();
    let mut beer_amount = Money::zero();
    let mut discount_amount = Money::zero();
    let mut taxable_amount = Money::zero();
    let mut non_taxable_amount = Money::zero();
    let mut cgst_amount = Money::zero();
    let mut sgst_amount = Money::zero();

    for subtotal in &categories {
        let category_discount = subtotal.total.percent_of(discount);
        let after_discount = subtotal.total - category_discount;

        total += subtotal.total;
        tax_on_food += subtotal.total.calculate_tax(subtotal.rate);
        discount_amount += category_discount;

        match subtotal.bucket() {
            TaxBucket::Food => {
                pre_discount_food_total += subtotal.total;
                taxable_amount += after_discount;
                cgst_amount += after_discount.half_tax(subtotal.rate);
                sgst_amount += after_discount.half_tax(subtotal.rate);
            }
            TaxBucket::Liquor => {
                liquor_amount += subtotal.total;
                non_taxable_amount += after_discount;
            }
            TaxBucket::Beer => {
                beer_amount += subtotal.total;
                non_taxable_amount += after_discount;
            }
            TaxBucket::OtherNonTaxable => {
                non_taxable_amount += after_discount;
            }
        }
    }

    let total_tax_amount = cgst_amount + sgst_amount;
    let grand_total = (total_tax_amount + taxable_amount + non_taxable_amount).ceil_to_rupee();

    Ok(Some(BillBreakdown {
        total,
        pre_discount_food_total,
        tax_on_food,
        liquor_amount,
        beer_amount,
        discount_percent: discount,
        discount_amount,
        taxable_amount,
        non_taxable_amount,
        cgst_amount,
        sgst_amount,
        total_tax_amount,
        grand_total,
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
