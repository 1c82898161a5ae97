//! # Receipt Models
//!
//! Structured documents handed to the printer. Layout and ESC/POS encoding
//! belong to the printer driver; this module only decides WHAT is printed.
//!
//! ## Documents
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────────────┐
//! │ Receipt::Kot         │ new lines for the kitchen (or cancelled-after-   │
//! │                      │ print lines, as a void KOT)                      │
//! │ Receipt::KotReport   │ running-order summary for a table                │
//! │ Receipt::Bill        │ customer bill: food section with CGST/SGST and   │
//! │                      │ beverage section outside GST, grand total        │
//! └──────────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! Bill receipts are rebuilt from persisted lines and the persisted
//! breakdown, so a duplicate reprint matches the original to the paisa.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregate::{aggregate, aggregate_for_report, aggregate_total, AggregateLine};
use crate::billing::BillBreakdown;
use crate::money::Money;
use crate::types::{Bill, GstRate, Order, OrderLineItem, TaxBucket};

/// Anything the receipt printer can print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "document", rename_all = "snake_case")]
pub enum Receipt {
    Kot(KotTicket),
    KotReport(KotReport),
    Bill(BillReceipt),
}

// =============================================================================
// KOT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum KotKind {
    /// New items for the kitchen.
    Regular,
    /// Items cancelled after the kitchen already had them.
    Void,
}

/// A kitchen order ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KotTicket {
    pub kind: KotKind,
    pub kot_no: i64,
    pub table_no: String,
    pub captain: String,
    #[ts(as = "String")]
    pub printed_at: NaiveDateTime,
    pub lines: Vec<AggregateLine>,
}

impl KotTicket {
    /// Ticket for the given lines; the caller decides which lines qualify
    /// (unprinted active lines, or unprinted voided lines).
    pub fn for_lines(
        kind: KotKind,
        order: &Order,
        lines: &[OrderLineItem],
        printed_at: NaiveDateTime,
    ) -> Self {
        KotTicket {
            kind,
            kot_no: order.kot_no,
            table_no: order.table_no.clone(),
            captain: order.captain.clone(),
            printed_at,
            lines: aggregate(lines),
        }
    }
}

/// Everything currently on a table, cancelled lines excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KotReport {
    pub kot_no: i64,
    pub table_no: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub lines: Vec<AggregateLine>,
    pub total: Money,
}

impl KotReport {
    pub fn for_order(order: &Order, lines: &[OrderLineItem], date: NaiveDate) -> Self {
        let rows = aggregate_for_report(lines);
        KotReport {
            kot_no: order.kot_no,
            table_no: order.table_no.clone(),
            date,
            total: aggregate_total(&rows),
            lines: rows,
        }
    }
}

// =============================================================================
// Bill Receipt
// =============================================================================

/// Fixed header lines printed at the top of every bill.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptHeader {
    pub store_name: String,
    pub address: String,
    pub gstin: String,
    pub hsn_code: String,
}

/// The taxable (food) part of a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FoodSection {
    pub lines: Vec<AggregateLine>,
    pub sub_total: Money,
    /// Post-discount food amount; equal to `sub_total` without a discount.
    pub after_discount: Money,
    /// Single GST rate across food lines, when there is one. Used for the
    /// "C-GST @ 2.5%" captions.
    pub gst_rate: Option<GstRate>,
    pub cgst: Money,
    pub sgst: Money,
    /// `after_discount + cgst + sgst`, rounded up to the rupee.
    pub total: Money,
}

/// Everything billed outside GST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BeverageSection {
    pub lines: Vec<AggregateLine>,
    pub sub_total: Money,
    pub after_discount: Money,
}

/// A customer bill, original or duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillReceipt {
    pub header: ReceiptHeader,
    pub bill_id: String,
    pub table_no: String,
    #[ts(as = "String")]
    pub bill_date: NaiveDate,
    #[ts(as = "String")]
    pub bill_time: NaiveTime,
    pub food: Option<FoodSection>,
    pub beverage: Option<BeverageSection>,
    pub breakdown: BillBreakdown,
    pub duplicate: bool,
}

impl BillReceipt {
    /// Builds the receipt from a persisted bill and the order's lines.
    ///
    /// Cancelled lines are dropped; the remaining lines are split by
    /// [`TaxBucket`] into the food and beverage sections and aggregated.
    pub fn build(
        header: ReceiptHeader,
        bill: &Bill,
        table_no: &str,
        lines: &[OrderLineItem],
        duplicate: bool,
    ) -> Self {
        let (food_lines, other_lines): (Vec<&OrderLineItem>, Vec<&OrderLineItem>) = lines
            .iter()
            .filter(|line| line.is_active())
            .partition(|line| line.bucket() == TaxBucket::Food);

        let b = &bill.breakdown;

        let food = if food_lines.is_empty() {
            None
        } else {
            let mut rates = food_lines.iter().map(|line| line.gst_rate);
            let first = rates.next();
            let gst_rate = first.filter(|rate| rates.all(|r| r == *rate));
            Some(FoodSection {
                lines: aggregate(food_lines.iter().copied()),
                sub_total: b.pre_discount_food_total,
                after_discount: b.taxable_amount,
                gst_rate,
                cgst: b.cgst_amount,
                sgst: b.sgst_amount,
                total: (b.taxable_amount + b.total_tax_amount).ceil_to_rupee(),
            })
        };

        let beverage = if other_lines.is_empty() {
            None
        } else {
            Some(BeverageSection {
                lines: aggregate(other_lines.iter().copied()),
                sub_total: b.total - b.pre_discount_food_total,
                after_discount: b.non_taxable_amount,
            })
        };

        BillReceipt {
            header,
            bill_id: bill.bill_id.clone(),
            table_no: table_no.to_string(),
            bill_date: bill.bill_date,
            bill_time: bill.bill_time,
            food,
            beverage,
            breakdown: bill.breakdown.clone(),
            duplicate,
        }
    }

    pub fn has_discount(&self) -> bool {
        !self.breakdown.discount_amount.is_zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::compute_breakdown;
    use crate::types::{DiscountPercent, GstCategory, OrderStatus, OrderType};
    use chrono::{TimeZone, Utc};

    fn line(code: &str, category: GstCategory, gst_pct: u32, rate: i64, qty: i64) -> OrderLineItem {
        OrderLineItem {
            id: format!("{}-{}", code, qty),
            order_id: "order-1".to_string(),
            item_code: code.to_string(),
            item_name: format!("{} name", code),
            rate: Money::from_paise(rate),
            quantity: qty,
            line_total: Money::from_paise(rate * qty),
            gst_category: category,
            gst_rate: GstRate::from_percent(gst_pct),
            cancelled: false,
            printed: true,
            voided: false,
        }
    }

    fn order() -> Order {
        Order {
            id: "order-1".to_string(),
            kot_no: 41,
            table_no: "7".to_string(),
            captain: "Ravi".to_string(),
            order_type: OrderType::DineIn,
            status: OrderStatus::Pending,
            report_id: 1,
            created_at: Utc.with_ymd_and_hms(2026, 10, 16, 19, 30, 0).unwrap(),
        }
    }

    fn bill_for(lines: &[OrderLineItem], discount: u8) -> Bill {
        let breakdown = compute_breakdown(lines, DiscountPercent::new(discount).unwrap())
            .unwrap()
            .unwrap();
        Bill {
            bill_no: 12,
            bill_id: "R12-26/27".to_string(),
            prefix: "R".to_string(),
            suffix: "26/27".to_string(),
            order_id: "order-1".to_string(),
            bill_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            bill_time: NaiveTime::from_hms_opt(21, 5, 0).unwrap(),
            breakdown,
        }
    }

    #[test]
    fn test_bill_receipt_splits_sections() {
        let mut cancelled = line("NAAN", GstCategory::General, 5, 4_000, 2);
        cancelled.cancelled = true;
        let lines = vec![
            line("DAL", GstCategory::General, 5, 10_000, 1),
            line("DAL", GstCategory::General, 5, 10_000, 1),
            line("RUM", GstCategory::Liquor, 0, 10_000, 1),
            cancelled,
        ];
        let bill = bill_for(&lines, 10);
        let receipt = BillReceipt::build(ReceiptHeader::default(), &bill, "7", &lines, false);

        let food = receipt.food.as_ref().unwrap();
        assert_eq!(food.lines.len(), 1);
        assert_eq!(food.lines[0].quantity, 2);
        assert_eq!(food.sub_total.paise(), 20_000);
        assert_eq!(food.after_discount.paise(), 18_000);
        assert_eq!(food.gst_rate, Some(GstRate::from_percent(5)));
        assert_eq!(food.total.paise(), 18_900);

        let bev = receipt.beverage.as_ref().unwrap();
        assert_eq!(bev.lines.len(), 1);
        assert_eq!(bev.sub_total.paise(), 10_000);
        assert_eq!(bev.after_discount.paise(), 9_000);

        assert!(receipt.has_discount());
        assert_eq!(receipt.breakdown.grand_total.paise(), 27_900);
    }

    #[test]
    fn test_food_only_bill_has_no_beverage_section() {
        let lines = vec![line("DAL", GstCategory::General, 5, 10_000, 2)];
        let bill = bill_for(&lines, 0);
        let receipt = BillReceipt::build(ReceiptHeader::default(), &bill, "7", &lines, true);
        assert!(receipt.food.is_some());
        assert!(receipt.beverage.is_none());
        assert!(receipt.duplicate);
        assert!(!receipt.has_discount());
    }

    #[test]
    fn test_kot_ticket_aggregates_given_lines() {
        let lines = vec![
            line("DAL", GstCategory::General, 5, 10_000, 1),
            line("DAL", GstCategory::General, 5, 10_000, 2),
        ];
        let at = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(19, 45, 0)
            .unwrap();
        let ticket = KotTicket::for_lines(KotKind::Regular, &order(), &lines, at);
        assert_eq!(ticket.kot_no, 41);
        assert_eq!(ticket.lines.len(), 1);
        assert_eq!(ticket.lines[0].quantity, 3);
    }

    #[test]
    fn test_kot_report_excludes_cancelled() {
        let mut cancelled = line("RUM", GstCategory::Liquor, 0, 10_000, 1);
        cancelled.cancelled = true;
        let lines = vec![line("DAL", GstCategory::General, 5, 10_000, 2), cancelled];
        let report = KotReport::for_order(&order(), &lines, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.total.paise(), 20_000);
    }
}
