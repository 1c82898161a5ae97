//! # Domain Types
//!
//! Core domain types used throughout Rasoi POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │      Order      │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code           │   │  id (UUID)      │   │  bill_no        │       │
//! │  │  name, rate     │   │  kot_no         │   │  bill_id "R12-" │       │
//! │  │  gst_category   │   │  table, captain │   │  order_id (FK)  │       │
//! │  │  gst_rate       │   │  status         │   │  breakdown      │       │
//! │  └────────┬────────┘   └────────┬────────┘   └─────────────────┘       │
//! │           │ NewOrderLine        │ 1..n                                  │
//! │           ▼                     ▼                                       │
//! │  ┌──────────────────────────────────────┐    ┌─────────────────┐       │
//! │  │           OrderLineItem              │    │    Payment      │       │
//! │  │  code, name, rate, qty, line_total   │    │  mode, amount   │       │
//! │  │  gst_category, gst_rate              │    │  room_no        │       │
//! │  │  cancelled, printed, voided          │    └─────────────────┘       │
//! │  └──────────────────────────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders, lines and payments have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business number: (`kot_no`, `bill_id`) - what staff read off the slip

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::billing::BillBreakdown;
use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_item_code, validate_item_name, validate_quantity, validate_rate, ValidationResult,
};

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate in basis points (500 = 5%).
///
/// A rate of zero marks a category as non-taxable (alcohol is outside GST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct GstRate(u32);

impl GstRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Creates a rate from a whole percentage (5 → 500 bps).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        GstRate(percent * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        GstRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::zero()
    }
}

/// `5%`, `2.5%`, `0%`.
impl fmt::Display for GstRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

// =============================================================================
// Discount Percent
// =============================================================================

/// Whole-number bill discount, validated to `0..=100` at construction.
///
/// Deserialization goes through the same check, so an out-of-range value
/// from the billing form never reaches the computation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    pub const MAX: u8 = 100;

    /// ## Example
    /// ```rust
    /// use rasoi_core::types::DiscountPercent;
    ///
    /// assert!(DiscountPercent::new(10).is_ok());
    /// assert!(DiscountPercent::new(101).is_err());
    /// ```
    pub fn new(percent: u8) -> ValidationResult<Self> {
        if percent > Self::MAX {
            return Err(ValidationError::OutOfRange {
                field: "discount_percent".to_string(),
                min: 0,
                max: Self::MAX as i64,
            });
        }
        Ok(DiscountPercent(percent))
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountPercent(0)
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl Default for DiscountPercent {
    fn default() -> Self {
        DiscountPercent::zero()
    }
}

impl TryFrom<i64> for DiscountPercent {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let percent = u8::try_from(value).map_err(|_| ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 0,
            max: Self::MAX as i64,
        })?;
        DiscountPercent::new(percent)
    }
}

impl<'de> Deserialize<'de> for DiscountPercent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        DiscountPercent::try_from(raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// GST Category
// =============================================================================

/// The closed set of GST categories a menu item can belong to.
///
/// ## Routing
/// Which bucket of the bill a category lands in is decided by
/// [`TaxBucket::route`], not by comparing labels. Adding a category here
/// forces every `match` on it to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GstCategory {
    /// Food and soft beverages, taxed at the item's GST rate.
    General,
    /// Spirits and wine, billed outside GST.
    Liquor,
    /// Beer, billed outside GST and reported separately from liquor.
    Beer,
    /// Anything else billed outside GST.
    Exempt,
}

impl GstCategory {
    /// Label used on receipts and in the room-account payload.
    pub const fn label(&self) -> &'static str {
        match self {
            GstCategory::General => "General",
            GstCategory::Liquor => "Liquor",
            GstCategory::Beer => "Beer",
            GstCategory::Exempt => "Exempt",
        }
    }
}

impl fmt::Display for GstCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GstCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(GstCategory::General),
            "liquor" => Ok(GstCategory::Liquor),
            "beer" => Ok(GstCategory::Beer),
            "exempt" => Ok(GstCategory::Exempt),
            _ => Err(ValidationError::NotAllowed {
                field: "gst_category".to_string(),
                allowed: vec![
                    "General".to_string(),
                    "Liquor".to_string(),
                    "Beer".to_string(),
                    "Exempt".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Tax Bucket
// =============================================================================

/// Where a category's subtotal lands in the bill breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxBucket {
    /// Taxable; contributes to taxable amount, CGST and SGST.
    Food,
    Liquor,
    Beer,
    /// Non-taxable and neither liquor nor beer.
    OtherNonTaxable,
}

impl TaxBucket {
    /// The routing table.
    ///
    /// ```text
    /// rate > 0           → Food   (whatever the category)
    /// rate = 0, Liquor   → Liquor
    /// rate = 0, Beer     → Beer
    /// rate = 0, other    → OtherNonTaxable
    /// ```
    pub const fn route(category: GstCategory, rate: GstRate) -> TaxBucket {
        if !rate.is_zero() {
            return TaxBucket::Food;
        }
        match category {
            GstCategory::Liquor => TaxBucket::Liquor,
            GstCategory::Beer => TaxBucket::Beer,
            GstCategory::General | GstCategory::Exempt => TaxBucket::OtherNonTaxable,
        }
    }

    #[inline]
    pub const fn is_taxable(&self) -> bool {
        matches!(self, TaxBucket::Food)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
///
/// ```text
///   Open ──finalize──► Pending ──clear / room post──► Billed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Items are being added by captains.
    Open,
    /// Bill issued, payment not yet recorded.
    Pending,
    /// Payment recorded (or posted to a room account).
    Billed,
}

impl OrderStatus {
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Open, OrderStatus::Pending) | (OrderStatus::Pending, OrderStatus::Billed)
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Pending => "pending",
            OrderStatus::Billed => "billed",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Open
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Card,
    Upi,
    /// Charged to a hotel room; only reachable through room posting.
    RoomAccount,
}

impl PaymentMode {
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Card => "Card",
            PaymentMode::Upi => "UPI",
            PaymentMode::RoomAccount => "RoomAccount",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "card" => Ok(PaymentMode::Card),
            "upi" => Ok(PaymentMode::Upi),
            "room_account" | "roomaccount" => Ok(PaymentMode::RoomAccount),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_mode".to_string(),
                allowed: vec![
                    "cash".to_string(),
                    "card".to_string(),
                    "upi".to_string(),
                    "room_account".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Order Type
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::DineIn
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// An item on the menu master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MenuItem {
    /// Short code captains key in ("PNT", "KF-STR").
    pub code: String,
    pub name: String,
    pub rate: Money,
    pub gst_category: GstCategory,
    pub gst_rate: GstRate,
    /// Inactive items stay for history but can't be ordered.
    pub active: bool,
}

// =============================================================================
// New Order Line
// =============================================================================

/// A validated line about to be added to an order.
///
/// Fields are private: the only way to get one is through [`NewOrderLine::new`]
/// (or [`NewOrderLine::from_menu`]), which enforces the line invariants and
/// computes `line_total = rate × quantity` once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderLine {
    item_code: String,
    item_name: String,
    rate: Money,
    quantity: i64,
    line_total: Money,
    gst_category: GstCategory,
    gst_rate: GstRate,
}

impl NewOrderLine {
    /// ## Errors
    /// - empty or oversized code / name
    /// - quantity outside `1..=999`
    /// - negative rate
    pub fn new(
        item_code: &str,
        item_name: &str,
        rate: Money,
        quantity: i64,
        gst_category: GstCategory,
        gst_rate: GstRate,
    ) -> ValidationResult<Self> {
        validate_item_code(item_code)?;
        validate_item_name(item_name)?;
        validate_quantity(quantity)?;
        validate_rate(rate)?;

        Ok(NewOrderLine {
            item_code: item_code.trim().to_string(),
            item_name: item_name.trim().to_string(),
            rate,
            quantity,
            line_total: rate.multiply_quantity(quantity),
            gst_category,
            gst_rate,
        })
    }

    /// Builds a line from a menu item, freezing its name, rate and GST
    /// settings at the time of ordering.
    pub fn from_menu(item: &MenuItem, quantity: i64) -> ValidationResult<Self> {
        if !item.active {
            return Err(ValidationError::NotAllowed {
                field: "item_code".to_string(),
                allowed: vec![format!("an active menu item (got {})", item.code)],
            });
        }
        NewOrderLine::new(
            &item.code,
            &item.name,
            item.rate,
            quantity,
            item.gst_category,
            item.gst_rate,
        )
    }

    pub fn item_code(&self) -> &str {
        &self.item_code
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn rate(&self) -> Money {
        self.rate
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn line_total(&self) -> Money {
        self.line_total
    }

    pub fn gst_category(&self) -> GstCategory {
        self.gst_category
    }

    pub fn gst_rate(&self) -> GstRate {
        self.gst_rate
    }

    pub fn bucket(&self) -> TaxBucket {
        TaxBucket::route(self.gst_category, self.gst_rate)
    }
}

// =============================================================================
// Order Line Item
// =============================================================================

/// One quantity of one menu item on one order, as persisted.
///
/// Rate, quantity and code never change after insert; corrections are a
/// cancel followed by a new line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLineItem {
    pub id: String,
    pub order_id: String,
    pub item_code: String,
    pub item_name: String,
    pub rate: Money,
    pub quantity: i64,
    pub line_total: Money,
    pub gst_category: GstCategory,
    pub gst_rate: GstRate,
    pub cancelled: bool,
    /// Sent to the kitchen on a KOT (or void KOT once cancelled).
    pub printed: bool,
    /// Cancelled after it had already been printed.
    pub voided: bool,
}

impl OrderLineItem {
    /// Materialises a validated new line with a fresh id.
    pub fn from_new(id: impl Into<String>, order_id: impl Into<String>, line: &NewOrderLine) -> Self {
        OrderLineItem {
            id: id.into(),
            order_id: order_id.into(),
            item_code: line.item_code.clone(),
            item_name: line.item_name.clone(),
            rate: line.rate,
            quantity: line.quantity,
            line_total: line.line_total,
            gst_category: line.gst_category,
            gst_rate: line.gst_rate,
            cancelled: false,
            printed: false,
            voided: false,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    #[inline]
    pub fn bucket(&self) -> TaxBucket {
        TaxBucket::route(self.gst_category, self.gst_rate)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A table's (or takeaway's) running order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// KOT number issued when the order was opened.
    pub kot_no: i64,
    pub table_no: String,
    pub captain: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Reporting period the order belongs to.
    pub report_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An open order together with all of its lines.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct OpenOrder {
    pub order: Order,
    pub lines: Vec<OrderLineItem>,
}

// =============================================================================
// Bill
// =============================================================================

/// A finalized bill. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Bill {
    /// Global sequential number from the `bill` counter.
    pub bill_no: i64,
    /// Composite `prefix + number + "-" + suffix`, e.g. `R1042-26/27`.
    pub bill_id: String,
    pub prefix: String,
    pub suffix: String,
    pub order_id: String,
    #[ts(as = "String")]
    pub bill_date: NaiveDate,
    #[ts(as = "String")]
    pub bill_time: NaiveTime,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub breakdown: BillBreakdown,
}

/// A finalized bill awaiting payment, with enough order context to show in
/// the pending list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PendingBill {
    pub bill_id: String,
    pub bill_no: i64,
    pub order_id: String,
    pub kot_no: i64,
    pub table_no: String,
    pub captain: String,
    pub order_type: OrderType,
    pub total: Money,
    pub grand_total: Money,
}

// =============================================================================
// Payment
// =============================================================================

/// Settlement of a pending bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub bill_id: String,
    pub mode: PaymentMode,
    pub amount: Money,
    /// Set only for room-account postings.
    pub room_no: Option<String>,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

// =============================================================================
// Report Period
// =============================================================================

/// A business day used to group orders for end-of-day clearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReportPeriod {
    pub id: i64,
    #[ts(as = "String")]
    pub report_date: NaiveDate,
    pub closed: bool,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gst_rate_display() {
        assert_eq!(GstRate::from_percent(5).to_string(), "5%");
        assert_eq!(GstRate::from_bps(250).to_string(), "2.5%");
        assert_eq!(GstRate::from_bps(825).to_string(), "8.25%");
        assert_eq!(GstRate::zero().to_string(), "0%");
    }

    #[test]
    fn test_discount_percent_bounds() {
        assert_eq!(DiscountPercent::new(0).unwrap().value(), 0);
        assert_eq!(DiscountPercent::new(100).unwrap().value(), 100);
        assert!(DiscountPercent::new(101).is_err());
        assert!(DiscountPercent::try_from(-1).is_err());
        assert!(DiscountPercent::try_from(300).is_err());
    }

    #[test]
    fn test_discount_percent_deserialize_validates() {
        let ok: DiscountPercent = serde_json::from_str("15").unwrap();
        assert_eq!(ok.value(), 15);
        assert!(serde_json::from_str::<DiscountPercent>("150").is_err());
    }

    #[test]
    fn test_tax_bucket_routing() {
        let five = GstRate::from_percent(5);
        let zero = GstRate::zero();

        assert_eq!(TaxBucket::route(GstCategory::General, five), TaxBucket::Food);
        assert_eq!(TaxBucket::route(GstCategory::Liquor, zero), TaxBucket::Liquor);
        assert_eq!(TaxBucket::route(GstCategory::Beer, zero), TaxBucket::Beer);
        assert_eq!(TaxBucket::route(GstCategory::Exempt, zero), TaxBucket::OtherNonTaxable);
        assert_eq!(TaxBucket::route(GstCategory::General, zero), TaxBucket::OtherNonTaxable);
        // A taxed liquor line is taxable, whatever its label.
        assert_eq!(TaxBucket::route(GstCategory::Liquor, five), TaxBucket::Food);
    }

    #[test]
    fn test_gst_category_parse() {
        assert_eq!("Liquor".parse::<GstCategory>().unwrap(), GstCategory::Liquor);
        assert_eq!(" beer ".parse::<GstCategory>().unwrap(), GstCategory::Beer);
        assert!("wine".parse::<GstCategory>().is_err());
    }

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Billed));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Billed));
        assert!(!OrderStatus::Billed.can_transition_to(OrderStatus::Open));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_payment_mode_parse() {
        assert_eq!("UPI".parse::<PaymentMode>().unwrap(), PaymentMode::Upi);
        assert_eq!("room-account".parse::<PaymentMode>().unwrap(), PaymentMode::RoomAccount);
        assert!("cheque".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn test_new_order_line_computes_total() {
        let line = NewOrderLine::new(
            "PNT",
            "Paneer Tikka",
            Money::from_paise(25_000),
            3,
            GstCategory::General,
            GstRate::from_percent(5),
        )
        .unwrap();
        assert_eq!(line.line_total().paise(), 75_000);
        assert_eq!(line.bucket(), TaxBucket::Food);
    }

    #[test]
    fn test_new_order_line_rejects_bad_input() {
        let rate = Money::from_paise(100);
        let cat = GstCategory::General;
        let gst = GstRate::from_percent(5);

        assert!(NewOrderLine::new("", "Tea", rate, 1, cat, gst).is_err());
        assert!(NewOrderLine::new("T", "  ", rate, 1, cat, gst).is_err());
        assert!(NewOrderLine::new("T", "Tea", rate, 0, cat, gst).is_err());
        assert!(NewOrderLine::new("T", "Tea", rate, -2, cat, gst).is_err());
        assert!(NewOrderLine::new("T", "Tea", rate, 1000, cat, gst).is_err());
        assert!(NewOrderLine::new("T", "Tea", Money::from_paise(-1), 1, cat, gst).is_err());
    }

    #[test]
    fn test_from_menu_rejects_inactive_item() {
        let item = MenuItem {
            code: "OLD".to_string(),
            name: "Retired Dish".to_string(),
            rate: Money::from_paise(100),
            gst_category: GstCategory::General,
            gst_rate: GstRate::from_percent(5),
            active: false,
        };
        assert!(NewOrderLine::from_menu(&item, 1).is_err());
    }
}
