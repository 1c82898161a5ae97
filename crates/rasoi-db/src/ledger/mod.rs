//! # Ledger
//!
//! The durable-store capability the till's entry points are written against.
//!
//! ## Units of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     finalize_bill(order, discount)                      │
//! │                                                                         │
//! │  ledger.begin() ──► unit                                               │
//! │                      │                                                  │
//! │                      ├── transition_order(Open → Pending)   (CAS)      │
//! │                      ├── order_lines()                                  │
//! │                      ├── next_counter(Bill)                 (atomic)   │
//! │                      ├── insert_bill(..)                                │
//! │                      │                                                  │
//! │                      ├── printer.print(..) ── fails ──► unit dropped   │
//! │                      │                                  (all undone)   │
//! │                      ▼                                                  │
//! │                  unit.commit()                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A unit that is dropped without [`LedgerUnit::commit`] rolls back, so an
//! early `?` return never leaves a half-applied change behind.
//!
//! ## Implementations
//! - [`SqliteLedger`] - one SQLite transaction per unit
//! - [`MemoryLedger`] - snapshot/restore over in-memory tables, for tests

mod memory;
mod sqlite;

pub use memory::{MemoryLedger, MemoryUnit};
pub use sqlite::{SqliteLedger, SqliteUnit};

use chrono::NaiveDate;

use crate::error::DbResult;
use rasoi_core::report::VoidEntry;
use rasoi_core::{
    Bill, MenuItem, NewOrderLine, OpenOrder, Order, OrderLineItem, OrderStatus, OrderType,
    Payment, PendingBill, ReportPeriod,
};

// =============================================================================
// Counters
// =============================================================================

/// The persisted monotonic sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Bill numbers, shared by every billing context.
    Bill,
    /// KOT numbers, one per order opened.
    Kot,
}

impl Counter {
    /// Row name in the `counters` table.
    pub const fn name(&self) -> &'static str {
        match self {
            Counter::Bill => "bill",
            Counter::Kot => "kot",
        }
    }
}

/// Everything needed to open an order; id and timestamp are assigned by the
/// ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub kot_no: i64,
    pub table_no: String,
    pub captain: String,
    pub order_type: OrderType,
    pub report_id: i64,
}

// =============================================================================
// Traits
// =============================================================================

/// A store that can open atomic units and answer the read queries behind
/// the till's screens and reports.
///
/// Read methods must not be called while a unit from the same ledger is
/// open on the current task; use the unit's own reads instead.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    type Unit: LedgerUnit;

    /// Whether the store can be reached right now.
    async fn is_available(&self) -> bool;

    /// Opens a unit of work.
    async fn begin(&self) -> DbResult<Self::Unit>;

    /// Next value a counter would hand out, without taking it.
    async fn peek_counter(&self, counter: Counter) -> DbResult<i64>;

    async fn menu_item(&self, code: &str) -> DbResult<Option<MenuItem>>;

    async fn order(&self, order_id: &str) -> DbResult<Option<Order>>;

    async fn order_lines(&self, order_id: &str) -> DbResult<Vec<OrderLineItem>>;

    async fn open_orders(&self) -> DbResult<Vec<OpenOrder>>;

    async fn bill(&self, bill_id: &str) -> DbResult<Option<Bill>>;

    async fn pending_bills(&self) -> DbResult<Vec<PendingBill>>;

    async fn current_period(&self) -> DbResult<ReportPeriod>;

    /// Active lines on pending or billed orders of a period.
    async fn report_lines(&self, report_id: i64) -> DbResult<Vec<OrderLineItem>>;

    async fn report_payments(&self, report_id: i64) -> DbResult<Vec<Payment>>;

    async fn report_voids(&self, report_id: i64) -> DbResult<Vec<VoidEntry>>;
}

/// One atomic unit of work. Dropping it without `commit` rolls back.
#[allow(async_fn_in_trait)]
pub trait LedgerUnit {
    /// Takes the counter's current value and advances it by one.
    async fn next_counter(&mut self, counter: Counter) -> DbResult<i64>;

    async fn open_period(&mut self) -> DbResult<ReportPeriod>;

    async fn create_order(&mut self, order: NewOrder) -> DbResult<Order>;

    async fn order(&mut self, order_id: &str) -> DbResult<Option<Order>>;

    /// Moves an order from `from` to `to` only if it is currently in `from`.
    /// Returns `false` when the order is missing or in another state.
    async fn transition_order(
        &mut self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool>;

    async fn insert_line(&mut self, order_id: &str, line: &NewOrderLine) -> DbResult<OrderLineItem>;

    /// All lines of an order, cancelled included, in insertion order.
    async fn order_lines(&mut self, order_id: &str) -> DbResult<Vec<OrderLineItem>>;

    async fn line(&mut self, line_id: &str) -> DbResult<Option<OrderLineItem>>;

    async fn mark_printed(&mut self, line_ids: &[String]) -> DbResult<()>;

    /// Cancels an active line. `voided` takes the old `printed` flag and
    /// `printed` is cleared so the void KOT picks it up.
    /// Returns `false` when it was already cancelled.
    async fn cancel_line(&mut self, line_id: &str) -> DbResult<bool>;

    async fn insert_bill(&mut self, bill: &Bill) -> DbResult<()>;

    async fn bill(&mut self, bill_id: &str) -> DbResult<Option<Bill>>;

    async fn insert_payment(&mut self, payment: &Payment) -> DbResult<()>;

    /// Orders of a period that are still open or pending payment.
    async fn count_unsettled(&mut self, report_id: i64) -> DbResult<i64>;

    /// Closes a period and opens the next one dated `next_date`.
    async fn close_period(&mut self, report_id: i64, next_date: NaiveDate)
        -> DbResult<ReportPeriod>;

    async fn commit(self) -> DbResult<()>;

    async fn rollback(self) -> DbResult<()>;
}
