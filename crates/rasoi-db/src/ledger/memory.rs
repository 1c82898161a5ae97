//! In-memory ledger for tests.
//!
//! Tables live behind one async mutex. A unit holds the lock for its whole
//! lifetime and keeps a snapshot taken at `begin`; dropping the unit without
//! `commit` puts the snapshot back.

use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Counter, Ledger, LedgerUnit, NewOrder};
use crate::error::{DbError, DbResult};
use crate::repository::order::group_open_orders;
use rasoi_core::report::VoidEntry;
use rasoi_core::{
    Bill, MenuItem, NewOrderLine, OpenOrder, Order, OrderLineItem, OrderStatus, Payment,
    PendingBill, ReportPeriod,
};

#[derive(Debug, Clone)]
struct Tables {
    counters: HashMap<Counter, i64>,
    periods: Vec<ReportPeriod>,
    menu: BTreeMap<String, MenuItem>,
    orders: Vec<Order>,
    lines: Vec<OrderLineItem>,
    bills: Vec<Bill>,
    payments: Vec<Payment>,
}

impl Tables {
    fn new(report_date: NaiveDate) -> Self {
        Tables {
            counters: HashMap::from([(Counter::Bill, 1), (Counter::Kot, 1)]),
            periods: vec![ReportPeriod {
                id: 1,
                report_date,
                closed: false,
                closed_at: None,
            }],
            menu: BTreeMap::new(),
            orders: Vec::new(),
            lines: Vec::new(),
            bills: Vec::new(),
            payments: Vec::new(),
        }
    }

    fn open_period(&self) -> DbResult<ReportPeriod> {
        self.periods
            .iter()
            .find(|p| !p.closed)
            .cloned()
            .ok_or_else(|| DbError::not_found("ReportPeriod", "open"))
    }

    fn order(&self, order_id: &str) -> Option<Order> {
        self.orders.iter().find(|o| o.id == order_id).cloned()
    }

    fn order_lines(&self, order_id: &str) -> Vec<OrderLineItem> {
        self.lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect()
    }

    fn bill(&self, bill_id: &str) -> Option<Bill> {
        self.bills.iter().find(|b| b.bill_id == bill_id).cloned()
    }

    fn orders_in(&self, report_id: i64) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(move |o| o.report_id == report_id)
    }
}

/// In-memory [`Ledger`] with switches for simulating store failures.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    tables: Arc<Mutex<Tables>>,
    available: Arc<AtomicBool>,
    fail_bill_inserts: Arc<AtomicBool>,
}

impl MemoryLedger {
    /// Empty ledger with counters at 1 and one open period dated `report_date`.
    pub fn new(report_date: NaiveDate) -> Self {
        MemoryLedger {
            tables: Arc::new(Mutex::new(Tables::new(report_date))),
            available: Arc::new(AtomicBool::new(true)),
            fail_bill_inserts: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn add_menu_item(&self, item: MenuItem) {
        self.tables.lock().await.menu.insert(item.code.clone(), item);
    }

    /// Simulates the store going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Makes every bill insert fail, to exercise mid-unit failures.
    pub fn fail_bill_inserts(&self, fail: bool) {
        self.fail_bill_inserts.store(fail, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> DbResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::ConnectionFailed("store unavailable".to_string()))
        }
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> DbResult<T> {
        self.ensure_available()?;
        let tables = self.tables.lock().await;
        Ok(f(&tables))
    }
}

impl Ledger for MemoryLedger {
    type Unit = MemoryUnit;

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> DbResult<MemoryUnit> {
        self.ensure_available()?;
        let guard = self.tables.clone().lock_owned().await;
        let snapshot = guard.clone();
        Ok(MemoryUnit {
            guard,
            snapshot: Some(snapshot),
            fail_bill_inserts: self.fail_bill_inserts.load(Ordering::SeqCst),
        })
    }

    async fn peek_counter(&self, counter: Counter) -> DbResult<i64> {
        self.read(|t| t.counters.get(&counter).copied())
            .await?
            .ok_or_else(|| DbError::not_found("Counter", counter.name()))
    }

    async fn menu_item(&self, code: &str) -> DbResult<Option<MenuItem>> {
        self.read(|t| t.menu.get(code.trim()).cloned()).await
    }

    async fn order(&self, order_id: &str) -> DbResult<Option<Order>> {
        self.read(|t| t.order(order_id)).await
    }

    async fn order_lines(&self, order_id: &str) -> DbResult<Vec<OrderLineItem>> {
        self.read(|t| t.order_lines(order_id)).await
    }

    async fn open_orders(&self) -> DbResult<Vec<OpenOrder>> {
        self.read(|t| {
            let mut orders: Vec<Order> = t
                .orders
                .iter()
                .filter(|o| o.status == OrderStatus::Open)
                .cloned()
                .collect();
            orders.sort_by_key(|o| o.kot_no);
            group_open_orders(orders, t.lines.clone())
        })
        .await
    }

    async fn bill(&self, bill_id: &str) -> DbResult<Option<Bill>> {
        self.read(|t| t.bill(bill_id)).await
    }

    async fn pending_bills(&self) -> DbResult<Vec<PendingBill>> {
        self.read(|t| {
            let mut pending: Vec<PendingBill> = t
                .bills
                .iter()
                .filter_map(|b| {
                    let order = t.order(&b.order_id)?;
                    (order.status == OrderStatus::Pending).then(|| PendingBill {
                        bill_id: b.bill_id.clone(),
                        bill_no: b.bill_no,
                        order_id: order.id.clone(),
                        kot_no: order.kot_no,
                        table_no: order.table_no.clone(),
                        captain: order.captain.clone(),
                        order_type: order.order_type,
                        total: b.breakdown.total,
                        grand_total: b.breakdown.grand_total,
                    })
                })
                .collect();
            pending.sort_by_key(|p| p.bill_no);
            pending
        })
        .await
    }

    async fn current_period(&self) -> DbResult<ReportPeriod> {
        self.read(|t| t.open_period()).await?
    }

    async fn report_lines(&self, report_id: i64) -> DbResult<Vec<OrderLineItem>> {
        self.read(|t| {
            let finalized: Vec<&str> = t
                .orders_in(report_id)
                .filter(|o| o.status != OrderStatus::Open)
                .map(|o| o.id.as_str())
                .collect();
            t.lines
                .iter()
                .filter(|l| l.is_active() && finalized.contains(&l.order_id.as_str()))
                .cloned()
                .collect()
        })
        .await
    }

    async fn report_payments(&self, report_id: i64) -> DbResult<Vec<Payment>> {
        self.read(|t| {
            let order_ids: Vec<&str> = t.orders_in(report_id).map(|o| o.id.as_str()).collect();
            let mut payments: Vec<(i64, Payment)> = t
                .payments
                .iter()
                .filter_map(|p| {
                    let bill = t.bill(&p.bill_id)?;
                    order_ids
                        .contains(&bill.order_id.as_str())
                        .then(|| (bill.bill_no, p.clone()))
                })
                .collect();
            payments.sort_by_key(|(no, _)| *no);
            payments.into_iter().map(|(_, p)| p).collect()
        })
        .await
    }

    async fn report_voids(&self, report_id: i64) -> DbResult<Vec<VoidEntry>> {
        self.read(|t| {
            t.lines
                .iter()
                .filter(|l| l.voided)
                .filter_map(|l| {
                    let order = t.order(&l.order_id)?;
                    (order.report_id == report_id).then(|| VoidEntry {
                        kot_no: order.kot_no,
                        table_no: order.table_no.clone(),
                        captain: order.captain.clone(),
                        item_code: l.item_code.clone(),
                        item_name: l.item_name.clone(),
                        quantity: l.quantity,
                        line_total: l.line_total,
                    })
                })
                .collect()
        })
        .await
    }
}

// =============================================================================
// Unit
// =============================================================================

/// Exclusive access to the tables until committed or dropped.
#[derive(Debug)]
pub struct MemoryUnit {
    guard: OwnedMutexGuard<Tables>,
    /// `None` once committed.
    snapshot: Option<Tables>,
    fail_bill_inserts: bool,
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

impl LedgerUnit for MemoryUnit {
    async fn next_counter(&mut self, counter: Counter) -> DbResult<i64> {
        let slot = self
            .guard
            .counters
            .get_mut(&counter)
            .ok_or_else(|| DbError::not_found("Counter", counter.name()))?;
        let value = *slot;
        *slot += 1;
        Ok(value)
    }

    async fn open_period(&mut self) -> DbResult<ReportPeriod> {
        self.guard.open_period()
    }

    async fn create_order(&mut self, order: NewOrder) -> DbResult<Order> {
        let order = Order {
            id: Uuid::new_v4().to_string(),
            kot_no: order.kot_no,
            table_no: order.table_no,
            captain: order.captain,
            order_type: order.order_type,
            status: OrderStatus::Open,
            report_id: order.report_id,
            created_at: Utc::now(),
        };
        self.guard.orders.push(order.clone());
        Ok(order)
    }

    async fn order(&mut self, order_id: &str) -> DbResult<Option<Order>> {
        Ok(self.guard.order(order_id))
    }

    async fn transition_order(
        &mut self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool> {
        match self
            .guard
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.status == from)
        {
            Some(order) => {
                order.status = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_line(&mut self, order_id: &str, line: &NewOrderLine) -> DbResult<OrderLineItem> {
        if self.guard.order(order_id).is_none() {
            return Err(DbError::ForeignKeyViolation {
                message: format!("order {} does not exist", order_id),
            });
        }
        let item = OrderLineItem::from_new(Uuid::new_v4().to_string(), order_id, line);
        self.guard.lines.push(item.clone());
        Ok(item)
    }

    async fn order_lines(&mut self, order_id: &str) -> DbResult<Vec<OrderLineItem>> {
        Ok(self.guard.order_lines(order_id))
    }

    async fn line(&mut self, line_id: &str) -> DbResult<Option<OrderLineItem>> {
        Ok(self.guard.lines.iter().find(|l| l.id == line_id).cloned())
    }

    async fn mark_printed(&mut self, line_ids: &[String]) -> DbResult<()> {
        for line in self.guard.lines.iter_mut() {
            if line_ids.contains(&line.id) {
                line.printed = true;
            }
        }
        Ok(())
    }

    async fn cancel_line(&mut self, line_id: &str) -> DbResult<bool> {
        match self
            .guard
            .lines
            .iter_mut()
            .find(|l| l.id == line_id && !l.cancelled)
        {
            Some(line) => {
                line.cancelled = true;
                line.voided = line.printed;
                line.printed = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_bill(&mut self, bill: &Bill) -> DbResult<()> {
        if self.fail_bill_inserts {
            return Err(DbError::QueryFailed("disk I/O error".to_string()));
        }
        let tables = &self.guard;
        if tables.bills.iter().any(|b| b.bill_no == bill.bill_no) {
            return Err(DbError::duplicate("bills.bill_no", bill.bill_no.to_string()));
        }
        if tables.bills.iter().any(|b| b.bill_id == bill.bill_id) {
            return Err(DbError::duplicate("bills.bill_id", bill.bill_id.clone()));
        }
        if tables.bills.iter().any(|b| b.order_id == bill.order_id) {
            return Err(DbError::duplicate("bills.order_id", bill.order_id.clone()));
        }
        self.guard.bills.push(bill.clone());
        Ok(())
    }

    async fn bill(&mut self, bill_id: &str) -> DbResult<Option<Bill>> {
        Ok(self.guard.bill(bill_id))
    }

    async fn insert_payment(&mut self, payment: &Payment) -> DbResult<()> {
        if self.guard.payments.iter().any(|p| p.bill_id == payment.bill_id) {
            return Err(DbError::duplicate("payments.bill_id", payment.bill_id.clone()));
        }
        self.guard.payments.push(payment.clone());
        Ok(())
    }

    async fn count_unsettled(&mut self, report_id: i64) -> DbResult<i64> {
        Ok(self
            .guard
            .orders_in(report_id)
            .filter(|o| o.status != OrderStatus::Billed)
            .count() as i64)
    }

    async fn close_period(&mut self, report_id: i64, next_date: NaiveDate) -> DbResult<ReportPeriod> {
        let period = self
            .guard
            .periods
            .iter_mut()
            .find(|p| p.id == report_id && !p.closed)
            .ok_or_else(|| DbError::not_found("ReportPeriod", report_id.to_string()))?;
        period.closed = true;
        period.closed_at = Some(Utc::now());

        let next = ReportPeriod {
            id: self.guard.periods.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            report_date: next_date,
            closed: false,
            closed_at: None,
        };
        self.guard.periods.push(next.clone());
        Ok(next)
    }

    async fn commit(mut self) -> DbResult<()> {
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(self) -> DbResult<()> {
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rasoi_core::{GstCategory, GstRate, Money, OrderType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[tokio::test]
    async fn test_commit_keeps_changes() {
        let ledger = MemoryLedger::new(today());
        let mut unit = ledger.begin().await.unwrap();
        assert_eq!(unit.next_counter(Counter::Kot).await.unwrap(), 1);
        unit.commit().await.unwrap();
        assert_eq!(ledger.peek_counter(Counter::Kot).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_drop_restores_snapshot() {
        let ledger = MemoryLedger::new(today());
        {
            let mut unit = ledger.begin().await.unwrap();
            unit.next_counter(Counter::Bill).await.unwrap();
            unit.create_order(NewOrder {
                kot_no: 1,
                table_no: "T1".to_string(),
                captain: "Asha".to_string(),
                order_type: OrderType::DineIn,
                report_id: 1,
            })
            .await
            .unwrap();
        }
        assert_eq!(ledger.peek_counter(Counter::Bill).await.unwrap(), 1);
        assert!(ledger.open_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_rollback_restores_snapshot() {
        let ledger = MemoryLedger::new(today());
        let mut unit = ledger.begin().await.unwrap();
        unit.next_counter(Counter::Bill).await.unwrap();
        unit.rollback().await.unwrap();
        assert_eq!(ledger.peek_counter(Counter::Bill).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_refuses_everything() {
        let ledger = MemoryLedger::new(today());
        ledger.set_available(false);
        assert!(!ledger.is_available().await);
        assert!(matches!(
            ledger.begin().await,
            Err(DbError::ConnectionFailed(_))
        ));
        assert!(ledger.pending_bills().await.is_err());
    }

    #[tokio::test]
    async fn test_lines_require_existing_order() {
        let ledger = MemoryLedger::new(today());
        let line = NewOrderLine::new(
            "TEA",
            "Masala Tea",
            Money::from_rupees(30),
            1,
            GstCategory::General,
            GstRate::from_percent(5),
        )
        .unwrap();
        let mut unit = ledger.begin().await.unwrap();
        assert!(unit.insert_line("nope", &line).await.is_err());
    }
}
