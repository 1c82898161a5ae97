//! SQLite-backed ledger: one transaction per unit.

use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Counter, Ledger, LedgerUnit, NewOrder};
use crate::error::{DbError, DbResult};
use crate::repository::bill::{fetch_bill, BillRepository};
use crate::repository::menu::MenuRepository;
use crate::repository::order::{fetch_line, fetch_lines, fetch_order, OrderRepository};
use crate::repository::report::{fetch_open_period, ReportRepository};
use rasoi_core::report::VoidEntry;
use rasoi_core::{
    Bill, MenuItem, NewOrderLine, OpenOrder, Order, OrderLineItem, OrderStatus, Payment,
    PendingBill, ReportPeriod,
};

/// Ledger over the shared connection pool.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteLedger { pool }
    }
}

impl Ledger for SqliteLedger {
    type Unit = SqliteUnit;

    async fn is_available(&self) -> bool {
        if self.pool.is_closed() {
            return false;
        }
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn begin(&self) -> DbResult<SqliteUnit> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::Internal(msg) => DbError::TransactionFailed(msg),
                other => other,
            })?;

        // Take the write lock before any read so concurrent units queue on
        // the busy timeout instead of failing a later lock upgrade.
        sqlx::query("UPDATE counters SET next_value = next_value WHERE name = 'bill'")
            .execute(&mut *tx)
            .await?;

        Ok(SqliteUnit { tx })
    }

    async fn peek_counter(&self, counter: Counter) -> DbResult<i64> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT next_value FROM counters WHERE name = ?1")
                .bind(counter.name())
                .fetch_optional(&self.pool)
                .await?;

        value.ok_or_else(|| DbError::not_found("Counter", counter.name()))
    }

    async fn menu_item(&self, code: &str) -> DbResult<Option<MenuItem>> {
        MenuRepository::new(self.pool.clone()).get_by_code(code).await
    }

    async fn order(&self, order_id: &str) -> DbResult<Option<Order>> {
        fetch_order(&self.pool, order_id).await
    }

    async fn order_lines(&self, order_id: &str) -> DbResult<Vec<OrderLineItem>> {
        fetch_lines(&self.pool, order_id).await
    }

    async fn open_orders(&self) -> DbResult<Vec<OpenOrder>> {
        OrderRepository::new(self.pool.clone()).list_open().await
    }

    async fn bill(&self, bill_id: &str) -> DbResult<Option<Bill>> {
        fetch_bill(&self.pool, bill_id).await
    }

    async fn pending_bills(&self) -> DbResult<Vec<PendingBill>> {
        BillRepository::new(self.pool.clone()).list_pending().await
    }

    async fn current_period(&self) -> DbResult<ReportPeriod> {
        fetch_open_period(&self.pool).await
    }

    async fn report_lines(&self, report_id: i64) -> DbResult<Vec<OrderLineItem>> {
        ReportRepository::new(self.pool.clone())
            .item_lines(report_id)
            .await
    }

    async fn report_payments(&self, report_id: i64) -> DbResult<Vec<Payment>> {
        ReportRepository::new(self.pool.clone())
            .payments(report_id)
            .await
    }

    async fn report_voids(&self, report_id: i64) -> DbResult<Vec<VoidEntry>> {
        ReportRepository::new(self.pool.clone()).voids(report_id).await
    }
}

// =============================================================================
// Unit
// =============================================================================

/// An open SQLite transaction. sqlx rolls it back on drop.
#[derive(Debug)]
pub struct SqliteUnit {
    tx: Transaction<'static, Sqlite>,
}

impl LedgerUnit for SqliteUnit {
    async fn next_counter(&mut self, counter: Counter) -> DbResult<i64> {
        let taken: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE counters
            SET next_value = next_value + 1
            WHERE name = ?1
            RETURNING next_value - 1
            "#,
        )
        .bind(counter.name())
        .fetch_optional(&mut *self.tx)
        .await?;

        let value = taken.ok_or_else(|| DbError::not_found("Counter", counter.name()))?;
        debug!(counter = counter.name(), value, "Counter advanced");
        Ok(value)
    }

    async fn open_period(&mut self) -> DbResult<ReportPeriod> {
        fetch_open_period(&mut *self.tx).await
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

        debug!(id = %order.id, kot_no = order.kot_no, "Creating order");

        sqlx::query(
            r#"
            INSERT INTO orders (id, kot_no, table_no, captain, order_type, status, report_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(order.kot_no)
        .bind(&order.table_no)
        .bind(&order.captain)
        .bind(order.order_type)
        .bind(order.status)
        .bind(order.report_id)
        .bind(order.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(order)
    }

    async fn order(&mut self, order_id: &str) -> DbResult<Option<Order>> {
        fetch_order(&mut *self.tx, order_id).await
    }

    async fn transition_order(
        &mut self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = ?3 WHERE id = ?1 AND status = ?2")
            .bind(order_id)
            .bind(from)
            .bind(to)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_line(&mut self, order_id: &str, line: &NewOrderLine) -> DbResult<OrderLineItem> {
        let item = OrderLineItem::from_new(Uuid::new_v4().to_string(), order_id, line);

        sqlx::query(
            r#"
            INSERT INTO order_lines (
                id, order_id, item_code, item_name, rate, quantity, line_total,
                gst_category, gst_rate, cancelled, printed, voided, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, 0, 0, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.item_code)
        .bind(&item.item_name)
        .bind(item.rate)
        .bind(item.quantity)
        .bind(item.line_total)
        .bind(item.gst_category)
        .bind(item.gst_rate)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await?;

        Ok(item)
    }

    async fn order_lines(&mut self, order_id: &str) -> DbResult<Vec<OrderLineItem>> {
        fetch_lines(&mut *self.tx, order_id).await
    }

    async fn line(&mut self, line_id: &str) -> DbResult<Option<OrderLineItem>> {
        fetch_line(&mut *self.tx, line_id).await
    }

    async fn mark_printed(&mut self, line_ids: &[String]) -> DbResult<()> {
        for id in line_ids {
            sqlx::query("UPDATE order_lines SET printed = 1 WHERE id = ?1")
                .bind(id)
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(())
    }

    async fn cancel_line(&mut self, line_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE order_lines
            SET cancelled = 1, voided = printed, printed = 0
            WHERE id = ?1 AND cancelled = 0
            "#,
        )
        .bind(line_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_bill(&mut self, bill: &Bill) -> DbResult<()> {
        debug!(bill_id = %bill.bill_id, order_id = %bill.order_id, "Inserting bill");

        let b = &bill.breakdown;
        let result = sqlx::query(
            r#"
            INSERT INTO bills (
                bill_no, bill_id, prefix, suffix, order_id, bill_date, bill_time,
                total, pre_discount_food_total, tax_on_food, liquor_amount, beer_amount,
                discount_percent, discount_amount, taxable_amount, non_taxable_amount,
                cgst_amount, sgst_amount, total_tax_amount, grand_total
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16,
                ?17, ?18, ?19, ?20
            )
            "#,
        )
        .bind(bill.bill_no)
        .bind(&bill.bill_id)
        .bind(&bill.prefix)
        .bind(&bill.suffix)
        .bind(&bill.order_id)
        .bind(bill.bill_date)
        .bind(bill.bill_time)
        .bind(b.total)
        .bind(b.pre_discount_food_total)
        .bind(b.tax_on_food)
        .bind(b.liquor_amount)
        .bind(b.beer_amount)
        .bind(b.discount_percent)
        .bind(b.discount_amount)
        .bind(b.taxable_amount)
        .bind(b.non_taxable_amount)
        .bind(b.cgst_amount)
        .bind(b.sgst_amount)
        .bind(b.total_tax_amount)
        .bind(b.grand_total)
        .execute(&mut *self.tx)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => {
                    warn!(bill_id = %bill.bill_id, field = %field, "Bill already exists");
                    Err(DbError::duplicate(field, bill.bill_id.clone()))
                }
                other => Err(other),
            },
        }
    }

    async fn bill(&mut self, bill_id: &str) -> DbResult<Option<Bill>> {
        fetch_bill(&mut *self.tx, bill_id).await
    }

    async fn insert_payment(&mut self, payment: &Payment) -> DbResult<()> {
        debug!(bill_id = %payment.bill_id, mode = ?payment.mode, "Recording payment");

        sqlx::query(
            r#"
            INSERT INTO payments (id, bill_id, mode, amount, room_no, paid_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.bill_id)
        .bind(payment.mode)
        .bind(payment.amount)
        .bind(&payment.room_no)
        .bind(payment.paid_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn count_unsettled(&mut self, report_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE report_id = ?1 AND status IN ('open', 'pending')",
        )
        .bind(report_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }

    async fn close_period(&mut self, report_id: i64, next_date: NaiveDate) -> DbResult<ReportPeriod> {
        let closed = sqlx::query(
            "UPDATE report_periods SET closed = 1, closed_at = ?2 WHERE id = ?1 AND closed = 0",
        )
        .bind(report_id)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await?;

        if closed.rows_affected() == 0 {
            return Err(DbError::not_found("ReportPeriod", report_id.to_string()));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO report_periods (report_date, closed) VALUES (?1, 0) RETURNING id",
        )
        .bind(next_date)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(ReportPeriod {
            id,
            report_date: next_date,
            closed: false,
            closed_at: None,
        })
    }

    async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rasoi_core::{
        compute_breakdown, DiscountPercent, GstCategory, GstRate, Money, OrderType, PaymentMode,
    };

    async fn ledger() -> (Database, SqliteLedger) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = db.ledger();
        (db, ledger)
    }

    async fn open_order(ledger: &SqliteLedger, table: &str) -> Order {
        let mut unit = ledger.begin().await.unwrap();
        let kot_no = unit.next_counter(Counter::Kot).await.unwrap();
        let period = unit.open_period().await.unwrap();
        let order = unit
            .create_order(NewOrder {
                kot_no,
                table_no: table.to_string(),
                captain: "Ravi".to_string(),
                order_type: OrderType::DineIn,
                report_id: period.id,
            })
            .await
            .unwrap();
        let line = NewOrderLine::new(
            "DAL",
            "Dal Makhani",
            Money::from_rupees(100),
            2,
            GstCategory::General,
            GstRate::from_percent(5),
        )
        .unwrap();
        unit.insert_line(&order.id, &line).await.unwrap();
        unit.commit().await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_counters_start_at_one_and_advance() {
        let (_db, ledger) = ledger().await;
        assert_eq!(ledger.peek_counter(Counter::Bill).await.unwrap(), 1);

        let mut unit = ledger.begin().await.unwrap();
        assert_eq!(unit.next_counter(Counter::Bill).await.unwrap(), 1);
        assert_eq!(unit.next_counter(Counter::Bill).await.unwrap(), 2);
        unit.commit().await.unwrap();

        assert_eq!(ledger.peek_counter(Counter::Bill).await.unwrap(), 3);
        assert_eq!(ledger.peek_counter(Counter::Kot).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_unit_rolls_back() {
        let (_db, ledger) = ledger().await;
        let order = open_order(&ledger, "T4").await;

        {
            let mut unit = ledger.begin().await.unwrap();
            assert!(unit
                .transition_order(&order.id, OrderStatus::Open, OrderStatus::Pending)
                .await
                .unwrap());
            unit.next_counter(Counter::Bill).await.unwrap();
            // dropped here without commit
        }

        let order = ledger.order(&order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(ledger.peek_counter(Counter::Bill).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let (_db, ledger) = ledger().await;
        let order = open_order(&ledger, "T1").await;

        let mut unit = ledger.begin().await.unwrap();
        assert!(unit
            .transition_order(&order.id, OrderStatus::Open, OrderStatus::Pending)
            .await
            .unwrap());
        assert!(!unit
            .transition_order(&order.id, OrderStatus::Open, OrderStatus::Pending)
            .await
            .unwrap());
        assert!(!unit
            .transition_order("missing", OrderStatus::Open, OrderStatus::Pending)
            .await
            .unwrap());
        unit.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_bill_and_payment_round_trip() {
        let (_db, ledger) = ledger().await;
        let order = open_order(&ledger, "T2").await;

        let mut unit = ledger.begin().await.unwrap();
        unit.transition_order(&order.id, OrderStatus::Open, OrderStatus::Pending)
            .await
            .unwrap();
        let lines = unit.order_lines(&order.id).await.unwrap();
        let breakdown = compute_breakdown(&lines, DiscountPercent::zero())
            .unwrap()
            .unwrap();
        let bill_no = unit.next_counter(Counter::Bill).await.unwrap();
        let bill = Bill {
            bill_no,
            bill_id: format!("R{}-26/27", bill_no),
            prefix: "R".to_string(),
            suffix: "26/27".to_string(),
            order_id: order.id.clone(),
            bill_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            bill_time: chrono::NaiveTime::from_hms_opt(21, 5, 0).unwrap(),
            breakdown,
        };
        unit.insert_bill(&bill).await.unwrap();
        unit.commit().await.unwrap();

        let stored = ledger.bill("R1-26/27").await.unwrap().unwrap();
        assert_eq!(stored, bill);

        let pending = ledger.pending_bills().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].table_no, "T2");
        assert_eq!(pending[0].grand_total, Money::from_rupees(210));

        let mut unit = ledger.begin().await.unwrap();
        unit.transition_order(&order.id, OrderStatus::Pending, OrderStatus::Billed)
            .await
            .unwrap();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            bill_id: bill.bill_id.clone(),
            mode: PaymentMode::Card,
            amount: bill.breakdown.grand_total,
            room_no: None,
            paid_at: Utc::now(),
        };
        unit.insert_payment(&payment).await.unwrap();
        unit.commit().await.unwrap();

        assert!(ledger.pending_bills().await.unwrap().is_empty());
        let period = ledger.current_period().await.unwrap();
        let payments = ledger.report_payments(period.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].mode, PaymentMode::Card);
        assert_eq!(ledger.report_lines(period.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_bill_for_order_is_rejected() {
        let (_db, ledger) = ledger().await;
        let order = open_order(&ledger, "T3").await;
        let lines = ledger.order_lines(&order.id).await.unwrap();
        let breakdown = compute_breakdown(&lines, DiscountPercent::zero())
            .unwrap()
            .unwrap();

        let bill = |no: i64| Bill {
            bill_no: no,
            bill_id: format!("R{}-26/27", no),
            prefix: "R".to_string(),
            suffix: "26/27".to_string(),
            order_id: order.id.clone(),
            bill_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            bill_time: chrono::NaiveTime::from_hms_opt(21, 5, 0).unwrap(),
            breakdown: breakdown.clone(),
        };

        let mut unit = ledger.begin().await.unwrap();
        unit.insert_bill(&bill(1)).await.unwrap();
        let err = unit.insert_bill(&bill(2)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_cancel_marks_printed_lines_voided() {
        let (_db, ledger) = ledger().await;
        let order = open_order(&ledger, "T5").await;
        let line_id = ledger.order_lines(&order.id).await.unwrap()[0].id.clone();

        let mut unit = ledger.begin().await.unwrap();
        unit.mark_printed(&[line_id.clone()]).await.unwrap();
        assert!(unit.cancel_line(&line_id).await.unwrap());
        assert!(!unit.cancel_line(&line_id).await.unwrap());
        unit.commit().await.unwrap();

        let line = &ledger.order_lines(&order.id).await.unwrap()[0];
        assert!(line.cancelled && line.voided && !line.printed);

        let period = ledger.current_period().await.unwrap();
        let voids = ledger.report_voids(period.id).await.unwrap();
        assert_eq!(voids.len(), 1);
        assert_eq!(voids[0].kot_no, order.kot_no);
    }

    #[tokio::test]
    async fn test_close_period_opens_next_day() {
        let (_db, ledger) = ledger().await;
        let period = ledger.current_period().await.unwrap();
        let next_date = period.report_date.succ_opt().unwrap();

        let mut unit = ledger.begin().await.unwrap();
        assert_eq!(unit.count_unsettled(period.id).await.unwrap(), 0);
        let next = unit.close_period(period.id, next_date).await.unwrap();
        unit.commit().await.unwrap();

        let current = ledger.current_period().await.unwrap();
        assert_eq!(current.id, next.id);
        assert_eq!(current.report_date, next_date);
        assert_ne!(current.id, period.id);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let (db, ledger) = ledger().await;
        assert!(ledger.is_available().await);
        db.close().await;
        assert!(!ledger.is_available().await);
        assert!(ledger.begin().await.is_err());
    }
}
