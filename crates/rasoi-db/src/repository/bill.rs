//! # Bill Repository
//!
//! Read access to finalized bills, the pending list and payments.

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::DbResult;
use rasoi_core::{Bill, Payment, PendingBill};

/// Fetches a bill by its composite id (`R12-26/27`).
pub(crate) async fn fetch_bill<'e, E>(executor: E, bill_id: &str) -> DbResult<Option<Bill>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let bill = sqlx::query_as::<_, Bill>(
        r#"
        SELECT bill_no, bill_id, prefix, suffix, order_id, bill_date, bill_time,
               total, pre_discount_food_total, tax_on_food, liquor_amount, beer_amount,
               discount_percent, discount_amount, taxable_amount, non_taxable_amount,
               cgst_amount, sgst_amount, total_tax_amount, grand_total
        FROM bills
        WHERE bill_id = ?1
        "#,
    )
    .bind(bill_id)
    .fetch_optional(executor)
    .await?;

    Ok(bill)
}

/// Fetches the bill issued for an order, if any.
pub(crate) async fn fetch_bill_for_order<'e, E>(executor: E, order_id: &str) -> DbResult<Option<Bill>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let bill = sqlx::query_as::<_, Bill>(
        r#"
        SELECT bill_no, bill_id, prefix, suffix, order_id, bill_date, bill_time,
               total, pre_discount_food_total, tax_on_food, liquor_amount, beer_amount,
               discount_percent, discount_amount, taxable_amount, non_taxable_amount,
               cgst_amount, sgst_amount, total_tax_amount, grand_total
        FROM bills
        WHERE order_id = ?1
        "#,
    )
    .bind(order_id)
    .fetch_optional(executor)
    .await?;

    Ok(bill)
}

/// Repository for bill reads.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Gets a bill by its composite id.
    pub async fn get_by_bill_id(&self, bill_id: &str) -> DbResult<Option<Bill>> {
        fetch_bill(&self.pool, bill_id).await
    }

    /// Gets the bill issued for an order.
    pub async fn get_for_order(&self, order_id: &str) -> DbResult<Option<Bill>> {
        fetch_bill_for_order(&self.pool, order_id).await
    }

    /// Lists bills whose order is still pending payment, in bill number order.
    pub async fn list_pending(&self) -> DbResult<Vec<PendingBill>> {
        let bills = sqlx::query_as::<_, PendingBill>(
            r#"
            SELECT b.bill_id, b.bill_no, b.order_id, o.kot_no, o.table_no, o.captain,
                   o.order_type, b.total, b.grand_total
            FROM bills b
            INNER JOIN orders o ON o.id = b.order_id
            WHERE o.status = 'pending'
            ORDER BY b.bill_no
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(bills)
    }

    /// Gets the payment recorded against a bill.
    pub async fn get_payment(&self, bill_id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, bill_id, mode, amount, room_no, paid_at
            FROM payments
            WHERE bill_id = ?1
            "#,
        )
        .bind(bill_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }
}
