//! # Order Repository
//!
//! Read access to orders and their lines.
//!
//! All writes go through a ledger unit (see [`crate::ledger`]); the
//! executor-generic fetch helpers here are shared with it so the same SQL
//! serves both the pool and an open transaction.

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::DbResult;
use rasoi_core::{OpenOrder, Order, OrderLineItem};

/// Fetches one order by id.
pub(crate) async fn fetch_order<'e, E>(executor: E, id: &str) -> DbResult<Option<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let order = sqlx::query_as::<_, Order>(
        r#"
        SELECT id, kot_no, table_no, captain, order_type, status, report_id, created_at
        FROM orders
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(order)
}

/// Fetches every line of an order (cancelled included) in insertion order.
pub(crate) async fn fetch_lines<'e, E>(executor: E, order_id: &str) -> DbResult<Vec<OrderLineItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let lines = sqlx::query_as::<_, OrderLineItem>(
        r#"
        SELECT id, order_id, item_code, item_name, rate, quantity, line_total,
               gst_category, gst_rate, cancelled, printed, voided
        FROM order_lines
        WHERE order_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;

    Ok(lines)
}

/// Fetches one line by id.
pub(crate) async fn fetch_line<'e, E>(executor: E, line_id: &str) -> DbResult<Option<OrderLineItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let line = sqlx::query_as::<_, OrderLineItem>(
        r#"
        SELECT id, order_id, item_code, item_name, rate, quantity, line_total,
               gst_category, gst_rate, cancelled, printed, voided
        FROM order_lines
        WHERE id = ?1
        "#,
    )
    .bind(line_id)
    .fetch_optional(executor)
    .await?;

    Ok(line)
}

/// Repository for order reads.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by its UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        fetch_order(&self.pool, id).await
    }

    /// Gets all lines of an order, cancelled included.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLineItem>> {
        fetch_lines(&self.pool, order_id).await
    }

    /// Lists open orders with their lines, oldest KOT first.
    pub async fn list_open(&self) -> DbResult<Vec<OpenOrder>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, kot_no, table_no, captain, order_type, status, report_id, created_at
            FROM orders
            WHERE status = 'open'
            ORDER BY kot_no
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let lines = sqlx::query_as::<_, OrderLineItem>(
            r#"
            SELECT l.id, l.order_id, l.item_code, l.item_name, l.rate, l.quantity, l.line_total,
                   l.gst_category, l.gst_rate, l.cancelled, l.printed, l.voided
            FROM order_lines l
            INNER JOIN orders o ON o.id = l.order_id
            WHERE o.status = 'open'
            ORDER BY l.rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(group_open_orders(orders, lines))
    }
}

/// Attaches lines to their orders, preserving both orderings.
pub(crate) fn group_open_orders(orders: Vec<Order>, lines: Vec<OrderLineItem>) -> Vec<OpenOrder> {
    let mut open: Vec<OpenOrder> = orders
        .into_iter()
        .map(|order| OpenOrder {
            order,
            lines: Vec::new(),
        })
        .collect();

    for line in lines {
        if let Some(slot) = open.iter_mut().find(|o| o.order.id == line.order_id) {
            slot.lines.push(line);
        }
    }

    open
}
