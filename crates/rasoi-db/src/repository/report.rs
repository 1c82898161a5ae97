//! # Report Repository
//!
//! Queries behind the end-of-day reports.
//!
//! ## What Counts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item-wise / KOT summary   lines of pending + billed orders,           │
//! │                            cancelled lines excluded                    │
//! │  Pay-mode summary          payments on bills of the period             │
//! │  Void report               lines cancelled after they were printed     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::{DbError, DbResult};
use rasoi_core::report::VoidEntry;
use rasoi_core::{OrderLineItem, Payment, ReportPeriod};

/// Fetches the open reporting period.
///
/// The migration seeds one and clearance always opens the next, so a
/// missing row means the database was edited by hand.
pub(crate) async fn fetch_open_period<'e, E>(executor: E) -> DbResult<ReportPeriod>
where
    E: Executor<'e, Database = Sqlite>,
{
    let period = sqlx::query_as::<_, ReportPeriod>(
        r#"
        SELECT id, report_date, closed, closed_at
        FROM report_periods
        WHERE closed = 0
        "#,
    )
    .fetch_optional(executor)
    .await?;

    period.ok_or_else(|| DbError::not_found("ReportPeriod", "open"))
}

/// Repository for report reads.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// The period new orders are currently filed under.
    pub async fn current_period(&self) -> DbResult<ReportPeriod> {
        fetch_open_period(&self.pool).await
    }

    /// Gets a period by id.
    pub async fn get_period(&self, report_id: i64) -> DbResult<Option<ReportPeriod>> {
        let period = sqlx::query_as::<_, ReportPeriod>(
            "SELECT id, report_date, closed, closed_at FROM report_periods WHERE id = ?1",
        )
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(period)
    }

    /// Active lines on finalized (pending or billed) orders of a period.
    pub async fn item_lines(&self, report_id: i64) -> DbResult<Vec<OrderLineItem>> {
        let lines = sqlx::query_as::<_, OrderLineItem>(
            r#"
            SELECT l.id, l.order_id, l.item_code, l.item_name, l.rate, l.quantity, l.line_total,
                   l.gst_category, l.gst_rate, l.cancelled, l.printed, l.voided
            FROM order_lines l
            INNER JOIN orders o ON o.id = l.order_id
            WHERE o.report_id = ?1
              AND o.status IN ('pending', 'billed')
              AND l.cancelled = 0
            ORDER BY l.rowid
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Payments recorded against bills of a period.
    pub async fn payments(&self, report_id: i64) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.id, p.bill_id, p.mode, p.amount, p.room_no, p.paid_at
            FROM payments p
            INNER JOIN bills b ON b.bill_id = p.bill_id
            INNER JOIN orders o ON o.id = b.order_id
            WHERE o.report_id = ?1
            ORDER BY b.bill_no
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Lines cancelled after they had gone to the kitchen.
    pub async fn voids(&self, report_id: i64) -> DbResult<Vec<VoidEntry>> {
        let voids = sqlx::query_as::<_, VoidEntry>(
            r#"
            SELECT o.kot_no, o.table_no, o.captain, l.item_code, l.item_name,
                   l.quantity, l.line_total
            FROM order_lines l
            INNER JOIN orders o ON o.id = l.order_id
            WHERE o.report_id = ?1
              AND l.voided = 1
            ORDER BY l.rowid
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(voids)
    }
}
