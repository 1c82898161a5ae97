//! # Report Commands
//!
//! End-of-day reports over one reporting period, and clearance, which
//! closes the period once every order in it is settled.
//!
//! ```text
//!   period 7 (open) ── orders stamped with 7 ── all Billed? ──► clearance
//!                                                                  │
//!                                     period 7 closed, period 8 opened
//!                                     dated the following day
//! ```
//!
//! A `report_id` of `None` means the currently open period.

use chrono::Days;
use tracing::{info, warn};

use crate::error::{During, Operation, TillError, TillResult};
use crate::notify::{Notifier, UiEvent};
use crate::printer::ReceiptPrinter;
use crate::room::RoomAccountGateway;
use crate::state::Till;
use rasoi_core::report::{fold_item_wise, fold_pay_modes, ItemWiseGroup, PayModeReport, VoidEntry};
use rasoi_core::ReportPeriod;
use rasoi_db::{Ledger, LedgerUnit};

impl<L, P, R, N> Till<L, P, R, N>
where
    L: Ledger,
    P: ReceiptPrinter,
    R: RoomAccountGateway,
    N: Notifier,
{
    /// Quantities sold per category and item on finalized orders.
    pub async fn item_wise_report(&self, report_id: Option<i64>) -> TillResult<Vec<ItemWiseGroup>> {
        let op = Operation::Report;
        let report_id = self.report_id(op, report_id).await?;
        let lines = self.ledger.report_lines(report_id).await.during(op)?;
        Ok(fold_item_wise(&lines))
    }

    /// Settled bills counted and totalled per payment mode.
    pub async fn pay_mode_report(&self, report_id: Option<i64>) -> TillResult<PayModeReport> {
        let op = Operation::Report;
        let report_id = self.report_id(op, report_id).await?;
        let payments = self.ledger.report_payments(report_id).await.during(op)?;
        Ok(fold_pay_modes(&payments))
    }

    /// Lines cancelled after the kitchen had them.
    pub async fn void_report(&self, report_id: Option<i64>) -> TillResult<Vec<VoidEntry>> {
        let op = Operation::Report;
        let report_id = self.report_id(op, report_id).await?;
        self.ledger.report_voids(report_id).await.during(op)
    }

    /// Closes the open period and opens the next one. Refused while any
    /// order in the period is still open or pending.
    pub async fn close_report_period(&self) -> TillResult<ReportPeriod> {
        let op = Operation::Clearance;
        self.ready(op).await?;

        let mut unit = self.ledger.begin().await.during(op)?;
        let period = unit.open_period().await.during(op)?;

        let unsettled = unit.count_unsettled(period.id).await.during(op)?;
        if unsettled > 0 {
            warn!(report_id = period.id, unsettled, "Clearance refused");
            return Err(TillError::conflict(
                op,
                format!("{} orders are still open or pending", unsettled),
            ));
        }

        let next_date = period
            .report_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| TillError::validation(op, "Report date out of range"))?;
        let next = unit.close_period(period.id, next_date).await.during(op)?;
        unit.commit().await.during(op)?;

        info!(
            closed = period.id,
            opened = next.id,
            report_date = %next.report_date,
            "Report period closed"
        );
        self.notifier.notify(UiEvent::ReportPeriodClosed);
        Ok(next)
    }

    async fn report_id(&self, op: Operation, report_id: Option<i64>) -> TillResult<i64> {
        self.ready(op).await?;
        match report_id {
            Some(id) => Ok(id),
            None => Ok(self.ledger.current_period().await.during(op)?.id),
        }
    }
}
