//! # KOT Commands
//!
//! Captains open orders and add items; the kitchen gets a ticket for every
//! batch of new lines and a void ticket for lines cancelled after it had
//! them.
//!
//! ## Line Flags
//! ```text
//!                     cancelled  printed  voided
//! added                   0         0        0     ──► next KOT
//! on a KOT                0         1        0
//! cancelled (unprinted)   1         0        0     ──► never printed
//! cancelled (printed)     1         0        1     ──► next void KOT
//! on a void KOT           1         1        1
//! ```

use chrono::Local;
use tracing::{debug, error, info};

use crate::error::{Classify, During, Operation, TillError, TillResult};
use crate::notify::{Notifier, UiEvent};
use crate::printer::ReceiptPrinter;
use crate::room::RoomAccountGateway;
use crate::state::Till;
use rasoi_core::receipt::{KotKind, KotReport, KotTicket, Receipt};
use rasoi_core::validation::validate_table_no;
use rasoi_core::{
    CoreError, NewOrderLine, OpenOrder, Order, OrderLineItem, OrderStatus, OrderType,
};
use rasoi_db::{Counter, Ledger, LedgerUnit, NewOrder};

impl<L, P, R, N> Till<L, P, R, N>
where
    L: Ledger,
    P: ReceiptPrinter,
    R: RoomAccountGateway,
    N: Notifier,
{
    /// Opens a new order on a table with its first item, taking the next
    /// KOT number in the same unit.
    pub async fn add_item_to_new_order(
        &self,
        table_no: &str,
        captain: &str,
        order_type: OrderType,
        item_code: &str,
        quantity: i64,
    ) -> TillResult<OpenOrder> {
        let op = Operation::AddItem;
        self.ready(op).await?;

        let table_no = validate_table_no(table_no).during(op)?;
        let line = self.menu_line(op, item_code, quantity).await?;

        let mut unit = self.ledger.begin().await.during(op)?;
        let period = unit.open_period().await.during(op)?;
        let kot_no = unit.next_counter(Counter::Kot).await.during(op)?;
        let order = unit
            .create_order(NewOrder {
                kot_no,
                table_no,
                captain: captain.trim().to_string(),
                order_type,
                report_id: period.id,
            })
            .await
            .during(op)?;
        let line = unit.insert_line(&order.id, &line).await.during(op)?;
        unit.commit().await.during(op)?;

        info!(order_id = %order.id, kot_no, table_no = %order.table_no, "Order opened");
        self.notifier.notify(UiEvent::OrdersUpdated);

        Ok(OpenOrder {
            order,
            lines: vec![line],
        })
    }

    /// Adds an item to an order that is still open.
    pub async fn add_item_to_order(
        &self,
        order_id: &str,
        item_code: &str,
        quantity: i64,
    ) -> TillResult<OrderLineItem> {
        let op = Operation::AddItem;
        self.ready(op).await?;

        let line = self.menu_line(op, item_code, quantity).await?;

        let mut unit = self.ledger.begin().await.during(op)?;
        let order = open_order(&mut unit, op, order_id).await?;
        let line = unit.insert_line(&order.id, &line).await.during(op)?;
        unit.commit().await.during(op)?;

        debug!(order_id, line_id = %line.id, item_code = %line.item_code, "Line added");
        self.notifier.notify(UiEvent::OrdersUpdated);
        Ok(line)
    }

    /// Soft-cancels a line. A line the kitchen already saw is flagged for
    /// the next void KOT.
    pub async fn cancel_line(&self, order_id: &str, line_id: &str) -> TillResult<OrderLineItem> {
        let op = Operation::CancelItem;
        self.ready(op).await?;

        let mut unit = self.ledger.begin().await.during(op)?;
        open_order(&mut unit, op, order_id).await?;

        match unit.line(line_id).await.during(op)? {
            Some(line) if line.order_id == order_id => {}
            _ => {
                return Err(TillError::validation(
                    op,
                    format!("Line {} not found on order {}", line_id, order_id),
                ))
            }
        }

        if !unit.cancel_line(line_id).await.during(op)? {
            return Err(TillError::conflict(
                op,
                format!("Line {} is already cancelled", line_id),
            ));
        }

        let line = unit
            .line(line_id)
            .await
            .during(op)?
            .ok_or_else(|| TillError::validation(op, format!("Line {} not found", line_id)))?;
        unit.commit().await.during(op)?;

        info!(order_id, line_id, voided = line.voided, "Line cancelled");
        self.notifier.notify(UiEvent::OrdersUpdated);
        Ok(line)
    }

    /// Prints the order's unprinted active lines and marks them printed.
    /// `None` when there is nothing new for the kitchen.
    pub async fn print_kot(&self, order_id: &str) -> TillResult<Option<KotTicket>> {
        self.print_ticket(order_id, KotKind::Regular).await
    }

    /// Prints lines cancelled after they reached the kitchen.
    pub async fn print_void_kot(&self, order_id: &str) -> TillResult<Option<KotTicket>> {
        self.print_ticket(order_id, KotKind::Void).await
    }

    /// Prints everything currently on the table. No state changes.
    pub async fn print_kot_report(&self, order_id: &str) -> TillResult<KotReport> {
        let op = Operation::PrintKot;
        self.ready(op).await?;

        let order = self
            .ledger
            .order(order_id)
            .await
            .during(op)?
            .ok_or_else(|| TillError::validation(op, format!("Order {} not found", order_id)))?;
        let lines = self.ledger.order_lines(order_id).await.during(op)?;

        let report = KotReport::for_order(&order, &lines, Local::now().date_naive());
        self.print_receipt(op, &Receipt::KotReport(report.clone()))
            .await?;
        Ok(report)
    }

    /// Every open order with all of its lines.
    pub async fn open_orders(&self) -> TillResult<Vec<OpenOrder>> {
        let op = Operation::Lookup;
        self.ready(op).await?;
        self.ledger.open_orders().await.during(op)
    }

    /// The KOT number the next new order will get.
    pub async fn next_kot_number(&self) -> TillResult<i64> {
        let op = Operation::Lookup;
        self.ready(op).await?;
        self.ledger.peek_counter(Counter::Kot).await.during(op)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn menu_line(
        &self,
        op: Operation,
        item_code: &str,
        quantity: i64,
    ) -> TillResult<NewOrderLine> {
        let item = self
            .ledger
            .menu_item(item_code.trim())
            .await
            .during(op)?
            .ok_or_else(|| {
                TillError::validation(op, format!("Menu item {} not found", item_code.trim()))
            })?;
        NewOrderLine::from_menu(&item, quantity).during(op)
    }

    async fn print_ticket(&self, order_id: &str, kind: KotKind) -> TillResult<Option<KotTicket>> {
        let op = Operation::PrintKot;
        self.ready(op).await?;

        let mut unit = self.ledger.begin().await.during(op)?;
        let order = unit
            .order(order_id)
            .await
            .during(op)?
            .ok_or_else(|| TillError::validation(op, format!("Order {} not found", order_id)))?;

        let due: Vec<OrderLineItem> = unit
            .order_lines(order_id)
            .await
            .during(op)?
            .into_iter()
            .filter(|line| match kind {
                KotKind::Regular => !line.cancelled && !line.printed,
                KotKind::Void => line.cancelled && line.voided && !line.printed,
            })
            .collect();

        if due.is_empty() {
            unit.rollback().await.during(op)?;
            debug!(order_id, ?kind, "Nothing to print");
            return Ok(None);
        }

        let ids: Vec<String> = due.iter().map(|line| line.id.clone()).collect();
        unit.mark_printed(&ids).await.during(op)?;

        let ticket = KotTicket::for_lines(kind, &order, &due, Local::now().naive_local());
        if let Err(err) = self.print_receipt(op, &Receipt::Kot(ticket.clone())).await {
            if let Err(rollback) = unit.rollback().await {
                error!(order_id, error = %rollback, "Rollback after print failure failed");
            }
            return Err(err);
        }
        unit.commit().await.during(op)?;

        info!(order_id, kot_no = order.kot_no, ?kind, lines = ids.len(), "KOT printed");
        self.notifier.notify(UiEvent::OrdersUpdated);
        Ok(Some(ticket))
    }
}

/// Loads an order through the unit and insists it is still open.
async fn open_order<U: LedgerUnit>(
    unit: &mut U,
    op: Operation,
    order_id: &str,
) -> TillResult<Order> {
    let order = unit
        .order(order_id)
        .await
        .during(op)?
        .ok_or_else(|| TillError::validation(op, format!("Order {} not found", order_id)))?;

    if order.status != OrderStatus::Open {
        return Err(CoreError::InvalidOrderStatus {
            order_id: order.id,
            current: order.status,
            expected: OrderStatus::Open,
        }
        .classify(op));
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use crate::commands::testing::test_till;
    use crate::error::TillError;
    use crate::notify::UiEvent;
    use rasoi_core::receipt::{KotKind, Receipt};
    use rasoi_core::{Money, OrderType};
    use rasoi_db::Ledger;

    #[tokio::test]
    async fn test_new_orders_take_consecutive_kot_numbers() {
        let till = test_till().await;

        let first = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "PNT", 2)
            .await
            .unwrap();
        let second = till
            .add_item_to_new_order("8", "Ravi", OrderType::DineIn, "DAL", 1)
            .await
            .unwrap();

        assert_eq!(first.order.kot_no, 1);
        assert_eq!(second.order.kot_no, 2);
        assert_eq!(first.lines[0].line_total, Money::from_rupees(200));
        assert_eq!(till.next_kot_number().await.unwrap(), 3);
        assert_eq!(till.open_orders().await.unwrap().len(), 2);
        assert_eq!(
            till.notifier().events(),
            vec![UiEvent::OrdersUpdated, UiEvent::OrdersUpdated]
        );
    }

    #[tokio::test]
    async fn test_unknown_item_writes_nothing() {
        let till = test_till().await;

        let err = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "NOPE", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, TillError::ValidationFailed { .. }));
        assert_eq!(till.next_kot_number().await.unwrap(), 1);
        assert!(till.notifier().events().is_empty());
    }

    #[tokio::test]
    async fn test_kot_prints_only_new_lines() {
        let till = test_till().await;
        let opened = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "PNT", 2)
            .await
            .unwrap();
        let order_id = opened.order.id.clone();

        let ticket = till.print_kot(&order_id).await.unwrap().unwrap();
        assert_eq!(ticket.lines.len(), 1);
        assert_eq!(ticket.lines[0].quantity, 2);

        assert!(till.print_kot(&order_id).await.unwrap().is_none());

        till.add_item_to_order(&order_id, "PNT", 1).await.unwrap();
        till.add_item_to_order(&order_id, "WSK", 1).await.unwrap();
        let ticket = till.print_kot(&order_id).await.unwrap().unwrap();
        assert_eq!(ticket.lines.len(), 2);
        assert_eq!(till.printer().printed().len(), 2);
    }

    #[tokio::test]
    async fn test_kot_print_failure_leaves_lines_unprinted() {
        let till = test_till().await;
        let opened = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "PNT", 2)
            .await
            .unwrap();
        let order_id = opened.order.id.clone();

        till.printer().set_offline(true);
        let err = till.print_kot(&order_id).await.unwrap_err();
        assert!(matches!(err, TillError::PrinterUnavailable { .. }));

        let lines = till.ledger().order_lines(&order_id).await.unwrap();
        assert!(!lines[0].printed);

        till.printer().set_offline(false);
        assert!(till.print_kot(&order_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cancel_after_print_goes_to_void_kot() {
        let till = test_till().await;
        let opened = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "PNT", 2)
            .await
            .unwrap();
        let order_id = opened.order.id.clone();
        let printed_line = opened.lines[0].id.clone();
        let dal = till.add_item_to_order(&order_id, "DAL", 1).await.unwrap();

        // DAL is cancelled before any KOT, so it never reaches the kitchen.
        let never_printed = till.cancel_line(&order_id, &dal.id).await.unwrap();
        assert!(never_printed.cancelled && !never_printed.voided);
        let ticket = till.print_kot(&order_id).await.unwrap().unwrap();
        assert_eq!(ticket.lines.len(), 1);

        let cancelled = till.cancel_line(&order_id, &printed_line).await.unwrap();
        assert!(cancelled.cancelled && cancelled.voided && !cancelled.printed);

        let void = till.print_void_kot(&order_id).await.unwrap().unwrap();
        assert_eq!(void.kind, KotKind::Void);
        assert_eq!(void.lines.len(), 1);
        assert_eq!(void.lines[0].item_code, "PNT");

        assert!(till.print_void_kot(&order_id).await.unwrap().is_none());
        assert!(matches!(
            till.printer().printed().last(),
            Some(Receipt::Kot(ticket)) if ticket.kind == KotKind::Void
        ));
    }

    #[tokio::test]
    async fn test_cancel_twice_is_a_conflict() {
        let till = test_till().await;
        let opened = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "PNT", 2)
            .await
            .unwrap();
        let order_id = opened.order.id.clone();
        let line_id = opened.lines[0].id.clone();

        till.cancel_line(&order_id, &line_id).await.unwrap();
        let err = till.cancel_line(&order_id, &line_id).await.unwrap_err();
        assert!(matches!(err, TillError::ConflictOrAlreadyProcessed { .. }));
    }

    #[tokio::test]
    async fn test_kot_report_prints_running_total() {
        let till = test_till().await;
        let opened = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "PNT", 2)
            .await
            .unwrap();
        let order_id = opened.order.id.clone();
        till.add_item_to_order(&order_id, "PNT", 1).await.unwrap();
        till.add_item_to_order(&order_id, "KF", 2).await.unwrap();

        let report = till.print_kot_report(&order_id).await.unwrap();
        assert_eq!(report.total, Money::from_rupees(600));
        assert_eq!(report.lines.len(), 2);
        assert_eq!(till.printer().printed().len(), 1);
    }

    #[tokio::test]
    async fn test_storage_unavailable_is_reported_first() {
        let till = test_till().await;
        till.ledger().set_available(false);

        let err = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "PNT", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TillError::StorageUnavailable { .. }));
        assert!(till.ledger().begin().await.is_err());
    }
}
