//! # Billing Commands
//!
//! Finalize an open order into a numbered bill, then settle it with a
//! payment mode or post it to a hotel room.
//!
//! ## Finalize Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 finalize_bill(order_id, discount, print)                │
//! │                                                                         │
//! │  begin ─► order Open? ─► Open → Pending ─► breakdown from stored lines  │
//! │                                                  │                      │
//! │                          next_counter(Bill) ◄────┘                      │
//! │                                  │                                      │
//! │                          insert bill + snapshot                         │
//! │                                  │                                      │
//! │                 print? ──yes──► check + send ──fail──► rollback         │
//! │                    │                 │               (order Open,       │
//! │                    no               ok                counter as before)│
//! │                    └────────┬────────┘                                  │
//! │                             ▼                                           │
//! │                          commit ─► notify                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter increment is undone with the rest of the unit, so a failed
//! print never leaves a gap in the bill numbers.

use chrono::{Local, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{Classify, During, Operation, TillError, TillResult};
use crate::notify::{Notifier, UiEvent};
use crate::printer::ReceiptPrinter;
use crate::room::{RoomAccountGateway, RoomPosting};
use crate::state::Till;
use rasoi_core::bill_id::{bill_prefix, format_bill_id};
use rasoi_core::receipt::{BillReceipt, Receipt};
use rasoi_core::validation::validate_room_no;
use rasoi_core::{
    compute_breakdown, Bill, BillBreakdown, CoreError, DiscountPercent, OrderStatus, Payment,
    PaymentMode, PendingBill,
};
use rasoi_db::{Counter, Ledger, LedgerUnit};

impl<L, P, R, N> Till<L, P, R, N>
where
    L: Ledger,
    P: ReceiptPrinter,
    R: RoomAccountGateway,
    N: Notifier,
{
    /// The breakdown the billing form shows for the order's active lines.
    /// `None` when every line is cancelled; an unknown order is rejected.
    pub async fn preview_breakdown(
        &self,
        order_id: &str,
        discount: u8,
    ) -> TillResult<Option<BillBreakdown>> {
        let op = Operation::Lookup;
        self.ready(op).await?;

        let discount = DiscountPercent::new(discount).during(op)?;
        if self.ledger.order(order_id).await.during(op)?.is_none() {
            return Err(TillError::validation(op, format!("Order {} not found", order_id)));
        }
        let lines = self.ledger.order_lines(order_id).await.during(op)?;
        compute_breakdown(&lines, discount).during(op)
    }

    /// Finalizes an open order into a pending bill.
    ///
    /// With `print`, the receipt is sent inside the unit and any printer
    /// failure rolls the whole finalize back.
    pub async fn finalize_bill(&self, order_id: &str, discount: u8, print: bool) -> TillResult<Bill> {
        let op = Operation::Finalize;
        self.ready(op).await?;

        let discount = DiscountPercent::new(discount).during(op)?;
        let mut unit = self.ledger.begin().await.during(op)?;

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
        if !unit
            .transition_order(order_id, OrderStatus::Open, OrderStatus::Pending)
            .await
            .during(op)?
        {
            return Err(TillError::conflict(
                op,
                format!("Order {} was finalized by another terminal", order_id),
            ));
        }

        let lines = unit.order_lines(order_id).await.during(op)?;
        let breakdown = compute_breakdown(&lines, discount)
            .during(op)?
            .ok_or_else(|| {
                CoreError::NothingToBill {
                    order_id: order_id.to_string(),
                }
                .classify(op)
            })?;

        let bill_no = unit.next_counter(Counter::Bill).await.during(op)?;
        let now = Local::now().naive_local();
        let client = &self.config.terminal.client_name;
        let suffix = self.config.fiscal_suffix(now.date());
        let bill = Bill {
            bill_no,
            bill_id: format_bill_id(bill_no, client, &suffix),
            prefix: bill_prefix(client).to_string(),
            suffix,
            order_id: order.id.clone(),
            bill_date: now.date(),
            bill_time: now.time(),
            breakdown,
        };
        unit.insert_bill(&bill).await.during(op)?;

        if print {
            let receipt = BillReceipt::build(
                self.config.receipt_header(),
                &bill,
                &order.table_no,
                &lines,
                false,
            );
            if let Err(err) = self.print_receipt(op, &Receipt::Bill(receipt)).await {
                warn!(order_id, bill_id = %bill.bill_id, "Bill print failed, rolling back");
                if let Err(rollback) = unit.rollback().await {
                    error!(order_id, error = %rollback, "Rollback after print failure failed");
                }
                return Err(err);
            }
        }

        unit.commit().await.during(op)?;

        info!(
            order_id,
            bill_id = %bill.bill_id,
            grand_total = %bill.breakdown.grand_total,
            discount = bill.breakdown.discount_percent.value(),
            printed = print,
            "Bill finalized"
        );
        self.notifier.notify(UiEvent::PendingBillsUpdated);
        self.notifier.notify(UiEvent::OrdersUpdated);
        Ok(bill)
    }

    /// Finalized bills awaiting payment.
    pub async fn pending_bills(&self) -> TillResult<Vec<PendingBill>> {
        let op = Operation::Lookup;
        self.ready(op).await?;
        self.ledger.pending_bills().await.during(op)
    }

    /// The number the next finalized bill will get.
    pub async fn next_bill_number(&self) -> TillResult<i64> {
        let op = Operation::Lookup;
        self.ready(op).await?;
        self.ledger.peek_counter(Counter::Bill).await.during(op)
    }

    /// Settles a pending bill with a counter payment mode.
    pub async fn clear_pending_bill(&self, bill_id: &str, mode: PaymentMode) -> TillResult<Payment> {
        let op = Operation::Clear;
        self.ready(op).await?;

        if mode == PaymentMode::RoomAccount {
            return Err(TillError::validation(
                op,
                "Room account payments go through room posting",
            ));
        }

        let mut unit = self.ledger.begin().await.during(op)?;
        let bill = settle_order(&mut unit, op, bill_id).await?;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            bill_id: bill.bill_id.clone(),
            mode,
            amount: bill.breakdown.grand_total,
            room_no: None,
            paid_at: Utc::now(),
        };
        unit.insert_payment(&payment).await.during(op)?;
        unit.commit().await.during(op)?;

        info!(bill_id, mode = mode.label(), amount = %payment.amount, "Bill cleared");
        self.notifier.notify(UiEvent::PendingBillsUpdated);
        Ok(payment)
    }

    /// Charges a pending bill to a hotel room.
    ///
    /// The local transition commits only if the room-account server
    /// answers 200; anything else rolls it back.
    pub async fn submit_to_room(&self, bill_id: &str, room_no: &str) -> TillResult<Payment> {
        let op = Operation::SubmitToRoom;
        self.ready(op).await?;

        let room_no = validate_room_no(room_no).during(op)?;
        let room: u32 = room_no
            .parse()
            .map_err(|_| TillError::validation(op, format!("Invalid room number {}", room_no)))?;

        let mut unit = self.ledger.begin().await.during(op)?;
        let bill = settle_order(&mut unit, op, bill_id).await?;

        let items: Vec<_> = unit
            .order_lines(&bill.order_id)
            .await
            .during(op)?
            .into_iter()
            .filter(|line| line.is_active())
            .collect();

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            bill_id: bill.bill_id.clone(),
            mode: PaymentMode::RoomAccount,
            amount: bill.breakdown.grand_total,
            room_no: Some(room_no.clone()),
            paid_at: Utc::now(),
        };
        unit.insert_payment(&payment).await.during(op)?;

        let posting = RoomPosting {
            bill_info: bill,
            room_no: room,
            items_info: items,
            client_name: self.config.terminal.client_name.clone(),
        };
        if let Err(err) = self.room.post_bill(&posting).await {
            warn!(bill_id, room_no = %room_no, error = %err, "Room posting failed, rolling back");
            if let Err(rollback) = unit.rollback().await {
                error!(bill_id, error = %rollback, "Rollback after room posting failure failed");
            }
            return Err(err.classify(op));
        }
        unit.commit().await.during(op)?;

        info!(bill_id, room_no = %room_no, amount = %payment.amount, "Bill posted to room");
        self.notifier.notify(UiEvent::PendingBillsUpdated);
        Ok(payment)
    }

    /// The stored bill rebuilt as a receipt marked DUPLICATE.
    pub async fn duplicate_bill(&self, bill_id: &str) -> TillResult<BillReceipt> {
        let op = Operation::Duplicate;
        self.ready(op).await?;

        let bill = self
            .ledger
            .bill(bill_id)
            .await
            .during(op)?
            .ok_or_else(|| TillError::validation(op, format!("Bill {} not found", bill_id)))?;
        let order = self
            .ledger
            .order(&bill.order_id)
            .await
            .during(op)?
            .ok_or_else(|| {
                TillError::validation(op, format!("Order {} not found", bill.order_id))
            })?;
        let lines = self.ledger.order_lines(&bill.order_id).await.during(op)?;

        Ok(BillReceipt::build(
            self.config.receipt_header(),
            &bill,
            &order.table_no,
            &lines,
            true,
        ))
    }

    pub async fn print_duplicate_bill(&self, bill_id: &str) -> TillResult<BillReceipt> {
        let receipt = self.duplicate_bill(bill_id).await?;
        self.print_receipt(Operation::Duplicate, &Receipt::Bill(receipt.clone()))
            .await?;
        info!(bill_id, "Duplicate bill printed");
        Ok(receipt)
    }
}

/// Loads the bill and moves its order from Pending to Billed.
async fn settle_order<U: LedgerUnit>(
    unit: &mut U,
    op: Operation,
    bill_id: &str,
) -> TillResult<Bill> {
    let bill = unit
        .bill(bill_id)
        .await
        .during(op)?
        .ok_or_else(|| TillError::validation(op, format!("Bill {} not found", bill_id)))?;

    if !unit
        .transition_order(&bill.order_id, OrderStatus::Pending, OrderStatus::Billed)
        .await
        .during(op)?
    {
        return Err(TillError::conflict(
            op,
            format!("Bill {} is already settled", bill_id),
        ));
    }
    Ok(bill)
}

#[cfg(test)]
mod tests {
    use crate::commands::testing::{test_till, TestTill};
    use crate::error::TillError;
    use crate::notify::UiEvent;
    use rasoi_core::receipt::Receipt;
    use rasoi_core::{Money, OrderStatus, OrderType, PaymentMode};
    use rasoi_db::{Counter, Ledger};

    async fn order_with(till: &TestTill, table: &str, items: &[(&str, i64)]) -> String {
        let (first, qty) = items[0];
        let opened = till
            .add_item_to_new_order(table, "Ravi", OrderType::DineIn, first, qty)
            .await
            .unwrap();
        for (code, qty) in &items[1..] {
            till.add_item_to_order(&opened.order.id, code, *qty)
                .await
                .unwrap();
        }
        opened.order.id
    }

    async fn status(till: &TestTill, order_id: &str) -> OrderStatus {
        till.ledger().order(order_id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_simple_food_bill() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2)]).await;

        let bill = till.finalize_bill(&order_id, 0, false).await.unwrap();

        assert_eq!(bill.bill_no, 1);
        assert_eq!(bill.bill_id, "R1-26/27");
        assert_eq!(bill.prefix, "R");
        assert_eq!(bill.breakdown.cgst_amount, Money::from_rupees(5));
        assert_eq!(bill.breakdown.grand_total, Money::from_rupees(210));
        assert_eq!(status(&till, &order_id).await, OrderStatus::Pending);
        assert_eq!(till.next_bill_number().await.unwrap(), 2);
        assert!(till.printer().printed().is_empty());
    }

    #[tokio::test]
    async fn test_finalize_with_print_sends_receipt() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2), ("KF", 1)]).await;

        let bill = till.finalize_bill(&order_id, 10, true).await.unwrap();

        let printed = till.printer().printed();
        assert_eq!(printed.len(), 1);
        match &printed[0] {
            Receipt::Bill(receipt) => {
                assert_eq!(receipt.bill_id, bill.bill_id);
                assert!(!receipt.duplicate);
                assert!(receipt.food.is_some() && receipt.beverage.is_some());
            }
            other => panic!("unexpected receipt {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_finalizes_take_contiguous_numbers() {
        let till = test_till().await;
        let a = order_with(&till, "1", &[("PNT", 1)]).await;
        let b = order_with(&till, "2", &[("DAL", 1)]).await;
        let c = order_with(&till, "3", &[("WSK", 2)]).await;

        let (ra, rb, rc) = tokio::join!(
            till.finalize_bill(&a, 0, false),
            till.finalize_bill(&b, 0, false),
            till.finalize_bill(&c, 0, false),
        );

        let mut numbers = vec![
            ra.unwrap().bill_no,
            rb.unwrap().bill_no,
            rc.unwrap().bill_no,
        ];
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(till.next_bill_number().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_finalize_twice_is_a_conflict() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 1)]).await;

        till.finalize_bill(&order_id, 0, false).await.unwrap();
        let err = till.finalize_bill(&order_id, 0, false).await.unwrap_err();

        assert!(matches!(err, TillError::ConflictOrAlreadyProcessed { .. }));
        assert_eq!(till.next_bill_number().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_offline_printer_rolls_back_finalize() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2)]).await;
        till.printer().set_offline(true);

        let err = till.finalize_bill(&order_id, 0, true).await.unwrap_err();

        assert!(matches!(err, TillError::PrinterUnavailable { .. }));
        assert_eq!(status(&till, &order_id).await, OrderStatus::Open);
        assert_eq!(till.ledger().peek_counter(Counter::Bill).await.unwrap(), 1);
        assert!(till.pending_bills().await.unwrap().is_empty());
        assert!(!till.notifier().events().contains(&UiEvent::PendingBillsUpdated));

        // Retry once the printer is back reuses the same number.
        till.printer().set_offline(false);
        let bill = till.finalize_bill(&order_id, 0, true).await.unwrap();
        assert_eq!(bill.bill_no, 1);
    }

    #[tokio::test]
    async fn test_send_failure_rolls_back_finalize() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2)]).await;
        till.printer().set_fail_send(true);

        let err = till.finalize_bill(&order_id, 0, true).await.unwrap_err();

        assert!(matches!(err, TillError::PrinterUnavailable { .. }));
        assert_eq!(status(&till, &order_id).await, OrderStatus::Open);
        assert_eq!(till.next_bill_number().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_mid_unit_rolls_back() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2)]).await;
        till.ledger().fail_bill_inserts(true);

        let err = till.finalize_bill(&order_id, 0, false).await.unwrap_err();

        assert!(matches!(err, TillError::Failed { .. }));
        assert_eq!(status(&till, &order_id).await, OrderStatus::Open);
        assert_eq!(till.next_bill_number().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_finalize_rejects_bad_input() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 1)]).await;

        let err = till.finalize_bill(&order_id, 101, false).await.unwrap_err();
        assert!(matches!(err, TillError::ValidationFailed { .. }));

        let err = till.finalize_bill("missing", 0, false).await.unwrap_err();
        assert!(matches!(err, TillError::ValidationFailed { .. }));

        let line_id = till.ledger().order_lines(&order_id).await.unwrap()[0].id.clone();
        till.cancel_line(&order_id, &line_id).await.unwrap();
        let err = till.finalize_bill(&order_id, 0, false).await.unwrap_err();
        assert!(matches!(err, TillError::ValidationFailed { .. }));
        assert_eq!(status(&till, &order_id).await, OrderStatus::Open);
    }

    #[tokio::test]
    async fn test_preview_matches_finalized_snapshot() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 3), ("DAL", 1), ("WSK", 2)]).await;

        let preview = till.preview_breakdown(&order_id, 15).await.unwrap().unwrap();
        let bill = till.finalize_bill(&order_id, 15, false).await.unwrap();

        assert_eq!(preview, bill.breakdown);
    }

    #[tokio::test]
    async fn test_preview_tells_unknown_order_from_empty_order() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 1)]).await;
        let line_id = till.ledger().order_lines(&order_id).await.unwrap()[0].id.clone();
        till.cancel_line(&order_id, &line_id).await.unwrap();

        assert!(till.preview_breakdown(&order_id, 0).await.unwrap().is_none());

        let err = till.preview_breakdown("missing", 0).await.unwrap_err();
        assert!(matches!(err, TillError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn test_clear_pending_bill() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2)]).await;
        let bill = till.finalize_bill(&order_id, 0, false).await.unwrap();

        let pending = till.pending_bills().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].grand_total, Money::from_rupees(210));

        let payment = till
            .clear_pending_bill(&bill.bill_id, PaymentMode::Upi)
            .await
            .unwrap();
        assert_eq!(payment.amount, Money::from_rupees(210));
        assert_eq!(status(&till, &order_id).await, OrderStatus::Billed);
        assert!(till.pending_bills().await.unwrap().is_empty());

        let err = till
            .clear_pending_bill(&bill.bill_id, PaymentMode::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, TillError::ConflictOrAlreadyProcessed { .. }));
    }

    #[tokio::test]
    async fn test_clear_refuses_room_account() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2)]).await;
        let bill = till.finalize_bill(&order_id, 0, false).await.unwrap();

        let err = till
            .clear_pending_bill(&bill.bill_id, PaymentMode::RoomAccount)
            .await
            .unwrap_err();

        assert!(matches!(err, TillError::ValidationFailed { .. }));
        assert_eq!(status(&till, &order_id).await, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_submit_to_room_posts_and_settles() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2), ("KF", 1)]).await;
        let bill = till.finalize_bill(&order_id, 0, false).await.unwrap();

        let payment = till.submit_to_room(&bill.bill_id, "204").await.unwrap();

        assert_eq!(payment.mode, PaymentMode::RoomAccount);
        assert_eq!(payment.room_no.as_deref(), Some("204"));
        let posted = till.room.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].room_no, 204);
        assert_eq!(posted[0].items_info.len(), 2);
        assert_eq!(posted[0].client_name, "Restaurant");
        assert_eq!(status(&till, &order_id).await, OrderStatus::Billed);
    }

    #[tokio::test]
    async fn test_room_rejection_rolls_back() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2)]).await;
        let bill = till.finalize_bill(&order_id, 0, false).await.unwrap();
        till.room.reject_with(409, "room 204 is checked out");

        let err = till.submit_to_room(&bill.bill_id, "204").await.unwrap_err();

        match err {
            TillError::UpstreamRejected { status, message, .. } => {
                assert_eq!(status, Some(409));
                assert_eq!(message, "room 204 is checked out");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(status(&till, &order_id).await, OrderStatus::Pending);
        assert_eq!(till.pending_bills().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_room_number_must_be_digits() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2)]).await;
        let bill = till.finalize_bill(&order_id, 0, false).await.unwrap();

        let err = till.submit_to_room(&bill.bill_id, "2O4").await.unwrap_err();

        assert!(matches!(err, TillError::ValidationFailed { .. }));
        assert!(till.room.posted().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_bill_matches_snapshot() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 2), ("PNT", 1), ("KF", 1)]).await;
        let bill = till.finalize_bill(&order_id, 0, false).await.unwrap();

        let receipt = till.print_duplicate_bill(&bill.bill_id).await.unwrap();

        assert!(receipt.duplicate);
        assert_eq!(receipt.breakdown, bill.breakdown);
        assert_eq!(receipt.table_no, "7");
        let food = receipt.food.unwrap();
        assert_eq!(food.lines.len(), 1);
        assert_eq!(food.lines[0].quantity, 3);
        assert_eq!(till.printer().printed().len(), 1);

        let err = till.duplicate_bill("R99-26/27").await.unwrap_err();
        assert!(matches!(err, TillError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn test_notifications_follow_commit() {
        let till = test_till().await;
        let order_id = order_with(&till, "7", &[("PNT", 1)]).await;
        let bill = till.finalize_bill(&order_id, 0, false).await.unwrap();
        till.clear_pending_bill(&bill.bill_id, PaymentMode::Cash)
            .await
            .unwrap();

        assert_eq!(
            till.notifier().events(),
            vec![
                UiEvent::OrdersUpdated,
                UiEvent::PendingBillsUpdated,
                UiEvent::OrdersUpdated,
                UiEvent::PendingBillsUpdated,
            ]
        );
    }
}
