//! Scripted collaborators for entry-point tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::config::TillConfig;
use crate::notify::{Notifier, UiEvent};
use crate::printer::{PrintError, PrintResult, ReceiptPrinter};
use crate::room::{RoomAccountGateway, RoomError, RoomPosting};
use crate::state::Till;
use rasoi_core::receipt::Receipt;
use rasoi_core::{GstCategory, GstRate, MenuItem, Money};
use rasoi_db::MemoryLedger;

pub(crate) type TestTill = Till<MemoryLedger, ScriptedPrinter, FakeRoom, RecordingNotifier>;

#[derive(Default)]
pub(crate) struct ScriptedPrinter {
    offline: AtomicBool,
    fail_send: AtomicBool,
    printed: Mutex<Vec<Receipt>>,
}

impl ScriptedPrinter {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    pub fn printed(&self) -> Vec<Receipt> {
        self.printed.lock().unwrap().clone()
    }
}

impl ReceiptPrinter for ScriptedPrinter {
    async fn is_connected(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }

    async fn print(&self, receipt: &Receipt) -> PrintResult<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(PrintError::Connection("paper jam".to_string()));
        }
        self.printed.lock().unwrap().push(receipt.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeRoom {
    reject_with: Mutex<Option<(u16, String)>>,
    posted: Mutex<Vec<RoomPosting>>,
}

impl FakeRoom {
    pub fn reject_with(&self, status: u16, body: &str) {
        *self.reject_with.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn posted(&self) -> Vec<RoomPosting> {
        self.posted.lock().unwrap().clone()
    }
}

impl RoomAccountGateway for FakeRoom {
    async fn post_bill(&self, posting: &RoomPosting) -> Result<(), RoomError> {
        if let Some((status, body)) = self.reject_with.lock().unwrap().clone() {
            return Err(RoomError::Rejected { status, body });
        }
        self.posted.lock().unwrap().push(posting.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn menu_item(code: &str, name: &str, rupees: i64, category: GstCategory, percent: u32) -> MenuItem {
    MenuItem {
        code: code.to_string(),
        name: name.to_string(),
        rate: Money::from_rupees(rupees),
        gst_category: category,
        gst_rate: GstRate::from_percent(percent),
        active: true,
    }
}

/// Till over an in-memory ledger with a small menu:
/// `PNT` food ₹100 @5%, `DAL` food ₹200 @5%, `WSK` liquor ₹100, `KF` beer ₹150.
pub(crate) async fn test_till() -> TestTill {
    let ledger = MemoryLedger::new(today());
    for item in [
        menu_item("PNT", "Paneer Tikka", 100, GstCategory::General, 5),
        menu_item("DAL", "Dal Makhani", 200, GstCategory::General, 5),
        menu_item("WSK", "Whisky 60ml", 100, GstCategory::Liquor, 0),
        menu_item("KF", "Kingfisher", 150, GstCategory::Beer, 0),
    ] {
        ledger.add_menu_item(item).await;
    }

    let mut config = TillConfig::default();
    config.terminal.fiscal_suffix = Some("26/27".to_string());

    Till::new(
        ledger,
        ScriptedPrinter::default(),
        FakeRoom::default(),
        RecordingNotifier::default(),
        config,
    )
}
