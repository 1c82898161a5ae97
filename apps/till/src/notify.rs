//! # UI Notifications
//!
//! Fire-and-forget "something changed" events. Listeners re-fetch state
//! when they hear one, so a lost event only delays a screen refresh.
//!
//! ```text
//! entry point ── commit ──► notifier.notify(UiEvent::PendingBillsUpdated)
//!                                  │
//!                                  ├──► billing screen (re-fetches pending)
//!                                  └──► nobody listening: dropped
//! ```

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiEvent {
    /// Orders or their lines changed (new KOT, item added or cancelled).
    OrdersUpdated,
    /// A bill was finalized, cleared or posted to a room.
    PendingBillsUpdated,
    /// The business day was closed.
    ReportPeriodClosed,
}

/// Best-effort event sink. Must never block or fail the caller.
pub trait Notifier {
    fn notify(&self, event: UiEvent);
}

/// Fans events out over a `tokio::sync::broadcast` channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<UiEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, event: UiEvent) {
        // No receivers is not an error here.
        let receivers = self.tx.send(event).unwrap_or(0);
        debug!(?event, receivers, "UI event sent");
    }
}

/// Drops every event. Used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _event: UiEvent) {}
}
