//! # Till State
//!
//! One terminal's wiring: the ledger it bills against and the collaborators
//! it talks to. Entry points live in [`crate::commands`] as `impl Till`
//! blocks.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Till<L, P, R, N>                                     │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐ │
//! │  │ L: Ledger    │  │ P: Receipt-  │  │ R: RoomAcc-  │  │ N: Notifier│ │
//! │  │              │  │    Printer   │  │    ountGate- │  │            │ │
//! │  │ SqliteLedger │  │ Network-     │  │    way       │  │ Broadcast  │ │
//! │  │ MemoryLedger │  │    Printer   │  │ HttpRoom-    │  │ NoOp       │ │
//! │  │              │  │              │  │    Account   │  │            │ │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘ │
//! │                                                                         │
//! │  TillConfig: client name, receipt header, fiscal suffix                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each entry point handles one UI event to completion; there is no
//! in-process locking beyond what the ledger's units provide.

use tracing::warn;

use crate::config::TillConfig;
use crate::error::{During, Operation, TillError, TillResult};
use crate::notify::Notifier;
use crate::printer::ReceiptPrinter;
use crate::room::RoomAccountGateway;
use rasoi_core::receipt::Receipt;
use rasoi_db::Ledger;

/// A billing terminal.
pub struct Till<L, P, R, N> {
    pub(crate) ledger: L,
    pub(crate) printer: P,
    pub(crate) room: R,
    pub(crate) notifier: N,
    pub(crate) config: TillConfig,
}

impl<L, P, R, N> Till<L, P, R, N>
where
    L: Ledger,
    P: ReceiptPrinter,
    R: RoomAccountGateway,
    N: Notifier,
{
    pub fn new(ledger: L, printer: P, room: R, notifier: N, config: TillConfig) -> Self {
        Till {
            ledger,
            printer,
            room,
            notifier,
            config,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn printer(&self) -> &P {
        &self.printer
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &TillConfig {
        &self.config
    }

    /// Precondition of every entry point: the store must be reachable
    /// before anything is read or written.
    pub(crate) async fn ready(&self, operation: Operation) -> TillResult<()> {
        if self.ledger.is_available().await {
            Ok(())
        } else {
            warn!(%operation, "Ledger not available");
            Err(TillError::storage_unavailable(operation))
        }
    }

    /// Checks the printer is reachable, then sends. Either failure is `PrinterUnavailable`.
    pub(crate) async fn print_receipt(
        &self,
        operation: Operation,
        receipt: &Receipt,
    ) -> TillResult<()> {
        if !self.printer.is_connected().await {
            return Err(TillError::printer(operation, "printer did not answer the connectivity check"));
        }
        self.printer.print(receipt).await.during(operation)
    }
}
