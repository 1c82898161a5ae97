//! # Receipt Printer
//!
//! The printer collaborator: a bounded-time connectivity check and a send.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Printing a Receipt                               │
//! │                                                                         │
//! │  Receipt (rasoi-core)                                                  │
//! │       │   structured lines, totals, no layout                          │
//! │       ▼                                                                 │
//! │  escpos::render(receipt, width)                                        │
//! │       │   ESC/POS bytes                                                │
//! │       ▼                                                                 │
//! │  NetworkPrinter ── TCP 9100 ──► thermal printer                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod escpos;
mod network;

pub use escpos::EscPosBuilder;
pub use network::NetworkPrinter;

use thiserror::Error;

use rasoi_core::receipt::Receipt;

/// Anything that can put a receipt on paper.
#[allow(async_fn_in_trait)]
pub trait ReceiptPrinter {
    /// Bounded-time connectivity check. `false` on timeout.
    async fn is_connected(&self) -> bool;

    /// Renders and sends one receipt.
    async fn print(&self, receipt: &Receipt) -> PrintResult<()>;
}

/// Printer errors.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Printer offline: {0}")]
    Offline(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type PrintResult<T> = Result<T, PrintError>;
