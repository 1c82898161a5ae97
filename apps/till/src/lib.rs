//! # Rasoi Till
//!
//! The terminal service layer of Rasoi POS: every entry point the billing
//! and captain screens call, plus the collaborators those entry points talk
//! to.
//!
//! ## Module Organization
//! ```text
//! rasoi_till/
//! ├── lib.rs          ◄─── You are here (exports & logging setup)
//! ├── state.rs        ◄─── Till<L, P, R, N>: one terminal's wiring
//! ├── commands/
//! │   ├── kot.rs      ◄─── Orders, lines, kitchen tickets
//! │   ├── billing.rs  ◄─── Finalize, clear, room posting, duplicates
//! │   └── report.rs   ◄─── End-of-day reports, clearance
//! ├── printer/        ◄─── ReceiptPrinter trait, ESC/POS over TCP 9100
//! ├── room.rs         ◄─── Room-account REST gateway
//! ├── signing.rs      ◄─── SigV4 request signer
//! ├── notify.rs       ◄─── UI "something changed" events
//! ├── config.rs       ◄─── till.toml + RASOI_* overrides
//! ├── cli.rs          ◄─── Back-office `till` subcommands
//! └── error.rs        ◄─── TillError and the ApiError alert form
//! ```
//!
//! ## Wiring
//! ```rust,ignore
//! let config = TillConfig::load(None)?;
//! let db = Database::new(DbConfig::new(config.database_path()?)).await?;
//! let till = Till::new(
//!     db.ledger(),
//!     NetworkPrinter::from_addr(&config.printer.address)?,
//!     HttpRoomAccount::new(&config.room_account)?,
//!     BroadcastNotifier::default(),
//!     config,
//! );
//! let bill = till.finalize_bill(&order_id, 10, true).await?;
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod notify;
pub mod printer;
pub mod room;
pub mod signing;
pub mod state;

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use config::TillConfig;
pub use error::{ApiError, ErrorCode, Operation, TillError, TillResult};
pub use notify::{BroadcastNotifier, NoOpNotifier, Notifier, UiEvent};
pub use printer::{NetworkPrinter, ReceiptPrinter};
pub use room::{HttpRoomAccount, RoomAccountGateway};
pub use state::Till;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=rasoi=trace` - Show trace for rasoi crates only
/// - Default: INFO, DEBUG for rasoi crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rasoi=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}
