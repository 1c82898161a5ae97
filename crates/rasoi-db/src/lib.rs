//! # rasoi-db: Database Layer for Rasoi POS
//!
//! This crate provides durable storage for the Rasoi POS till.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rasoi POS Data Flow                              │
//! │                                                                         │
//! │  Till entry point (finalize_bill)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     rasoi-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Ledger     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  SqliteUnit   │    │  (embedded)  │  │   │
//! │  │   │               │    │  MemoryUnit   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│               │    │ 001_init.sql │  │   │
//! │  │   │               │    │ Repositories  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Read repositories (menu, orders, bills, reports)
//! - [`ledger`] - Atomic units of work for the till's entry points
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rasoi_db::{Counter, Database, DbConfig, Ledger, LedgerUnit};
//!
//! let db = Database::new(DbConfig::new("path/to/rasoi.db")).await?;
//!
//! let ledger = db.ledger();
//! let mut unit = ledger.begin().await?;
//! let bill_no = unit.next_counter(Counter::Bill).await?;
//! unit.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::{
    Counter, Ledger, LedgerUnit, MemoryLedger, MemoryUnit, NewOrder, SqliteLedger, SqliteUnit,
};
pub use pool::{Database, DbConfig};

pub use repository::bill::BillRepository;
pub use repository::menu::MenuRepository;
pub use repository::order::OrderRepository;
pub use repository::report::ReportRepository;
