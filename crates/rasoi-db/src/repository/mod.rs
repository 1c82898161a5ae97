//! # Repository Module
//!
//! Read-side repositories for Rasoi POS.
//!
//! ## Reads vs Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screens / reports                     Till entry points                │
//! │       │                                     │                           │
//! │       │ db.bills().list_pending()           │ ledger.begin()            │
//! │       ▼                                     ▼                           │
//! │  Repositories (this module)            LedgerUnit (crate::ledger)       │
//! │  ├── MenuRepository                    one transaction, commit or       │
//! │  ├── OrderRepository                   roll back as a whole             │
//! │  ├── BillRepository                         │                           │
//! │  └── ReportRepository                       │                           │
//! │       │                                     │                           │
//! │       └──────────── shared fetch_* SQL ─────┘                           │
//! │                           │                                             │
//! │                           ▼                                             │
//! │                    SQLite Database                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The menu master is the one table edited outside a ledger unit.

pub mod bill;
pub mod menu;
pub mod order;
pub mod report;
