//! # rasoi-core: Pure Billing Logic for Rasoi POS
//!
//! This crate is the **heart** of Rasoi POS. It contains the billing
//! computation and aggregation engines as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rasoi POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Billing / KOT screens (web view)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    rasoi-till (entry points)                    │   │
//! │  │   finalize_bill, clear_pending_bill, submit_to_room, print_kot  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rasoi-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │ aggregate │  │  billing  │  │  bill_id  │  │   │
//! │  │   │  Money    │  │ by code   │  │ breakdown │  │  R12-26/27│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │   types   │  │  receipt  │  │  report   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    rasoi-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in integer paise
//! - [`types`] - Domain types (MenuItem, OrderLineItem, Order, Bill, ...)
//! - [`aggregate`] - Aggregation Engine
//! - [`billing`] - Bill Computation Engine
//! - [`bill_id`] - Bill identifier and fiscal suffix policy
//! - [`receipt`] - Structured documents for the printer
//! - [`report`] - End-of-day report folds
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use rasoi_core::billing::compute_breakdown;
//! use rasoi_core::types::{DiscountPercent, GstCategory, GstRate, NewOrderLine, OrderLineItem};
//! use rasoi_core::Money;
//!
//! let new_line = NewOrderLine::new(
//!     "DAL", "Dal Makhani", Money::from_paise(10_000), 2,
//!     GstCategory::General, GstRate::from_percent(5),
//! ).unwrap();
//! let line = OrderLineItem::from_new("line-1", "order-1", &new_line);
//!
//! let breakdown = compute_breakdown(&[line], DiscountPercent::zero())
//!     .unwrap()
//!     .expect("one active line");
//! assert_eq!(breakdown.grand_total, Money::from_rupees(210));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod bill_id;
pub mod billing;
pub mod error;
pub mod money;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{aggregate, aggregate_for_report, AggregateLine};
pub use billing::{compute_breakdown, BillBreakdown};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single order line.
///
/// ## Business Reason
/// Catches a mistyped quantity (100 instead of 10) at the KOT screen.
pub const MAX_ITEM_QUANTITY: i64 = 999;
