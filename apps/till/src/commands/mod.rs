//! # Till Entry Points
//!
//! Every entry point follows the same shape:
//!
//! ```text
//!   ready()? ── storage down ──► StorageUnavailable, nothing written
//!      │
//!   validate input ── bad ──► ValidationFailed, nothing written
//!      │
//!   ledger.begin()
//!      │  reads and writes through the unit only
//!      │  any `?` drops the unit ──► rolled back
//!      ▼
//!   unit.commit()
//!      │
//!   notifier.notify(..)   (after commit, best effort)
//! ```
//!
//! - [`kot`] - orders, lines, kitchen tickets
//! - [`billing`] - finalize, settle, room posting, duplicates
//! - [`report`] - end-of-day reports and clearance

pub mod billing;
pub mod kot;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;
