//! # Error Types
//!
//! Domain-specific error types for rasoi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rasoi-core errors (this file)                                         │
//! │  ├── CoreError        - Billing rule violations                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rasoi-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  rasoi-till errors (app)                                               │
//! │  ├── TillError        - Named failure kinds per operation              │
//! │  └── ApiError         - What the billing screen shows (serialized)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → TillError → ApiError → alert      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::{GstCategory, GstRate, OrderStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Lines of one GST category carry different GST rates.
    ///
    /// ## When This Occurs
    /// - A menu item's GST rate was edited while older lines for the same
    ///   category were still open on an order
    /// - Bad data imported into the menu master
    ///
    /// The breakdown is never averaged over mixed rates; the bill is refused
    /// until the offending line is cancelled and re-added.
    #[error("GST category {category} has inconsistent rates: {first} and {second}")]
    InconsistentGstRate {
        category: GstCategory,
        first: GstRate,
        second: GstRate,
    },

    /// A bill was requested for an order with no active lines.
    ///
    /// ## User Workflow
    /// ```text
    /// Cashier presses "Bill" on table 7
    ///      │
    ///      ▼
    /// All lines on the order are cancelled
    ///      │
    ///      ▼
    /// NothingToBill { order_id } → "Order has no billable items"
    /// ```
    #[error("Order {order_id} has no billable items")]
    NothingToBill { order_id: String },

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Adding items to an order that has already been billed
    /// - Finalizing an order twice
    /// - Clearing a bill that was already settled
    #[error("Order {order_id} is {current}, expected {expected}")]
    InvalidOrderStatus {
        order_id: String,
        current: OrderStatus,
        expected: OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InconsistentGstRate {
            category: GstCategory::General,
            first: GstRate::from_percent(5),
            second: GstRate::from_percent(18),
        };
        assert_eq!(
            err.to_string(),
            "GST category General has inconsistent rates: 5% and 18%"
        );

        let err = CoreError::InvalidOrderStatus {
            order_id: "o-1".to_string(),
            current: OrderStatus::Billed,
            expected: OrderStatus::Open,
        };
        assert_eq!(err.to_string(), "Order o-1 is billed, expected open");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "item_code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
