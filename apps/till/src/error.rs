//! # Till Error Types
//!
//! The closed set of failure kinds every entry point reports.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Till                               │
//! │                                                                         │
//! │  Entry point (finalize_bill)                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CoreError ─────┐                                                │  │
//! │  │  DbError ───────┼── .during(Operation::Finalize) ──► TillError   │  │
//! │  │  PrintError ────┘                                      │         │  │
//! │  └────────────────────────────────────────────────────────┼─────────┘  │
//! │                                                           ▼            │
//! │                                    ApiError { code, heading, message } │
//! │                                                           │            │
//! │                                                           ▼            │
//! │                                              one alert on the screen   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The unit of work is dropped (rolled back) before the error leaves the
//! entry point, so a `TillError` never describes a half-applied change.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::printer::PrintError;
use rasoi_core::{CoreError, ValidationError};
use rasoi_db::DbError;

// =============================================================================
// Operation
// =============================================================================

/// The entry point a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Finalize,
    Clear,
    SubmitToRoom,
    AddItem,
    CancelItem,
    PrintKot,
    Duplicate,
    Report,
    Clearance,
    /// Screen reads (open orders, pending list, counters).
    Lookup,
}

impl Operation {
    /// Alert heading shown to the cashier.
    pub const fn heading(&self) -> &'static str {
        match self {
            Operation::Finalize => "Bill Failed",
            Operation::Clear => "Clear Bill Failed",
            Operation::SubmitToRoom => "Room Posting Failed",
            Operation::AddItem => "Add Item Failed",
            Operation::CancelItem => "Cancel Item Failed",
            Operation::PrintKot => "KOT Print Failed",
            Operation::Duplicate => "Duplicate Bill Failed",
            Operation::Report => "Report Failed",
            Operation::Clearance => "Clearance Failed",
            Operation::Lookup => "Load Failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Finalize => "finalize",
            Operation::Clear => "clear",
            Operation::SubmitToRoom => "submit-to-room",
            Operation::AddItem => "add-item",
            Operation::CancelItem => "cancel-item",
            Operation::PrintKot => "print-kot",
            Operation::Duplicate => "duplicate",
            Operation::Report => "report",
            Operation::Clearance => "clearance",
            Operation::Lookup => "lookup",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Till Error
// =============================================================================

/// Failure of a till entry point.
#[derive(Debug, Error)]
pub enum TillError {
    /// The durable store is not initialized or cannot be reached.
    /// Nothing was written.
    #[error("{operation}: storage is not initialized")]
    StorageUnavailable { operation: Operation },

    /// The input was rejected before any state changed.
    ///
    /// ## When This Occurs
    /// - Discount outside 0..=100
    /// - A GST category with mixed rates
    /// - Billing an order with no active lines
    /// - Unknown order, bill or menu item
    #[error("{operation}: {message}")]
    ValidationFailed { operation: Operation, message: String },

    /// Someone else already moved the order or bill on.
    ///
    /// ## When This Occurs
    /// - Finalizing an order that is already pending
    /// - Clearing a bill twice from two terminals
    /// - Cancelling a line that is already cancelled
    /// - Clearance while tables are still open
    #[error("{operation}: {message}")]
    ConflictOrAlreadyProcessed { operation: Operation, message: String },

    /// The printer did not answer the connectivity check or the send failed.
    /// The UI can offer "retry print" without re-billing.
    #[error("{operation}: printer not connected ({message})")]
    PrinterUnavailable { operation: Operation, message: String },

    /// The room-account server refused the posting.
    /// `status` is `None` when the request never got a response.
    #[error("{operation}: room account rejected the posting (status {status:?}): {message}")]
    UpstreamRejected {
        operation: Operation,
        status: Option<u16>,
        message: String,
    },

    /// A storage step failed mid-unit while the store stayed reachable;
    /// the unit was rolled back. Only the operation tells callers apart.
    #[error("{operation} failed: {message}")]
    Failed { operation: Operation, message: String },
}

impl TillError {
    pub fn storage_unavailable(operation: Operation) -> Self {
        TillError::StorageUnavailable { operation }
    }

    pub fn validation(operation: Operation, message: impl Into<String>) -> Self {
        TillError::ValidationFailed {
            operation,
            message: message.into(),
        }
    }

    pub fn conflict(operation: Operation, message: impl Into<String>) -> Self {
        TillError::ConflictOrAlreadyProcessed {
            operation,
            message: message.into(),
        }
    }

    pub fn printer(operation: Operation, message: impl Into<String>) -> Self {
        TillError::PrinterUnavailable {
            operation,
            message: message.into(),
        }
    }

    /// The entry point the failure belongs to.
    pub fn operation(&self) -> Operation {
        match self {
            TillError::StorageUnavailable { operation }
            | TillError::ValidationFailed { operation, .. }
            | TillError::ConflictOrAlreadyProcessed { operation, .. }
            | TillError::PrinterUnavailable { operation, .. }
            | TillError::UpstreamRejected { operation, .. }
            | TillError::Failed { operation, .. } => *operation,
        }
    }
}

/// Convenience type alias for Results with TillError.
pub type TillResult<T> = Result<T, TillError>;

// =============================================================================
// Classification
// =============================================================================

/// Lower-level errors that know which `TillError` kind they are.
pub trait Classify {
    fn classify(self, operation: Operation) -> TillError;
}

impl Classify for CoreError {
    fn classify(self, operation: Operation) -> TillError {
        match self {
            CoreError::InvalidOrderStatus { .. } => TillError::conflict(operation, self.to_string()),
            _ => TillError::validation(operation, self.to_string()),
        }
    }
}

impl Classify for ValidationError {
    fn classify(self, operation: Operation) -> TillError {
        TillError::validation(operation, self.to_string())
    }
}

impl Classify for DbError {
    fn classify(self, operation: Operation) -> TillError {
        if self.is_unavailable() {
            error!(operation = %operation, error = %self, "Storage unavailable");
            return TillError::storage_unavailable(operation);
        }
        match self {
            DbError::NotFound { .. } => TillError::validation(operation, self.to_string()),
            DbError::UniqueViolation { .. } => TillError::conflict(operation, self.to_string()),
            other => {
                error!(operation = %operation, error = %other, "Storage step failed");
                TillError::Failed {
                    operation,
                    message: other.to_string(),
                }
            }
        }
    }
}

impl Classify for PrintError {
    fn classify(self, operation: Operation) -> TillError {
        TillError::printer(operation, self.to_string())
    }
}

/// Attaches the surrounding operation to a lower-level result.
///
/// ## Example
/// ```rust,ignore
/// let mut unit = self.ledger.begin().await.during(Operation::Finalize)?;
/// ```
pub trait During<T> {
    fn during(self, operation: Operation) -> TillResult<T>;
}

impl<T, E: Classify> During<T> for Result<T, E> {
    fn during(self, operation: Operation) -> TillResult<T> {
        self.map_err(|e| e.classify(operation))
    }
}

// =============================================================================
// API Error
// =============================================================================

/// What the billing screen receives when an entry point fails.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PRINTER_UNAVAILABLE",
///   "heading": "Bill Failed",
///   "message": "finalize: printer not connected (Connection timeout: 10.0.0.1:9100)"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Short alert heading
    pub heading: String,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StorageUnavailable,
    ValidationFailed,
    ConflictOrAlreadyProcessed,
    PrinterUnavailable,
    UpstreamRejected,
    Internal,
}

impl From<TillError> for ApiError {
    fn from(err: TillError) -> Self {
        let heading = err.operation().heading().to_string();
        let code = match &err {
            TillError::StorageUnavailable { .. } => ErrorCode::StorageUnavailable,
            TillError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            TillError::ConflictOrAlreadyProcessed { .. } => ErrorCode::ConflictOrAlreadyProcessed,
            TillError::PrinterUnavailable { .. } => ErrorCode::PrinterUnavailable,
            TillError::UpstreamRejected { .. } => ErrorCode::UpstreamRejected,
            TillError::Failed { .. } => ErrorCode::Internal,
        };
        ApiError {
            code,
            heading,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.code, self.heading, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_are_classified() {
        let err = DbError::ConnectionFailed("closed".into()).classify(Operation::Finalize);
        assert!(matches!(err, TillError::StorageUnavailable { .. }));

        let err = DbError::duplicate("bill_id", "RS12-26/27").classify(Operation::Finalize);
        assert!(matches!(err, TillError::ConflictOrAlreadyProcessed { .. }));

        let err = DbError::not_found("Order", "o-1").classify(Operation::Clear);
        assert!(matches!(err, TillError::ValidationFailed { .. }));

        let err = DbError::QueryFailed("disk I/O error".into()).classify(Operation::Clear);
        assert!(matches!(err, TillError::Failed { operation: Operation::Clear, .. }));
    }

    #[test]
    fn test_during_keeps_operation() {
        let result: Result<(), DbError> = Err(DbError::PoolExhausted);
        let err = result.during(Operation::SubmitToRoom).unwrap_err();
        assert_eq!(err.operation(), Operation::SubmitToRoom);
    }

    #[test]
    fn test_mid_unit_failure_is_internal() {
        let err = DbError::QueryFailed("disk I/O error".into()).classify(Operation::Finalize);
        let api = ApiError::from(err);
        assert_eq!(api.code, ErrorCode::Internal);
        assert_eq!(api.heading, "Bill Failed");
        assert!(api.message.starts_with("finalize failed"));

        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "INTERNAL");
    }

    #[test]
    fn test_api_error_serialization() {
        let api: ApiError = TillError::printer(Operation::Finalize, "timeout").into();
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "PRINTER_UNAVAILABLE");
        assert_eq!(json["heading"], "Bill Failed");
        assert!(json["message"].as_str().unwrap().contains("timeout"));
    }
}
