//! # Validation Module
//!
//! Input validation for line items, tables and rooms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Billing / KOT screen                                         │
//! │  └── Immediate feedback on empty fields                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Constructors (Rust)                                          │
//! │  └── THIS MODULE: NewOrderLine::new, DiscountPercent::new              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 1)                                             │
//! │  └── UNIQUE (bill_id), UNIQUE (order_id) on bills                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Item codes are short keyed-in identifiers: letters, digits, `-` and `_`.
///
/// ## Example
/// ```rust
/// use rasoi_core::validation::validate_item_code;
///
/// assert!(validate_item_code("KF-STR").is_ok());
/// assert!(validate_item_code("").is_err());
/// assert!(validate_item_code("chicken tikka").is_err());
/// ```
pub fn validate_item_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "item_code".to_string(),
        });
    }

    if code.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "item_code".to_string(),
            max: 20,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "item_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "item_name".to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "item_name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Quantity must be 1..=999. Zero and negatives are rejected; corrections are
/// made by cancelling the line.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Rates may be zero (complimentary items) but never negative.
pub fn validate_rate(rate: Money) -> ValidationResult<()> {
    if rate.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "rate".to_string(),
        });
    }
    Ok(())
}

/// Table numbers are free text ("7", "G-2", "TA") but must be present.
pub fn validate_table_no(table_no: &str) -> ValidationResult<String> {
    let table_no = table_no.trim();

    if table_no.is_empty() {
        return Err(ValidationError::Required {
            field: "table_no".to_string(),
        });
    }

    if table_no.len() > 10 {
        return Err(ValidationError::TooLong {
            field: "table_no".to_string(),
            max: 10,
        });
    }

    Ok(table_no.to_string())
}

/// Room numbers are digits only, as issued by the hotel front office.
pub fn validate_room_no(room_no: &str) -> ValidationResult<String> {
    let room_no = room_no.trim();

    if room_no.is_empty() {
        return Err(ValidationError::Required {
            field: "room_no".to_string(),
        });
    }

    if !room_no.chars().all(|c| c.is_ascii_digit()) || room_no.len() > 6 {
        return Err(ValidationError::InvalidFormat {
            field: "room_no".to_string(),
            reason: "must be up to 6 digits".to_string(),
        });
    }

    Ok(room_no.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_code() {
        assert!(validate_item_code("PNT").is_ok());
        assert!(validate_item_code("KF_STR-2").is_ok());
        assert!(validate_item_code("   ").is_err());
        assert!(validate_item_code(&"X".repeat(21)).is_err());
        assert!(validate_item_code("A B").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(Money::zero()).is_ok());
        assert!(validate_rate(Money::from_paise(100)).is_ok());
        assert!(validate_rate(Money::from_paise(-1)).is_err());
    }

    #[test]
    fn test_validate_table_no() {
        assert_eq!(validate_table_no(" 12 ").unwrap(), "12");
        assert!(validate_table_no("").is_err());
    }

    #[test]
    fn test_validate_room_no() {
        assert_eq!(validate_room_no("204").unwrap(), "204");
        assert!(validate_room_no("").is_err());
        assert!(validate_room_no("20A").is_err());
    }
}
