//! # Bill Identifier Policy
//!
//! Turns a bill number from the `bill` counter into the identifier printed on
//! the receipt.
//!
//! ```text
//!   context label        prefix     number    fiscal suffix      bill id
//!   ───────────────      ──────     ──────    ─────────────      ─────────────
//!   "Restaurant"    ──►  "R"     +  1042   +  "-" + "26/27"  =   R1042-26/27
//!   "Room Service"  ──►  "RS"    +  17     +  "-" + "26/27"  =   RS17-26/27
//!   "Bar Counter"   ──►  ""      +  9      +  "-" + "26/27"  =   9-26/27
//! ```
//!
//! The number itself comes from durable storage and is taken inside the same
//! unit that finalizes the order; nothing here touches storage.

use chrono::{Datelike, NaiveDate};

/// Maps the terminal's context label to its bill prefix.
///
/// The lookup is explicit and exhaustive; any label not listed gets an empty
/// prefix.
pub fn bill_prefix(context_label: &str) -> &'static str {
    match context_label.trim() {
        "Restaurant" | "Reception" => "R",
        "Room Service" | "RoomService" => "RS",
        "Rock Garden" => "RG",
        _ => "",
    }
}

/// `prefix + number + "-" + fiscal_suffix`.
///
/// ## Example
/// ```rust
/// use rasoi_core::bill_id::format_bill_id;
///
/// assert_eq!(format_bill_id(1042, "Restaurant", "26/27"), "R1042-26/27");
/// assert_eq!(format_bill_id(9, "Bar Counter", "26/27"), "9-26/27");
/// ```
pub fn format_bill_id(number: i64, context_label: &str, fiscal_suffix: &str) -> String {
    format!("{}{}-{}", bill_prefix(context_label), number, fiscal_suffix)
}

/// Fiscal-year suffix for a date. The Indian fiscal year runs April to March.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use rasoi_core::bill_id::fiscal_suffix;
///
/// let oct = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// let feb = NaiveDate::from_ymd_opt(2027, 2, 1).unwrap();
/// assert_eq!(fiscal_suffix(oct), "26/27");
/// assert_eq!(fiscal_suffix(feb), "26/27");
/// ```
pub fn fiscal_suffix(date: NaiveDate) -> String {
    let start_year = if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    };
    format!(
        "{:02}/{:02}",
        start_year.rem_euclid(100),
        (start_year + 1).rem_euclid(100)
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_lookup() {
        assert_eq!(bill_prefix("Restaurant"), "R");
        assert_eq!(bill_prefix("Reception"), "R");
        assert_eq!(bill_prefix("Room Service"), "RS");
        assert_eq!(bill_prefix("RoomService"), "RS");
        assert_eq!(bill_prefix("Rock Garden"), "RG");
        assert_eq!(bill_prefix("restaurant"), "");
        assert_eq!(bill_prefix(""), "");
    }

    #[test]
    fn test_format_bill_id() {
        assert_eq!(format_bill_id(1, "Rock Garden", "21/22"), "RG1-21/22");
        assert_eq!(format_bill_id(17, "Room Service", "26/27"), "RS17-26/27");
    }

    #[test]
    fn test_fiscal_suffix_boundaries() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(fiscal_suffix(d(2026, 3, 31)), "25/26");
        assert_eq!(fiscal_suffix(d(2026, 4, 1)), "26/27");
        assert_eq!(fiscal_suffix(d(2099, 12, 31)), "99/00");
    }
}
