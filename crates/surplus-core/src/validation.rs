//! # Validation Module
//!
//! Input validation utilities for the marketplace core.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (external)                                      │
//! │  ├── Deserialization / type checks                                      │
//! │  └── Immediate 400 on malformed bodies                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business-shape validation                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  ├── UNIQUE constraints (cart lines, quotes, coupon codes)              │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: the schema rejects what a race slips past here       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_QUOTE_DELIVERY_DAYS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a quoted price in paise.
///
/// Zero-priced quotes are rejected; a supplier quoting "free" is a data
/// entry error in this market.
pub fn validate_quote_price(paise: i64) -> ValidationResult<()> {
    if paise <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quotePrice".to_string(),
        });
    }

    Ok(())
}

/// Validates quoted delivery days.
pub fn validate_delivery_days(days: i64) -> ValidationResult<()> {
    if days <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "deliveryDays".to_string(),
        });
    }

    if days > MAX_QUOTE_DELIVERY_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "deliveryDays".to_string(),
            min: 1,
            max: MAX_QUOTE_DELIVERY_DAYS,
        });
    }

    Ok(())
}

/// Validates an RFQ budget range (both ends optional, min ≤ max when both
/// are present).
pub fn validate_budget_range(min: Option<i64>, max: Option<i64>) -> ValidationResult<()> {
    if let Some(min) = min {
        if min < 0 {
            return Err(ValidationError::MustBePositive {
                field: "budgetMin".to_string(),
            });
        }
    }
    if let Some(max) = max {
        if max < 0 {
            return Err(ValidationError::MustBePositive {
                field: "budgetMax".to_string(),
            });
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ValidationError::InvertedRange {
                field: "budget".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a coupon code shape and returns the uppercased form used for
/// lookup.
///
/// ## Rules
/// - Must not be empty
/// - At most 40 characters
/// - Alphanumeric plus hyphen/underscore
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "couponCode".to_string(),
        });
    }

    if code.len() > 40 {
        return Err(ValidationError::TooLong {
            field: "couponCode".to_string(),
            max: 40,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "couponCode".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_uppercase())
}

/// Validates an Indian pincode (6 digits, not starting with 0).
pub fn validate_pincode(pincode: &str) -> ValidationResult<()> {
    let pincode = pincode.trim();

    if pincode.is_empty() {
        return Err(ValidationError::Required {
            field: "pincode".to_string(),
        });
    }

    let valid = pincode.len() == 6
        && pincode.chars().all(|c| c.is_ascii_digit())
        && !pincode.starts_with('0');

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "pincode".to_string(),
            reason: "must be a 6-digit pincode".to_string(),
        });
    }

    Ok(())
}

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_coupon_code_uppercases() {
        assert_eq!(validate_coupon_code("save10").unwrap(), "SAVE10");
        assert_eq!(validate_coupon_code("  b2b-deal ").unwrap(), "B2B-DEAL");

        assert!(validate_coupon_code("").is_err());
        assert!(validate_coupon_code("has space").is_err());
        assert!(validate_coupon_code(&"A".repeat(50)).is_err());
    }

    #[test]
    fn test_validate_pincode() {
        assert!(validate_pincode("400001").is_ok());
        assert!(validate_pincode("110001").is_ok());

        assert!(validate_pincode("").is_err());
        assert!(validate_pincode("0400").is_err());
        assert!(validate_pincode("012345").is_err());
        assert!(validate_pincode("40000a").is_err());
        assert!(validate_pincode("4000011").is_err());
    }

    #[test]
    fn test_validate_budget_range() {
        assert!(validate_budget_range(None, None).is_ok());
        assert!(validate_budget_range(Some(100), None).is_ok());
        assert!(validate_budget_range(Some(100), Some(200)).is_ok());

        assert!(validate_budget_range(Some(300), Some(200)).is_err());
        assert!(validate_budget_range(Some(-1), None).is_err());
    }

    #[test]
    fn test_validate_quote_inputs() {
        assert!(validate_quote_price(100_000).is_ok());
        assert!(validate_quote_price(0).is_err());
        assert!(validate_quote_price(-5).is_err());

        assert!(validate_delivery_days(7).is_ok());
        assert!(validate_delivery_days(0).is_err());
        assert!(validate_delivery_days(MAX_QUOTE_DELIVERY_DAYS + 1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
