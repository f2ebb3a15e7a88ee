//! # Validation Module
//!
//! Input validation utilities for Stockbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin console (TypeScript)                                   │
//! │  └── Required fields, immediate feedback                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: axum extractor (serde)                                       │
//! │  ├── Shape and type checks (deserialization)                           │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (quantity >= 0)                                  │
//! │  └── UNIQUE (admin email)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{validate_product_name, validate_stock_quantity};
//!
//! validate_product_name("Phone Case").unwrap();
//! validate_stock_quantity(0).unwrap();
//! assert!(validate_stock_quantity(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::BillLine;
use crate::MAX_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// Names are stored exactly as given; trimming only applies to the check.
///
/// ```rust
/// use stockbook_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Case").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_bounded_text("name", name, MAX_NAME_LEN)
}

/// Validates an admin's display name.
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    validate_bounded_text("name", name, MAX_NAME_LEN)
}

/// Validates an email address.
///
/// Deliberately loose: something before and after a single `@`. Delivery is
/// the real test.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_bounded_text("email", email, MAX_EMAIL_LEN)?;

    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        }),
    }
}

/// Validates a plaintext password before hashing. Only emptiness is checked.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    Ok(())
}

fn validate_bounded_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock quantity. Zero is allowed (out of stock).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    validate_quantity("quantity", qty)
}

fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::negative(field));
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative
/// - Zero is allowed (free items)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::negative("price"));
    }
    Ok(())
}

// =============================================================================
// Bill Validators
// =============================================================================

/// Validates a single bill line.
///
/// ## Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  productName  empty?      → Required                                   │
/// │  quantity     < 0?        → Negative                                   │
/// │  quantity     > 10^9?     → OutOfRange                                 │
/// │  quantity     = 0         → accepted (no stock change)                 │
/// │  price/total  anything    → accepted, stored verbatim                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_bill_line(line: &BillLine) -> ValidationResult<()> {
    if line.product_name.trim().is_empty() {
        return Err(ValidationError::required("productName"));
    }
    validate_quantity("quantity", line.quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
