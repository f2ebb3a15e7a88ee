//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  AdminAccount   │   │    Product      │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  email (unique) │   │  name           │   │  customer       │       │
//! │  │  name           │   │  quantity ≥ 0   │   │  bill_date      │       │
//! │  │  password_hash  │   │  price          │   │  order: [Line]  │       │
//! │  └─────────────────┘   └─────────────────┘   │  total          │       │
//! │                                              └────────┬────────┘       │
//! │                                                       │ owns           │
//! │                                              ┌────────▼────────┐       │
//! │                                              │    BillLine     │       │
//! │                                              │  product_name   │ ← by   │
//! │                                              │  price, qty     │  name  │
//! │                                              │  total_price    │  only  │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A bill line captures the product *name* at commit time. There is no
//! foreign key: renaming or deleting a product never rewrites history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    validate_bill_line, validate_email, validate_password, validate_person_name,
    validate_price, validate_product_name, validate_stock_quantity, ValidationResult,
};

// =============================================================================
// Admin Account
// =============================================================================

/// A registered administrator.
///
/// The password hash is never serialized; clients only ever see id, name and
/// email.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Login email. Unique across accounts.
    pub email: String,

    /// Salted one-way hash (PHC string).
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Checks required fields and email shape.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_person_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(())
    }
}

/// Profile update request.
///
/// `password` is optional: absent or empty leaves the stored hash untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProfileUpdate {
    /// Returns the new password, if one was actually supplied.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Email + password pair used by both login entry points.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Bills match products by this exact string.
    pub name: String,

    /// Units in stock. Never negative.
    pub quantity: i64,

    /// Unit price.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    #[ts(type = "number")]
    pub price: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can no longer be sold from stock.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }
}

/// Body of catalog-add and catalog-edit (full replace).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    #[serde(deserialize_with = "int_or_numeric_string")]
    pub quantity: i64,
    #[ts(type = "number")]
    pub price: Money,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireInt {
    Number(i64),
    Text(String),
}

/// Reads `5` or `"5"`; form inputs post numbers as strings.
fn int_or_numeric_string<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match WireInt::deserialize(d)? {
        WireInt::Number(n) => Ok(n),
        WireInt::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("cannot parse '{s}' as a quantity"))),
    }
}

impl ProductInput {
    /// Validates name, quantity (≥ 0) and price (≥ 0).
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_stock_quantity(self.quantity)?;
        validate_price(self.price)?;
        Ok(())
    }
}

// =============================================================================
// Bill
// =============================================================================

/// Customer details captured on a bill. Every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct Customer {
    pub name: String,
    pub mobile: String,
    pub email: String,
}

/// A line item on a bill.
///
/// `price` and `total_price` are whatever the console computed; they are
/// stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Unit price at time of sale (frozen).
    #[serde(default)]
    #[ts(type = "number")]
    pub price: Money,

    /// Units sold.
    pub quantity: i64,

    /// Line total as computed by the client.
    #[serde(default)]
    #[ts(type = "number")]
    pub total_price: Money,
}

/// A committed bill. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub customer: Customer,

    /// Client-supplied sale date, kept verbatim (usually ISO 8601).
    pub bill_date: String,

    pub order: Vec<BillLine>,

    #[ts(type = "number")]
    pub total: Money,

    /// When the server stored the bill.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Body of the commit-bill request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub bill_date: String,
    #[serde(default)]
    pub order: Vec<BillLine>,
    #[serde(default)]
    pub total: Money,
}

impl NewBill {
    /// Structural validation only.
    ///
    /// Prices and totals are not recomputed and stock is not checked.
    pub fn validate(&self) -> ValidationResult<()> {
        self.order.iter().try_for_each(validate_bill_line)
    }
}

/// Outcome of committing a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub bill_id: String,

    /// Lines whose product was found and decremented.
    pub adjusted: usize,

    /// Product names that matched no catalog entry (stock untouched).
    pub skipped: Vec<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
