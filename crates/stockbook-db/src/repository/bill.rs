//! # Bill Repository
//!
//! The append-only bill ledger and the bill commit.
//!
//! ## Commit Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├── INSERT bills        (header: customer, billDate, total)           │
//! │   ├── INSERT bill_lines   (every line, matched or not)                  │
//! │   │                                                                     │
//! │   ├── for each line:                                                    │
//! │   │     UPDATE products                                                 │
//! │   │        SET quantity = MAX(quantity - n, 0)                          │
//! │   │      WHERE id = (first product with name = productName)            │
//! │   │     0 rows → name recorded as skipped                               │
//! │   │                                                                     │
//! │  COMMIT   (any error before this point rolls everything back)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement is computed inside SQLite, so two commits touching the same
//! product cannot lose each other's update.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use super::generate_id;
use crate::error::{DbError, DbResult};
use stockbook_core::{Bill, BillLine, CommitSummary, Customer, Money, NewBill};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct BillRow {
    id: String,
    customer_name: String,
    customer_mobile: String,
    customer_email: String,
    bill_date: String,
    total_cents: Money,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct BillLineRow {
    bill_id: String,
    product_name: String,
    price_cents: Money,
    quantity: i64,
    total_price_cents: Money,
}

impl From<BillLineRow> for BillLine {
    fn from(row: BillLineRow) -> Self {
        BillLine {
            product_name: row.product_name,
            price: row.price_cents,
            quantity: row.quantity,
            total_price: row.total_price_cents,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the bill ledger.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Stores a bill and decrements stock for each line, atomically.
    ///
    /// ## Rules
    /// - Lines are stored exactly as given, including unmatched names
    /// - Stock is matched by exact product name, first (oldest) product wins
    /// - Stock never goes below zero
    /// - Prices and totals are not recomputed
    ///
    /// ## Returns
    /// A [`CommitSummary`] with the new bill id, the number of adjusted lines
    /// and the names that matched no product.
    pub async fn commit(&self, bill: &NewBill) -> DbResult<CommitSummary> {
        let bill_id = generate_id();
        let now = Utc::now();

        debug!(bill_id = %bill_id, lines = bill.order.len(), "Committing bill");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO bills (
                id, customer_name, customer_mobile, customer_email,
                bill_date, total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&bill_id)
        .bind(&bill.customer.name)
        .bind(&bill.customer.mobile)
        .bind(&bill.customer.email)
        .bind(&bill.bill_date)
        .bind(bill.total)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut adjusted = 0usize;
        let mut skipped = Vec::new();

        for (position, line) in bill.order.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO bill_lines (
                    bill_id, position, product_name, price_cents, quantity, total_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&bill_id)
            .bind(position as i64)
            .bind(&line.product_name)
            .bind(line.price)
            .bind(line.quantity)
            .bind(line.total_price)
            .execute(&mut *tx)
            .await?;

            let result = sqlx::query(
                r#"
                UPDATE products SET
                    quantity = MAX(quantity - ?2, 0),
                    updated_at = ?3
                WHERE id = (
                    SELECT id FROM products WHERE name = ?1 ORDER BY rowid LIMIT 1
                )
                "#,
            )
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                debug!(product = %line.product_name, "No catalog match, stock untouched");
                skipped.push(line.product_name.clone());
            } else {
                adjusted += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            bill_id = %bill_id,
            total = %bill.total,
            adjusted,
            skipped = skipped.len(),
            "Bill committed"
        );

        Ok(CommitSummary {
            bill_id,
            adjusted,
            skipped,
        })
    }

    /// Lists every bill with its lines, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Bill>> {
        let headers = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT id, customer_name, customer_mobile, customer_email,
                   bill_date, total_cents, created_at
            FROM bills
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let lines = sqlx::query_as::<_, BillLineRow>(
            r#"
            SELECT bill_id, product_name, price_cents, quantity, total_price_cents
            FROM bill_lines
            ORDER BY bill_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_bill: HashMap<String, Vec<BillLine>> = HashMap::new();
        for row in lines {
            lines_by_bill
                .entry(row.bill_id.clone())
                .or_default()
                .push(row.into());
        }

        let bills: Vec<Bill> = headers
            .into_iter()
            .map(|row| Bill {
                order: lines_by_bill.remove(&row.id).unwrap_or_default(),
                id: row.id,
                customer: Customer {
                    name: row.customer_name,
                    mobile: row.customer_mobile,
                    email: row.customer_email,
                },
                bill_date: row.bill_date,
                total: row.total_cents,
                created_at: row.created_at,
            })
            .collect();

        debug!(count = bills.len(), "Listed bills");
        Ok(bills)
    }

    /// Counts stored bills.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
