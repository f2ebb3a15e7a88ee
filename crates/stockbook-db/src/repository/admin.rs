//! # Admin Repository
//!
//! Database operations for admin accounts. Hashing happens in the caller;
//! this layer only ever sees PHC hash strings.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use stockbook_core::AdminAccount;

/// Repository for admin account operations.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    /// Creates a new AdminRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdminRepository { pool }
    }

    /// Inserts a new account.
    ///
    /// ## Returns
    /// * `Ok(AdminAccount)` - The stored account
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> DbResult<AdminAccount> {
        debug!(email = %email, "Inserting admin account");

        let now = Utc::now();
        let account = AdminAccount {
            id: generate_id(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO admin_accounts (id, name, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", email),
            other => other,
        })?;

        Ok(account)
    }

    /// Looks up an account by exact email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<AdminAccount>> {
        let account = sqlx::query_as::<_, AdminAccount>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM admin_accounts
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Updates the display name and, when given, the password hash.
    ///
    /// ## Returns
    /// * `Ok(AdminAccount)` - The account after the update
    /// * `Err(DbError::NotFound)` - No account with this email
    pub async fn update_profile(
        &self,
        email: &str,
        name: &str,
        new_password_hash: Option<&str>,
    ) -> DbResult<AdminAccount> {
        debug!(
            email = %email,
            password_changed = new_password_hash.is_some(),
            "Updating admin profile"
        );

        let result = sqlx::query(
            r#"
            UPDATE admin_accounts SET
                name = ?2,
                password_hash = COALESCE(?3, password_hash),
                updated_at = ?4
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(new_password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Admin", email));
        }

        self.find_by_email(email)
            .await?
            .ok_or_else(|| DbError::not_found("Admin", email))
    }

    /// Counts registered accounts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_accounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
