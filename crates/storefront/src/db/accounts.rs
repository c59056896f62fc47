//! Account repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use satchel_core::{AccountId, Email};

use super::RepositoryError;
use crate::models::account::Account;

/// Repository for shopper account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new account with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        let row: (i32, String, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO account (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, created_at
            ",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("email already registered: {email}"))
            }
            _ => RepositoryError::Database(e),
        })?;

        account_from_row(row)
    }

    /// Get an account and its password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row: Option<(i32, String, DateTime<Utc>, String)> = sqlx::query_as(
            r"
            SELECT id, email, created_at, password_hash
            FROM account
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some((id, email, created_at, password_hash)) => {
                let account = account_from_row((id, email, created_at))?;
                Ok(Some((account, password_hash)))
            }
            None => Ok(None),
        }
    }

    /// Get an account by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row: Option<(i32, String, DateTime<Utc>)> = sqlx::query_as(
            r"
            SELECT id, email, created_at
            FROM account
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(account_from_row).transpose()
    }
}

fn account_from_row(
    (id, email, created_at): (i32, String, DateTime<Utc>),
) -> Result<Account, RepositoryError> {
    let email = Email::parse(&email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    Ok(Account {
        id: AccountId::new(id),
        email,
        created_at,
    })
}
