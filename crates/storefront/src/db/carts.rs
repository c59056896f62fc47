//! Per-account cart/box record store.
//!
//! One row per `(account_id, kind)` holding the item list as JSONB. The
//! remote record is the authoritative cart once a shopper is signed in;
//! anonymous state lives in the session instead.

use sqlx::PgPool;

use satchel_core::{AccountId, CartKind, LineItem};

use super::RepositoryError;

/// Boundary contract for the per-account cart record store.
///
/// Implemented by [`CartRepository`] for `PostgreSQL` and by in-memory
/// doubles in tests. Absence of a record is a defined empty case, not an
/// error; callers must resolve the account identity before either call.
#[allow(async_fn_in_trait)]
pub trait RemoteCartStore {
    /// Fetch the stored item list for an account, or `None` if absent.
    async fn fetch(
        &self,
        account: AccountId,
        kind: CartKind,
    ) -> Result<Option<Vec<LineItem>>, RepositoryError>;

    /// Replace the stored item list for an account, stamping the update time.
    async fn upsert(
        &self,
        account: AccountId,
        kind: CartKind,
        items: &[LineItem],
    ) -> Result<(), RepositoryError>;
}

/// Repository for cart/box record database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl RemoteCartStore for CartRepository<'_> {
    async fn fetch(
        &self,
        account: AccountId,
        kind: CartKind,
    ) -> Result<Option<Vec<LineItem>>, RepositoryError> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            r"
            SELECT items
            FROM cart
            WHERE account_id = $1 AND kind = $2
            ",
        )
        .bind(account.as_i32())
        .bind(kind.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some((value,)) => {
                let items = serde_json::from_value(value).map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid {kind} items for account {account}: {e}"
                    ))
                })?;
                Ok(Some(items))
            }
            None => Ok(None),
        }
    }

    async fn upsert(
        &self,
        account: AccountId,
        kind: CartKind,
        items: &[LineItem],
    ) -> Result<(), RepositoryError> {
        let items = serde_json::to_value(items)
            .map_err(|e| RepositoryError::DataCorruption(format!("unserializable items: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO cart (account_id, kind, items, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (account_id, kind)
            DO UPDATE SET items = EXCLUDED.items, updated_at = now()
            ",
        )
        .bind(account.as_i32())
        .bind(kind.as_str())
        .bind(items)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
