//! Session-backed persistence for anonymous cart/box items.
//!
//! The session is a string-keyed store with no transactional guarantees;
//! the full item list is written on every mutation and the last write wins
//! within one session. A stored value that no longer deserializes is
//! discarded and removed, resetting the shopper to an empty list.

use tower_sessions::Session;

use satchel_core::{CartKind, LineItem};

/// Local persistence adapter over the request session.
pub struct LocalCartStore<'a> {
    session: &'a Session,
}

impl<'a> LocalCartStore<'a> {
    /// Create an adapter for one request's session.
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Load the stored item list.
    ///
    /// Absent value yields an empty list. An unreadable value also yields an
    /// empty list and removes the stored value as a side effect.
    pub async fn load(&self, kind: CartKind) -> Vec<LineItem> {
        match self.session.get::<Vec<LineItem>>(kind.session_key()).await {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(%kind, error = %e, "discarding unreadable session items");
                let _ = self
                    .session
                    .remove::<serde_json::Value>(kind.session_key())
                    .await;
                Vec::new()
            }
        }
    }

    /// Store the full item list, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(
        &self,
        kind: CartKind,
        items: &[LineItem],
    ) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(kind.session_key(), items).await
    }

    /// Remove the stored value.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn clear(&self, kind: CartKind) -> Result<(), tower_sessions::session::Error> {
        self.session
            .remove::<serde_json::Value>(kind.session_key())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use tower_sessions::{MemoryStore, Session};

    use satchel_core::ProductId;

    use super::*;

    fn test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn item(id: &str, quantity: u32) -> LineItem {
        LineItem {
            id: ProductId::from(id),
            title: format!("Product {id}"),
            quantity,
            price: Decimal::from(10),
            image: None,
        }
    }

    #[tokio::test]
    async fn load_returns_empty_when_absent() {
        let session = test_session();
        let store = LocalCartStore::new(&session);
        assert!(store.load(CartKind::Cart).await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let session = test_session();
        let store = LocalCartStore::new(&session);
        let items = vec![item("p1", 2), item("p2", 1)];

        store.save(CartKind::Cart, &items).await.unwrap();
        assert_eq!(store.load(CartKind::Cart).await, items);
    }

    #[tokio::test]
    async fn kinds_are_stored_independently() {
        let session = test_session();
        let store = LocalCartStore::new(&session);

        store.save(CartKind::Cart, &[item("p1", 1)]).await.unwrap();
        assert!(store.load(CartKind::Box).await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_value_resets_to_empty_and_is_removed() {
        let session = test_session();
        let store = LocalCartStore::new(&session);

        // Not an item list at all
        session
            .insert(CartKind::Cart.session_key(), "not a list")
            .await
            .unwrap();

        assert!(store.load(CartKind::Cart).await.is_empty());

        // The corrupt value must be gone
        let raw: Option<serde_json::Value> = session
            .get(CartKind::Cart.session_key())
            .await
            .unwrap();
        assert!(raw.is_none());
    }

    #[tokio::test]
    async fn clear_removes_stored_value() {
        let session = test_session();
        let store = LocalCartStore::new(&session);

        store.save(CartKind::Cart, &[item("p1", 1)]).await.unwrap();
        store.clear(CartKind::Cart).await.unwrap();
        assert!(store.load(CartKind::Cart).await.is_empty());
    }
}
