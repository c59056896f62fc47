//! Cart access for route handlers.
//!
//! Chooses the backing store per request: the per-account record for
//! signed-in shoppers, the session value otherwise. Remote failures are
//! never surfaced as blocking cart errors; reads fall back to the session
//! copy and writes keep a session copy so the mutation is not lost.

use tower_sessions::Session;

use satchel_core::{AccountId, Cart, CartKind};

use crate::db::RemoteCartStore;
use crate::services::local_cart::LocalCartStore;

/// Loads and persists one shopper's cart or box.
pub struct CartService<'a, R> {
    local: LocalCartStore<'a>,
    remote: &'a R,
    account: Option<AccountId>,
    kind: CartKind,
}

impl<'a, R: RemoteCartStore> CartService<'a, R> {
    /// Create a service bound to one request's session and identity.
    #[must_use]
    pub const fn new(
        session: &'a Session,
        remote: &'a R,
        account: Option<AccountId>,
        kind: CartKind,
    ) -> Self {
        Self {
            local: LocalCartStore::new(session),
            remote,
            account,
            kind,
        }
    }

    /// Load the current cart.
    ///
    /// Signed-in: the remote record (absent record is an empty cart; a
    /// failed read degrades to the session copy). Anonymous: the session
    /// value.
    pub async fn load(&self) -> Cart {
        if let Some(account) = self.account {
            match self.remote.fetch(account, self.kind).await {
                Ok(Some(items)) => return Cart::from_items(items),
                Ok(None) => return Cart::new(),
                Err(e) => {
                    tracing::warn!(
                        %account, kind = %self.kind, error = %e,
                        "remote cart read failed, falling back to session items"
                    );
                }
            }
        }
        Cart::from_items(self.local.load(self.kind).await)
    }

    /// Persist the cart after a mutation.
    ///
    /// Signed-in: upsert the remote record; on failure the session keeps a
    /// copy so the mutation survives. Anonymous: write the session value.
    pub async fn save(&self, cart: &Cart) {
        if let Some(account) = self.account {
            match self.remote.upsert(account, self.kind, cart.items()).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(
                        %account, kind = %self.kind, error = %e,
                        "remote cart write failed, keeping session copy"
                    );
                }
            }
        }
        if let Err(e) = self.local.save(self.kind, cart.items()).await {
            tracing::warn!(kind = %self.kind, error = %e, "session cart write failed");
        }
    }

    /// Remove the session-stored value for this kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn clear_local(&self) -> Result<(), tower_sessions::session::Error> {
        self.local.clear(self.kind).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use tower_sessions::{MemoryStore, Session};

    use satchel_core::{LineItem, ProductId};

    use crate::services::testing::MemoryCartStore;

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
    async fn anonymous_state_lives_in_the_session() {
        let session = test_session();
        let store = MemoryCartStore::default();
        let service = CartService::new(&session, &store, None, CartKind::Cart);

        let mut cart = service.load().await;
        cart.add(item("p1", 2));
        service.save(&cart).await;

        let reloaded = CartService::new(&session, &store, None, CartKind::Cart)
            .load()
            .await;
        assert_eq!(reloaded.items(), cart.items());
        assert!(store.items(AccountId::new(1), CartKind::Cart).is_none());
    }

    #[tokio::test]
    async fn signed_in_state_lives_in_the_record_store() {
        let session = test_session();
        let store = MemoryCartStore::default();
        let account = AccountId::new(7);
        let service = CartService::new(&session, &store, Some(account), CartKind::Box);

        let mut cart = service.load().await;
        cart.add(item("p1", 1));
        service.save(&cart).await;

        assert_eq!(
            store.items(account, CartKind::Box).unwrap(),
            cart.items().to_vec()
        );
    }

    #[tokio::test]
    async fn failed_remote_read_degrades_to_session_items() {
        let session = test_session();
        let local_items = vec![item("p1", 3)];
        LocalCartStore::new(&session)
            .save(CartKind::Cart, &local_items)
            .await
            .unwrap();

        let store = MemoryCartStore::failing_reads();
        let service = CartService::new(&session, &store, Some(AccountId::new(7)), CartKind::Cart);

        assert_eq!(service.load().await.items(), local_items.as_slice());
    }

    #[tokio::test]
    async fn failed_remote_write_keeps_session_copy() {
        let session = test_session();
        let store = MemoryCartStore::failing_writes();
        let service = CartService::new(&session, &store, Some(AccountId::new(7)), CartKind::Cart);

        let mut cart = Cart::new();
        cart.add(item("p1", 2));
        service.save(&cart).await;

        let session_items = LocalCartStore::new(&session).load(CartKind::Cart).await;
        assert_eq!(session_items, cart.items().to_vec());
    }
}
