//! Login-time cart reconciliation.
//!
//! When a previously-anonymous session signs in, items collected in the
//! session are merged into the account's record: quantities sum on matching
//! product ids, the record wins on every other field. The session copy is
//! cleared afterwards. A per-session guard in [`SessionState`] keeps the
//! merge from running twice (which would double-count quantities).
//!
//! The engine is called explicitly from the login flow with its
//! dependencies; there is no shared trigger handle or event hook.

use tower_sessions::Session;

use satchel_core::{AccountId, CartKind, merge_items};

use crate::db::RemoteCartStore;
use crate::models::SessionState;
use crate::services::local_cart::LocalCartStore;

/// Merge session items into the account record, at most once per session.
///
/// No-op when `account` is `None`: with no resolved identity there is
/// nothing to read or write remotely, and session state is left untouched.
///
/// The guard flag is set before the merge starts, independent of success;
/// a concurrent trigger in the same session must not merge again. Remote
/// failures are logged and swallowed: a failed read merges into an empty
/// record, a failed write leaves the session copy in place for the next
/// mutation to retry. No failure here blocks login.
pub async fn reconcile_on_login<R: RemoteCartStore>(
    session: &Session,
    remote: &R,
    account: Option<AccountId>,
) {
    let Some(account) = account else {
        return;
    };

    let mut state = SessionState::load(session).await;
    if state.cart_synced {
        return;
    }
    state.cart_synced = true;
    if let Err(e) = state.save(session).await {
        tracing::warn!(%account, error = %e, "failed to persist reconciliation guard");
    }

    let local_store = LocalCartStore::new(session);
    for kind in CartKind::ALL {
        let local = local_store.load(kind).await;
        if local.is_empty() {
            // Nothing to merge; skip the write so a failed read can never
            // replace the record with an empty list.
            continue;
        }

        let remote_items = match remote.fetch(account, kind).await {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    %account, %kind, error = %e,
                    "remote read failed during reconciliation, merging into empty record"
                );
                Vec::new()
            }
        };

        let merged = merge_items(remote_items, local);
        match remote.upsert(account, kind, &merged).await {
            Ok(()) => {
                if let Err(e) = local_store.clear(kind).await {
                    tracing::warn!(%account, %kind, error = %e, "failed to clear session items");
                }
                tracing::debug!(%account, %kind, items = merged.len(), "reconciled session items");
            }
            Err(e) => {
                tracing::warn!(
                    %account, %kind, error = %e,
                    "remote write failed during reconciliation, keeping session items"
                );
            }
        }
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

    fn item(id: &str, quantity: u32, price: i64) -> LineItem {
        LineItem {
            id: ProductId::from(id),
            title: format!("Product {id}"),
            quantity,
            price: Decimal::from(price),
            image: None,
        }
    }

    #[tokio::test]
    async fn merges_session_items_into_the_record() {
        let session = test_session();
        let store = MemoryCartStore::default();
        let account = AccountId::new(1);

        // Local cart p1 x1; remote cart p1 x2, p2 x1.
        LocalCartStore::new(&session)
            .save(CartKind::Cart, &[item("p1", 1, 10)])
            .await
            .unwrap();
        store.seed(
            account,
            CartKind::Cart,
            vec![item("p1", 2, 10), item("p2", 1, 5)],
        );

        reconcile_on_login(&session, &store, Some(account)).await;

        let merged = store.items(account, CartKind::Cart).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].quantity, 3);
        assert_eq!(merged[1].quantity, 1);

        // Session copy is cleared and the guard is set
        assert!(
            LocalCartStore::new(&session)
                .load(CartKind::Cart)
                .await
                .is_empty()
        );
        assert!(SessionState::load(&session).await.cart_synced);
    }

    #[tokio::test]
    async fn second_run_in_same_session_is_a_noop() {
        let session = test_session();
        let store = MemoryCartStore::default();
        let account = AccountId::new(1);

        LocalCartStore::new(&session)
            .save(CartKind::Cart, &[item("p1", 1, 10)])
            .await
            .unwrap();

        reconcile_on_login(&session, &store, Some(account)).await;
        let after_first = store.items(account, CartKind::Cart).unwrap();

        // Simulate a second trigger with stale session items still present
        LocalCartStore::new(&session)
            .save(CartKind::Cart, &[item("p1", 5, 10)])
            .await
            .unwrap();
        reconcile_on_login(&session, &store, Some(account)).await;

        assert_eq!(store.items(account, CartKind::Cart).unwrap(), after_first);
    }

    #[tokio::test]
    async fn unresolved_identity_is_a_noop() {
        let session = test_session();
        let store = MemoryCartStore::default();
        let items = vec![item("p1", 1, 10)];

        LocalCartStore::new(&session)
            .save(CartKind::Cart, &items)
            .await
            .unwrap();

        reconcile_on_login(&session, &store, None).await;

        // Session untouched, guard not set, nothing written remotely
        assert_eq!(
            LocalCartStore::new(&session).load(CartKind::Cart).await,
            items
        );
        assert!(!SessionState::load(&session).await.cart_synced);
        assert!(store.items(AccountId::new(1), CartKind::Cart).is_none());
    }

    #[tokio::test]
    async fn reconciles_cart_and_box_independently() {
        let session = test_session();
        let store = MemoryCartStore::default();
        let account = AccountId::new(3);
        let local = LocalCartStore::new(&session);

        local.save(CartKind::Cart, &[item("c1", 1, 10)]).await.unwrap();
        local.save(CartKind::Box, &[item("b1", 2, 4)]).await.unwrap();

        reconcile_on_login(&session, &store, Some(account)).await;

        assert_eq!(store.items(account, CartKind::Cart).unwrap().len(), 1);
        assert_eq!(
            store.items(account, CartKind::Box).unwrap()[0].quantity,
            2
        );
    }

    #[tokio::test]
    async fn empty_session_never_writes_the_record() {
        let session = test_session();
        let store = MemoryCartStore::default();
        let account = AccountId::new(4);
        store.seed(account, CartKind::Cart, vec![item("p1", 2, 10)]);

        reconcile_on_login(&session, &store, Some(account)).await;

        assert_eq!(store.items(account, CartKind::Cart).unwrap().len(), 1);
        assert!(SessionState::load(&session).await.cart_synced);
    }

    #[tokio::test]
    async fn failed_write_keeps_session_items_for_retry() {
        let session = test_session();
        let store = MemoryCartStore::failing_writes();
        let account = AccountId::new(5);
        let items = vec![item("p1", 1, 10)];

        LocalCartStore::new(&session)
            .save(CartKind::Cart, &items)
            .await
            .unwrap();

        reconcile_on_login(&session, &store, Some(account)).await;

        // Guard is still set (set before the merge, independent of success)
        assert!(SessionState::load(&session).await.cart_synced);
        assert_eq!(
            LocalCartStore::new(&session).load(CartKind::Cart).await,
            items
        );
    }
}
