//! Business services: authentication, cart access, and reconciliation.

pub mod auth;
pub mod carts;
pub mod local_cart;
pub mod reconcile;

pub use auth::{AuthError, AuthService};
pub use carts::CartService;
pub use local_cart::LocalCartStore;
pub use reconcile::reconcile_on_login;

#[cfg(test)]
pub(crate) mod testing {
    //! Shared test doubles for the cart services.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use satchel_core::{AccountId, CartKind, LineItem};

    use crate::db::{RemoteCartStore, RepositoryError};

    /// In-memory double for the per-account record store.
    #[derive(Default)]
    pub struct MemoryCartStore {
        records: Mutex<HashMap<(AccountId, CartKind), Vec<LineItem>>>,
        fail_reads: bool,
        fail_writes: bool,
    }

    #[allow(clippy::unwrap_used)]
    impl MemoryCartStore {
        pub fn failing_reads() -> Self {
            Self {
                fail_reads: true,
                ..Self::default()
            }
        }

        pub fn failing_writes() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub fn seed(&self, account: AccountId, kind: CartKind, items: Vec<LineItem>) {
            self.records.lock().unwrap().insert((account, kind), items);
        }

        pub fn items(&self, account: AccountId, kind: CartKind) -> Option<Vec<LineItem>> {
            self.records.lock().unwrap().get(&(account, kind)).cloned()
        }
    }

    #[allow(clippy::unwrap_used)]
    impl RemoteCartStore for MemoryCartStore {
        async fn fetch(
            &self,
            account: AccountId,
            kind: CartKind,
        ) -> Result<Option<Vec<LineItem>>, RepositoryError> {
            if self.fail_reads {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            Ok(self.items(account, kind))
        }

        async fn upsert(
            &self,
            account: AccountId,
            kind: CartKind,
            items: &[LineItem],
        ) -> Result<(), RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            self.records
                .lock()
                .unwrap()
                .insert((account, kind), items.to_vec());
            Ok(())
        }
    }
}
