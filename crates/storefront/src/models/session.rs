//! Session-stored state.
//!
//! All per-session flags live in one structured record under a single key.
//! Explicit fields instead of ad hoc string keys keeps sign-in state and
//! the reconciliation guard from drifting apart.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use satchel_core::{AccountId, Email};

/// Session-stored account identity.
///
/// Minimal data stored in the session to identify the signed-in shopper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAccount {
    /// Account's database ID.
    pub id: AccountId,
    /// Account's email address.
    pub email: Email,
}

/// The single session-state record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Signed-in identity, if any.
    pub account: Option<CurrentAccount>,
    /// Set once the local-into-remote cart merge has run for this
    /// sign-in session; suppresses repeat merges (quantity double-counting).
    pub cart_synced: bool,
}

impl SessionState {
    /// Session key under which the record is stored.
    pub const KEY: &'static str = "state";

    /// Load the record from the session, defaulting to signed-out state
    /// when absent or unreadable.
    pub async fn load(session: &Session) -> Self {
        session.get(Self::KEY).await.ok().flatten().unwrap_or_default()
    }

    /// Persist the record to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(Self::KEY, self).await
    }
}
