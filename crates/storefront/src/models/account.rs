//! Shopper account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use satchel_core::{AccountId, Email};

/// A shopper account (parent or teacher).
///
/// The password hash never leaves the db layer; it is not part of this model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account's database ID.
    pub id: AccountId,
    /// Account's email address.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
