//! Account management commands.

use sqlx::PgPool;

use satchel_storefront::services::AuthService;

use super::{CommandError, database_url};

/// Create a shopper account.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or registration
/// fails (invalid email, weak password, duplicate account).
pub async fn create(email: &str, password: &str) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let pool = PgPool::connect(&database_url()?).await?;

    let account = AuthService::new(&pool).register(email, password).await?;

    tracing::info!(id = %account.id, email = %account.email, "Account created");
    Ok(())
}
