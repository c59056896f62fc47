//! Authentication route handlers.
//!
//! Login and registration resolve an account identity and then hand it,
//! together with the request session and the cart record store, to the
//! reconciliation engine. That call is the only coupling between auth and
//! the cart layer.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use satchel_core::AccountId;

use crate::db::CartRepository;
use crate::error::{self, Result};
use crate::middleware::{RequireAuth, sign_in, sign_out};
use crate::models::{Account, CurrentAccount};
use crate::services::{AuthService, reconcile_on_login};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Account display data.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub email: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.to_string(),
        }
    }
}

/// Create an account, sign it in, and reconcile session items.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountView>)> {
    let account = AuthService::new(state.pool())
        .register(&request.email, &request.password)
        .await?;

    establish_session(&state, &session, &account).await?;

    Ok((StatusCode::CREATED, Json(AccountView::from(&account))))
}

/// Password login; merges session items into the account record.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AccountView>> {
    let account = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;

    establish_session(&state, &session, &account).await?;

    Ok(Json(AccountView::from(&account)))
}

/// Clear the signed-in identity from the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    sign_out(&session).await?;
    error::clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Current account overview.
#[instrument(skip(account))]
pub async fn me(RequireAuth(account): RequireAuth) -> Json<AccountView> {
    Json(AccountView {
        id: account.id,
        email: account.email.to_string(),
    })
}

/// Record the identity in the session and run reconciliation.
async fn establish_session(
    state: &AppState,
    session: &Session,
    account: &Account,
) -> Result<()> {
    sign_in(
        session,
        CurrentAccount {
            id: account.id,
            email: account.email.clone(),
        },
    )
    .await?;

    error::set_sentry_user(&account.id, Some(account.email.as_str()));

    let repo = CartRepository::new(state.pool());
    reconcile_on_login(session, &repo, Some(account.id)).await;

    Ok(())
}
