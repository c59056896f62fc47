//! Authentication extractors and sign-in helpers.
//!
//! Identity lives in the structured [`SessionState`] record; these
//! extractors read it so handlers never touch raw session keys.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentAccount, SessionState};

/// Extractor that requires a signed-in account.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(account): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", account.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentAccount);

/// Rejection returned when authentication is required but absent.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not signed in" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is placed in extensions by SessionManagerLayer
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        SessionState::load(session)
            .await
            .account
            .map(Self)
            .ok_or(AuthRejection)
    }
}

/// Extractor that optionally gets the current account.
///
/// Unlike [`RequireAuth`], this does not reject anonymous requests.
pub struct OptionalAuth(pub Option<CurrentAccount>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = match parts.extensions.get::<Session>() {
            Some(session) => SessionState::load(session).await.account,
            None => None,
        };

        Ok(Self(account))
    }
}

/// Record a signed-in identity in the session.
///
/// Preserves the rest of the session state (including the reconciliation
/// guard, so re-login within one session cannot double-merge).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_in(
    session: &Session,
    account: CurrentAccount,
) -> Result<(), tower_sessions::session::Error> {
    let mut state = SessionState::load(session).await;
    state.account = Some(account);
    state.save(session).await
}

/// Clear the signed-in identity (logout).
///
/// Resets the whole session-state record, including the reconciliation
/// guard, so the next sign-in merges again.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    SessionState::default().save(session).await
}
